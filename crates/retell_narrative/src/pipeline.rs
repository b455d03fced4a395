//! The pipeline orchestrator.
//!
//! A run is strictly sequential: world bible, beats, one prose call per beat
//! in order, assembly, validation, final artifacts. Every generation call is
//! awaited before the next is issued. Each stage persists its output before
//! the next one starts.

use crate::beats::parse_beats;
use crate::prompts::{
    BEATS_SYSTEM, WORLD_BIBLE_SYSTEM, beats_prompt, world_bible_prompt, world_bible_retry_prompt,
};
use crate::render::{render_narrative, render_story};
use crate::{
    Anomaly, Beat, Blocklist, DEFAULT_SNIPPET_RADIUS, GeneratedScene, RunMetadata, RunReport,
    SceneStatus, WorldBible, validate,
};
use retell_core::{GenerateRequest, ResponseFormat};
use retell_error::{
    BuilderError, JsonError, PipelineError, PipelineErrorKind, PipelineStage, RetellError,
    RetellResult, StageError,
};
use retell_interface::RetellDriver;
use retell_storage::{Artifact, ArtifactStore};
use tracing::{info, instrument, warn};

/// Title used when none is configured.
pub const DEFAULT_TITLE: &str = "A Modern Retelling";

/// Settings applied to every generation request of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationSettings {
    /// Model override; the driver default is used when `None`
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Output token limit per call
    pub max_tokens: Option<u32>,
}

/// Options of one pipeline run.
#[derive(Debug, Clone, PartialEq, derive_builder::Builder, derive_getters::Getters)]
#[builder(setter(into), default)]
pub struct PipelineOptions {
    /// Settings for every generation request
    generation: GenerationSettings,
    /// Characters of context around each violation
    snippet_radius: usize,
    /// Title printed at the top of the story artifact
    title: String,
    /// Reuse existing world bible and beat artifacts
    resume: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            snippet_radius: DEFAULT_SNIPPET_RADIUS,
            title: DEFAULT_TITLE.to_string(),
            resume: false,
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct PipelineOutput {
    /// The world bible used for generation
    world_bible: WorldBible,
    /// The beats, in narrative order
    beats: Vec<Beat>,
    /// One scene per beat, in beat order
    scenes: Vec<GeneratedScene>,
    /// Assembled narrative with scene headers
    narrative: String,
    /// Validation results and anomalies
    report: RunReport,
}

/// Sequences the stages of a narrative transformation.
///
/// # Example
///
/// ```rust,ignore
/// use retell_narrative::{Blocklist, Pipeline};
/// use retell_models::GeminiClient;
/// use retell_storage::FileSystemArtifactStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = Pipeline::new(GeminiClient::new()?, FileSystemArtifactStore::new("output")?);
/// let output = pipeline
///     .run(&source, "A 2030 high-frequency trading firm", &Blocklist::default_terms())
///     .await?;
/// println!("{} violations", output.report().validation().violations().len());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<D: RetellDriver, S: ArtifactStore> {
    driver: D,
    store: S,
    options: PipelineOptions,
}

fn at_stage(stage: PipelineStage) -> impl FnOnce(RetellError) -> RetellError {
    move |error| StageError::new(stage, error).into()
}

#[track_caller]
fn require_non_empty(name: &str, value: &str) -> RetellResult<()> {
    if value.trim().is_empty() {
        return Err(PipelineError::new(PipelineErrorKind::EmptyInput(name.to_string())).into());
    }
    Ok(())
}

impl<D: RetellDriver, S: ArtifactStore> Pipeline<D, S> {
    /// Create a pipeline with default options.
    pub fn new(driver: D, store: S) -> Self {
        Self {
            driver,
            store,
            options: PipelineOptions::default(),
        }
    }

    /// Replace the run options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// The generation driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The artifact store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The run options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Model name recorded in run metadata.
    pub fn model_name(&self) -> &str {
        self.options
            .generation
            .model
            .as_deref()
            .unwrap_or_else(|| self.driver.model_name())
    }

    /// Build a request carrying the run's generation settings.
    pub(crate) fn request(
        &self,
        system: &str,
        prompt: String,
        format: ResponseFormat,
    ) -> RetellResult<GenerateRequest> {
        let settings = &self.options.generation;
        Ok(GenerateRequest::prompt(system, prompt, format)
            .model(settings.model.clone())
            .temperature(settings.temperature)
            .max_tokens(settings.max_tokens)
            .build()
            .map_err(|e| BuilderError::from(e.to_string()))?)
    }

    /// Generate the world bible for a source text and target context.
    ///
    /// A response that cannot be parsed is retried once with a stricter
    /// instruction; the returned anomaly records a recovered first failure.
    /// The bible is persisted before it is returned.
    #[instrument(skip_all, fields(source_chars = source_text.len()))]
    pub async fn build_world_bible(
        &self,
        source_text: &str,
        target_context: &str,
    ) -> RetellResult<(WorldBible, Option<Anomaly>)> {
        require_non_empty("source_text", source_text)?;
        require_non_empty("target_context", target_context)?;

        let request = self.request(
            WORLD_BIBLE_SYSTEM,
            world_bible_prompt(source_text, target_context),
            ResponseFormat::Json,
        )?;
        let response = self.driver.generate(&request).await?;

        let (bible, anomaly) = match WorldBible::parse(response.text()) {
            Ok(bible) => (bible, None),
            Err(PipelineError {
                kind: PipelineErrorKind::MalformedMapping { reason, .. },
                ..
            }) => {
                warn!(reason = %reason, "World bible unparseable, retrying once");
                let retry = self.request(
                    WORLD_BIBLE_SYSTEM,
                    world_bible_retry_prompt(source_text, target_context, &reason),
                    ResponseFormat::Json,
                )?;
                let response = self.driver.generate(&retry).await?;
                let bible = WorldBible::parse(response.text()).map_err(|mut e| {
                    if let PipelineErrorKind::MalformedMapping { attempts, .. } = &mut e.kind {
                        *attempts = 2;
                    }
                    e
                })?;
                (bible, Some(Anomaly::WorldBibleRetried { reason }))
            }
            Err(e) => return Err(e.into()),
        };

        self.store.write(&Artifact::WorldBible, &bible.to_json()?).await?;
        info!(mappings = bible.len(), "World bible built");
        Ok((bible, anomaly))
    }

    /// Reduce the source text to its ordered beats and persist them.
    #[instrument(skip_all, fields(source_chars = source_text.len()))]
    pub async fn extract_beats(&self, source_text: &str) -> RetellResult<Vec<Beat>> {
        require_non_empty("source_text", source_text)?;

        let request = self.request(BEATS_SYSTEM, beats_prompt(source_text), ResponseFormat::Json)?;
        let response = self.driver.generate(&request).await?;
        let beats = parse_beats(response.text())?;

        self.persist_beats(&beats).await?;
        info!(beats = beats.len(), "Beats extracted");
        Ok(beats)
    }

    async fn persist_beats(&self, beats: &[Beat]) -> RetellResult<()> {
        let json = serde_json::to_string_pretty(beats)
            .map_err(|e| JsonError::new(format!("Failed to serialize beats: {}", e)))?;
        self.store.write(&Artifact::Beats, &json).await?;
        Ok(())
    }

    async fn load_or_build_world_bible(
        &self,
        source_text: &str,
        target_context: &str,
    ) -> RetellResult<(WorldBible, Option<Anomaly>)> {
        if self.options.resume {
            if let Some(json) = self.store.read(&Artifact::WorldBible).await? {
                let bible = WorldBible::parse(&json)?;
                info!(mappings = bible.len(), "Resumed world bible from artifact");
                return Ok((bible, None));
            }
        }
        self.build_world_bible(source_text, target_context).await
    }

    async fn load_or_extract_beats(&self, source_text: &str) -> RetellResult<Vec<Beat>> {
        if self.options.resume {
            if let Some(json) = self.store.read(&Artifact::Beats).await? {
                let beats = parse_beats(&json)?;
                info!(beats = beats.len(), "Resumed beats from artifact");
                return Ok(beats);
            }
        }
        self.extract_beats(source_text).await
    }

    /// Remove scene artifacts numbered past the current beat list.
    async fn clear_stale_scenes(&self, beat_count: usize) -> RetellResult<()> {
        let mut index = beat_count + 1;
        while self.store.exists(&Artifact::Scene(index)).await? {
            self.store.remove(&Artifact::Scene(index)).await?;
            index += 1;
        }
        if index > beat_count + 1 {
            info!(removed = index - beat_count - 1, "Removed stale scene artifacts");
        }
        Ok(())
    }

    /// Run every stage and persist the final artifacts.
    ///
    /// Fatal failures carry the stage that raised them. Per-beat generation
    /// failures, blank scenes, a recovered world bible retry and beat
    /// entities missing from the bible are reported as anomalies instead.
    #[instrument(skip_all, fields(provider = self.driver.provider_name(), model = self.model_name()))]
    pub async fn run(
        &self,
        source_text: &str,
        target_context: &str,
        blocklist: &Blocklist,
    ) -> RetellResult<PipelineOutput> {
        require_non_empty("source_text", source_text)
            .and_then(|_| require_non_empty("target_context", target_context))
            .map_err(at_stage(PipelineStage::WorldBible))?;

        let mut anomalies = Vec::new();

        let (bible, retried) = self
            .load_or_build_world_bible(source_text, target_context)
            .await
            .map_err(at_stage(PipelineStage::WorldBible))?;
        anomalies.extend(retried);

        let beats = self
            .load_or_extract_beats(source_text)
            .await
            .map_err(at_stage(PipelineStage::Beats))?;

        for beat in &beats {
            for name in beat.entities() {
                if !bible.covers(name) {
                    warn!(beat = beat.index(), entity = %name, "Beat entity missing from world bible");
                    anomalies.push(Anomaly::UnmappedEntity {
                        beat_index: *beat.index(),
                        name: name.clone(),
                    });
                }
            }
        }

        self.clear_stale_scenes(beats.len())
            .await
            .map_err(at_stage(PipelineStage::Prose))?;

        let mut scenes = Vec::with_capacity(beats.len());
        for beat in &beats {
            let scene = self
                .generate_prose(target_context, beat, &bible, blocklist)
                .await
                .map_err(at_stage(PipelineStage::Prose))?;
            match scene.status() {
                SceneStatus::Written => {}
                SceneStatus::Empty => anomalies.push(Anomaly::EmptyScene {
                    beat_index: *scene.beat_index(),
                }),
                SceneStatus::Failed { reason } => anomalies.push(Anomaly::FailedScene {
                    beat_index: *scene.beat_index(),
                    reason: reason.clone(),
                }),
            }
            scenes.push(scene);
        }
        scenes.sort_by_key(|scene| *scene.beat_index());

        let narrative = render_narrative(&scenes);
        let prose = scenes
            .iter()
            .map(|scene| scene.prose().as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let validation = validate(&prose, blocklist, self.options.snippet_radius);
        info!(
            passed = validation.passed(),
            violations = validation.violations().len(),
            "Validation complete"
        );

        let metadata = RunMetadata::new(
            self.driver.provider_name(),
            self.model_name(),
            *validation.terms_checked(),
            beats.len(),
        );
        let report = RunReport::new(validation, anomalies, metadata);

        self.persist_report(&bible, &narrative, &report)
            .await
            .map_err(at_stage(PipelineStage::Assembly))?;

        Ok(PipelineOutput {
            world_bible: bible,
            beats,
            scenes,
            narrative,
            report,
        })
    }

    async fn persist_report(
        &self,
        bible: &WorldBible,
        narrative: &str,
        report: &RunReport,
    ) -> RetellResult<()> {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| JsonError::new(format!("Failed to serialize run report: {}", e)))?;
        self.store.write(&Artifact::ValidationReport, &json).await?;

        let story = render_story(&self.options.title, bible, narrative, report);
        let location = self.store.write(&Artifact::Story, &story).await?;
        info!(location = %location, "Story written");
        Ok(())
    }
}
