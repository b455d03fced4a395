//! Narrative transformation pipeline for Retell.
//!
//! This crate turns a source narrative and a target context into a retold
//! narrative whose names, objects and settings are substituted consistently,
//! then flags any source vocabulary that leaked through.
//!
//! # Stages
//!
//! 1. **World bible**: one JSON call mapping every source entity to its
//!    replacement ([`WorldBible`]), retried once if unparseable
//! 2. **Beats**: one JSON call reducing the source to ordered [`Beat`]s
//! 3. **Prose**: one call per beat with the bible and a negative constraint
//!    built from the [`Blocklist`] ([`GeneratedScene`])
//! 4. **Validation**: case-insensitive substring scan of the prose for
//!    blocklisted terms ([`validate`])
//!
//! Each stage persists its output through a
//! [`retell_storage::ArtifactStore`] before the next begins.
//!
//! # Example
//!
//! ```rust,ignore
//! use retell_narrative::{Pipeline, RetellConfig};
//! use retell_models::GeminiClient;
//! use retell_storage::FileSystemArtifactStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RetellConfig::load(None)?;
//! let pipeline = Pipeline::new(
//!     GeminiClient::with_model(&config.generation.model)?,
//!     FileSystemArtifactStore::new(&config.output.dir)?,
//! )
//! .with_options(config.pipeline_options(false)?);
//!
//! let output = pipeline
//!     .run(&source, "A 2030 high-frequency trading firm", &config.blocklist()?)
//!     .await?;
//! println!("{}", output.narrative());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod beats;
mod blocklist;
mod config;
mod extraction;
mod pipeline;
mod prompts;
mod prose;
mod render;
mod report;
mod validator;
mod world_bible;

pub use beats::{Beat, parse_beats};
pub use blocklist::{Blocklist, DEFAULT_TERMS};
pub use config::{BlocklistConfig, GenerationConfig, OutputConfig, RetellConfig};
pub use extraction::{extract_and_parse, extract_json, parse_json};
pub use pipeline::{
    DEFAULT_TITLE, GenerationSettings, Pipeline, PipelineOptions, PipelineOptionsBuilder,
    PipelineOutput,
};
pub use prompts::{
    beats_prompt, negative_constraint, prose_prompt, render_world_bible, world_bible_prompt,
    world_bible_retry_prompt,
};
pub use prose::{GeneratedScene, SceneStatus};
pub use render::{render_narrative, render_report, render_story, render_validation};
pub use report::{Anomaly, PIPELINE_VERSION, RunMetadata, RunReport};
pub use validator::{DEFAULT_SNIPPET_RADIUS, ValidationReport, Violation, validate};
pub use world_bible::{EntityCategory, Mapping, WorldBible};
