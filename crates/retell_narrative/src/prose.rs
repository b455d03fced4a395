//! Per-beat prose generation.

use crate::prompts::{PROSE_SYSTEM, prose_prompt};
use crate::{Beat, Blocklist, Pipeline, WorldBible};
use retell_core::ResponseFormat;
use retell_error::RetellResult;
use retell_interface::RetellDriver;
use retell_storage::{Artifact, ArtifactStore};
use serde::{Deserialize, Serialize};

/// Outcome of generating one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SceneStatus {
    /// Prose was produced
    Written,
    /// The service returned blank text
    Empty,
    /// The service call failed
    Failed {
        /// Error reported by the service
        reason: String,
    },
}

/// Prose for one beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct GeneratedScene {
    /// Index of the beat this scene renders
    beat_index: usize,
    /// Generated text, empty unless written
    prose: String,
    /// Generation outcome
    status: SceneStatus,
}

impl GeneratedScene {
    /// A written scene. Blank prose is recorded as [`SceneStatus::Empty`].
    pub fn written(beat_index: usize, prose: impl Into<String>) -> Self {
        let prose = prose.into().trim().to_string();
        let status = if prose.is_empty() {
            SceneStatus::Empty
        } else {
            SceneStatus::Written
        };
        Self {
            beat_index,
            prose,
            status,
        }
    }

    /// A scene whose generation call failed.
    pub fn failed(beat_index: usize, reason: impl Into<String>) -> Self {
        Self {
            beat_index,
            prose: String::new(),
            status: SceneStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    /// Whether prose was produced.
    pub fn is_written(&self) -> bool {
        self.status == SceneStatus::Written
    }
}

impl<D: RetellDriver, S: ArtifactStore> Pipeline<D, S> {
    /// Generate the prose for one beat.
    ///
    /// Each call is independent: no earlier scene is included in the prompt.
    /// A failed or blank generation is recorded in the returned scene rather
    /// than returned as an error; only persisting the scene can fail. A failed
    /// beat leaves no scene artifact behind, even one from an earlier run.
    #[tracing::instrument(skip_all, fields(beat = beat.index()))]
    pub async fn generate_prose(
        &self,
        target_context: &str,
        beat: &Beat,
        bible: &WorldBible,
        blocklist: &Blocklist,
    ) -> RetellResult<GeneratedScene> {
        let prompt = prose_prompt(target_context, beat, bible, blocklist);
        let request = self.request(PROSE_SYSTEM, prompt, ResponseFormat::Text)?;

        let scene = match self.driver().generate(&request).await {
            Ok(response) => GeneratedScene::written(*beat.index(), response.into_text()),
            Err(e) => {
                tracing::warn!(error = %e, "Scene generation failed");
                GeneratedScene::failed(*beat.index(), e.to_string())
            }
        };

        match scene.status() {
            SceneStatus::Written => {
                self.store()
                    .write(&Artifact::Scene(*beat.index()), scene.prose())
                    .await?;
                tracing::debug!(chars = scene.prose().len(), "Scene written");
            }
            SceneStatus::Empty => {
                self.store()
                    .write(&Artifact::Scene(*beat.index()), "")
                    .await?;
                tracing::warn!("Scene generation returned no text");
            }
            SceneStatus::Failed { .. } => {
                if self.store().remove(&Artifact::Scene(*beat.index())).await? {
                    tracing::debug!("Removed scene left by an earlier run");
                }
            }
        }

        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_prose_is_empty_scene() {
        let scene = GeneratedScene::written(2, " \n ");
        assert_eq!(*scene.status(), SceneStatus::Empty);
        assert!(!scene.is_written());
    }

    #[test]
    fn test_failed_scene_serialization() {
        let json = serde_json::to_value(GeneratedScene::failed(3, "HTTP 503")).unwrap();
        assert_eq!(json["status"]["status"], "failed");
        assert_eq!(json["status"]["reason"], "HTTP 503");
    }
}
