//! In-memory artifact storage.

use crate::{Artifact, ArtifactStore};
use retell_error::RetellResult;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Artifact store that keeps everything in memory.
///
/// Useful for tests and dry runs. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactStore {
    artifacts: Arc<Mutex<BTreeMap<Artifact, String>>>,
}

impl InMemoryArtifactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All artifacts written so far, in artifact order.
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.lock().keys().copied().collect()
    }

    /// Contents of an artifact, if written.
    pub fn get(&self, artifact: &Artifact) -> Option<String> {
        self.lock().get(artifact).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<Artifact, String>> {
        // Every mutation is a single insert or remove, so a poisoned map is still consistent.
        self.artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn write(&self, artifact: &Artifact, contents: &str) -> RetellResult<String> {
        self.lock().insert(*artifact, contents.to_string());
        tracing::debug!(artifact = %artifact, bytes = contents.len(), "Stored artifact in memory");
        Ok(format!("memory://{}", artifact.file_name()))
    }

    async fn read(&self, artifact: &Artifact) -> RetellResult<Option<String>> {
        Ok(self.get(artifact))
    }

    async fn remove(&self, artifact: &Artifact) -> RetellResult<bool> {
        Ok(self.lock().remove(artifact).is_some())
    }
}
