//! Named artifact storage for the Retell pipeline.
//!
//! Every pipeline stage persists its output as a named artifact before the next
//! stage begins. Artifacts are the only persisted state of a run: they let a
//! reviewer inspect (or hand-edit) intermediate results and let a later run
//! resume from them.
//!
//! # Example
//!
//! ```rust
//! use retell_storage::{Artifact, ArtifactStore, FileSystemArtifactStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileSystemArtifactStore::new("/tmp/retell-output")?;
//! store.write(&Artifact::Beats, "[]").await?;
//! assert_eq!(store.read(&Artifact::Beats).await?.as_deref(), Some("[]"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod filesystem;
mod memory;

pub use artifact::Artifact;
pub use filesystem::FileSystemArtifactStore;
pub use memory::InMemoryArtifactStore;
pub use retell_error::{StorageError, StorageErrorKind};

use retell_error::RetellResult;

/// Trait for pluggable artifact storage backends.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write (or overwrite) an artifact, returning where it was stored.
    async fn write(&self, artifact: &Artifact, contents: &str) -> RetellResult<String>;

    /// Read an artifact, returning `None` when it has not been written.
    async fn read(&self, artifact: &Artifact) -> RetellResult<Option<String>>;

    /// Remove an artifact, returning whether one was present.
    async fn remove(&self, artifact: &Artifact) -> RetellResult<bool>;

    /// Check whether an artifact has been written.
    async fn exists(&self, artifact: &Artifact) -> RetellResult<bool> {
        Ok(self.read(artifact).await?.is_some())
    }
}
