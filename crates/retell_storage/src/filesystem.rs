//! Filesystem-based artifact storage.

use crate::{Artifact, ArtifactStore};
use retell_error::{RetellResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem storage backend.
///
/// Stores every artifact as a flat file directly under the base directory:
///
/// ```text
/// output/
/// ├── world_bible.json
/// ├── beats.json
/// ├── scene_001.txt
/// ├── scene_002.txt
/// ├── validation_report.json
/// └── story_output.txt
/// ```
///
/// Writes go to a uniquely named temp file first and are renamed into place,
/// so a reader never observes a half-written artifact.
#[derive(Debug, Clone)]
pub struct FileSystemArtifactStore {
    base_path: PathBuf,
}

impl FileSystemArtifactStore {
    /// Create a new filesystem store.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> RetellResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %base_path.display(), "Created artifact directory");
        Ok(Self { base_path })
    }

    /// Root directory of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Full path of an artifact.
    pub fn path_of(&self, artifact: &Artifact) -> PathBuf {
        self.base_path.join(artifact.file_name())
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FileSystemArtifactStore {
    #[tracing::instrument(skip_all, fields(artifact = %artifact, bytes = contents.len()))]
    async fn write(&self, artifact: &Artifact, contents: &str) -> RetellResult<String> {
        let path = self.path_of(artifact);
        let temp_path = self
            .base_path
            .join(format!(".{}.{}.tmp", artifact.file_name(), Uuid::new_v4()));

        tokio::fs::write(&temp_path, contents).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(path = %path.display(), "Wrote artifact");
        Ok(path.to_string_lossy().to_string())
    }

    #[tracing::instrument(skip_all, fields(artifact = %artifact))]
    async fn read(&self, artifact: &Artifact) -> RetellResult<Option<String>> {
        let path = self.path_of(artifact);

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), bytes = contents.len(), "Read artifact");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }

    #[tracing::instrument(skip_all, fields(artifact = %artifact))]
    async fn remove(&self, artifact: &Artifact) -> RetellResult<bool> {
        let path = self.path_of(artifact);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Removed artifact");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileRemove(format!(
                "{}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }

    async fn exists(&self, artifact: &Artifact) -> RetellResult<bool> {
        Ok(tokio::fs::try_exists(self.path_of(artifact))
            .await
            .unwrap_or(false))
    }
}
