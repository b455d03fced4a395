//! Top-level error wrapper types.

use crate::{
    BuilderError, ConfigError, JsonError, PipelineError, PipelineErrorKind, PipelineStage,
    ServiceError, StageError, StorageError,
};

/// Every error condition the Retell crates can raise.
///
/// # Examples
///
/// ```
/// use retell_error::{RetellError, JsonError};
///
/// let err: RetellError = JsonError::new("unexpected end of input").into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum RetellErrorKind {
    /// Generation service error
    #[from(ServiceError)]
    Service(ServiceError),
    /// Pipeline invariant or parsing error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Error annotated with the failing stage
    #[from(StageError)]
    Stage(StageError),
    /// Artifact storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
}

/// Retell error with kind discrimination.
///
/// # Examples
///
/// ```
/// use retell_error::{RetellResult, ConfigError};
///
/// fn might_fail() -> RetellResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Retell Error: {}", _0)]
pub struct RetellError(Box<RetellErrorKind>);

impl RetellError {
    /// Create a new error from a kind.
    pub fn new(kind: RetellErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RetellErrorKind {
        &self.0
    }

    /// The stage this error was raised in, if it carries one.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self.kind() {
            RetellErrorKind::Stage(stage_error) => Some(stage_error.stage()),
            _ => None,
        }
    }

    /// The pipeline error kind, looking through any stage annotation.
    pub fn pipeline_kind(&self) -> Option<&PipelineErrorKind> {
        match self.kind() {
            RetellErrorKind::Pipeline(err) => Some(&err.kind),
            RetellErrorKind::Stage(stage_error) => stage_error.error().pipeline_kind(),
            _ => None,
        }
    }

    /// Whether the generation service caused this error, looking through any
    /// stage annotation.
    pub fn is_service_error(&self) -> bool {
        match self.kind() {
            RetellErrorKind::Service(_) => true,
            RetellErrorKind::Stage(stage_error) => stage_error.error().is_service_error(),
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to RetellErrorKind
impl<T> From<T> for RetellError
where
    T: Into<RetellErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Retell operations.
pub type RetellResult<T> = std::result::Result<T, RetellError>;
