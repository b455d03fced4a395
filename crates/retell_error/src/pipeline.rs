//! Pipeline error types.

use crate::RetellError;

/// Stages of a transformation run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineStage {
    /// World bible generation
    #[display("world bible")]
    WorldBible,
    /// Beat extraction
    #[display("beat extraction")]
    Beats,
    /// Per-beat prose generation
    #[display("prose generation")]
    Prose,
    /// Final narrative assembly and persistence
    #[display("assembly")]
    Assembly,
}

/// Specific error conditions raised by the pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// A required input was empty or whitespace
    #[display("Input '{}' must not be empty", _0)]
    EmptyInput(String),
    /// World bible response could not be parsed
    #[display("World bible could not be parsed after {} attempt(s): {}", attempts, reason)]
    MalformedMapping {
        /// Number of generation attempts made
        attempts: u32,
        /// Parse failure of the final attempt
        reason: String,
    },
    /// An original term maps to more than one replacement
    #[display("Term '{}' is mapped in both '{}' and '{}'", term, first, second)]
    AmbiguousMapping {
        /// The duplicated original term
        term: String,
        /// Category holding the first occurrence
        first: String,
        /// Category holding the conflicting occurrence
        second: String,
    },
    /// Beat extraction produced no beats
    #[display("Beat extraction returned zero beats")]
    EmptyExtraction,
    /// Beat extraction response could not be parsed
    #[display("Beat list could not be parsed: {}", _0)]
    MalformedBeats(String),
}

/// Error type for pipeline operations.
///
/// # Examples
///
/// ```
/// use retell_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::EmptyExtraction);
/// assert!(format!("{}", err).contains("zero beats"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// A fatal error annotated with the stage that raised it.
///
/// # Examples
///
/// ```
/// use retell_error::{PipelineError, PipelineErrorKind, PipelineStage, StageError};
///
/// let err = StageError::new(
///     PipelineStage::Beats,
///     PipelineError::new(PipelineErrorKind::EmptyExtraction).into(),
/// );
/// assert!(format!("{}", err).starts_with("beat extraction stage failed"));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("{} stage failed: {}", stage, error)]
pub struct StageError {
    stage: PipelineStage,
    #[error(source)]
    error: RetellError,
}

impl StageError {
    /// Attach a stage to an error.
    pub fn new(stage: PipelineStage, error: RetellError) -> Self {
        Self { stage, error }
    }

    /// The stage that failed.
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// The underlying error.
    pub fn error(&self) -> &RetellError {
        &self.error
    }
}
