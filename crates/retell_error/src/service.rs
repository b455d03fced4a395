//! Generation service error types.

/// Failure conditions of the external text-generation service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ServiceErrorKind {
    /// API key not found in environment
    #[display("{} environment variable not set", _0)]
    MissingApiKey(&'static str),
    /// Failed to create the provider client
    #[display("Failed to create client: {}", _0)]
    ClientCreation(String),
    /// API request failed without a recognizable status code
    #[display("API request failed: {}", _0)]
    ApiRequest(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
}

impl ServiceErrorKind {
    /// HTTP status code reported by the service, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceErrorKind::HttpError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Generation service error with source location tracking.
///
/// # Examples
///
/// ```
/// use retell_error::{ServiceError, ServiceErrorKind};
///
/// let err = ServiceError::new(ServiceErrorKind::MissingApiKey("GEMINI_API_KEY"));
/// assert!(format!("{}", err).contains("GEMINI_API_KEY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Service Error: {} at line {} in {}", kind, line, file)]
pub struct ServiceError {
    /// The kind of error that occurred
    pub kind: ServiceErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ServiceError {
    /// Create a new ServiceError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ServiceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
