//! Response format hints.

use serde::{Deserialize, Serialize};

/// Hint telling the service what shape of text to produce.
///
/// Providers that support a structured output mode map [`ResponseFormat::Json`]
/// onto it; others may ignore the hint and rely on the prompt wording.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum ResponseFormat {
    /// Free-form prose
    #[default]
    #[display("text")]
    Text,
    /// A single JSON document
    #[display("json")]
    Json,
}

impl ResponseFormat {
    /// MIME type matching this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text/plain",
            ResponseFormat::Json => "application/json",
        }
    }
}
