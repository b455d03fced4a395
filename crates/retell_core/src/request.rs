//! Request and response types for text generation.

use crate::{Message, ResponseFormat, Role};
use retell_error::{BuilderError, RetellResult};
use serde::{Deserialize, Serialize};

/// A single generation request.
///
/// # Examples
///
/// ```
/// use retell_core::{GenerateRequest, Message, ResponseFormat};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::user("Hello!")])
///     .response_format(ResponseFormat::Json)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 1);
/// assert_eq!(*request.response_format(), ResponseFormat::Json);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Default,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into), default)]
pub struct GenerateRequest {
    /// The prompt messages to send
    messages: Vec<Message>,
    /// Expected shape of the response text
    response_format: ResponseFormat,
    /// Maximum number of tokens to generate
    max_tokens: Option<u32>,
    /// Sampling temperature
    temperature: Option<f32>,
    /// Model identifier to use instead of the driver default
    model: Option<String>,
}

impl GenerateRequest {
    /// Create a new builder.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }

    /// Builder pre-filled with a system instruction, a user prompt and the
    /// expected response format.
    pub fn prompt(
        system: impl Into<String>,
        prompt: impl Into<String>,
        response_format: ResponseFormat,
    ) -> GenerateRequestBuilder {
        let mut builder = Self::builder();
        builder
            .messages(vec![Message::system(system), Message::user(prompt)])
            .response_format(response_format);
        builder
    }

    /// Build a request from a system instruction and a user prompt.
    pub fn from_prompt(
        system: impl Into<String>,
        prompt: impl Into<String>,
        response_format: ResponseFormat,
    ) -> RetellResult<Self> {
        Ok(Self::prompt(system, prompt, response_format)
            .build()
            .map_err(|e| BuilderError::from(e.to_string()))?)
    }

    /// Text of the system message, if any.
    pub fn system_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.text.as_str())
    }

    /// All user message texts joined with newlines.
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The text returned by a generation call.
///
/// # Examples
///
/// ```
/// use retell_core::GenerateResponse;
///
/// let response = GenerateResponse::new("  Once upon a time.  ");
/// assert!(!response.is_blank());
/// assert!(GenerateResponse::new("\n\t").is_blank());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct GenerateResponse {
    /// The generated text
    text: String,
}

impl GenerateResponse {
    /// Wrap generated text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whether the service returned nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Consume the response, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }
}
