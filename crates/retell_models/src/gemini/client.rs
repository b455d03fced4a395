//! Google Gemini API implementation.
//!
//! # Architecture
//!
//! The [`GeminiClient`] keeps one `gemini_rust::Gemini` client per model name.
//! When a request names a model (via `GenerateRequest::model`), the client for
//! that model is created on first use and reused afterwards; requests without
//! a model use the client's default model.
//!
//! The client never retries. A failed call surfaces as a
//! [`ServiceError`](retell_error::ServiceError) carrying the HTTP status code
//! when one can be recovered from the provider's error message.
//!
//! # Example
//!
//! ```no_run
//! use retell_models::GeminiClient;
//! use retell_core::{GenerateRequest, ResponseFormat};
//! use retell_interface::RetellDriver;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::with_model("gemini-2.5-flash")?;
//!
//! let request = GenerateRequest::from_prompt(
//!     "Return only JSON.",
//!     "List three characters of Macbeth as a JSON array.",
//!     ResponseFormat::Json,
//! )?;
//! let response = client.generate(&request).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};
use tracing::instrument;

use gemini_rust::{Gemini, client::Model};

use retell_core::{GenerateRequest, GenerateResponse, ResponseFormat};
use retell_error::{RetellResult, ServiceError, ServiceErrorKind};
use retell_interface::RetellDriver;

use super::GeminiResult;

/// Environment variable holding the Gemini API key.
const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Client for Google Gemini API with per-model client caching.
#[derive(Clone)]
pub struct GeminiClient {
    /// Cache of model-specific REST API clients
    clients: Arc<Mutex<HashMap<String, Gemini>>>,
    /// API key for creating new clients
    api_key: String,
    /// Default model name when req.model is None
    model_name: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model_name", &self.model_name)
            .field("cached_clients", &self.cached_client_count())
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Model used when neither the client nor the request names one.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";

    /// Create a new Gemini client using the default model.
    ///
    /// Reads the API key from the `GEMINI_API_KEY` environment variable.
    #[instrument(name = "gemini_client_new")]
    pub fn new() -> RetellResult<Self> {
        Self::with_model(Self::DEFAULT_MODEL)
    }

    /// Create a new Gemini client with a specific default model.
    ///
    /// Reads the API key from the `GEMINI_API_KEY` environment variable.
    #[instrument(name = "gemini_client_with_model", skip(model_name))]
    pub fn with_model(model_name: impl Into<String>) -> RetellResult<Self> {
        let api_key = env::var(API_KEY_VAR)
            .map_err(|_| ServiceError::new(ServiceErrorKind::MissingApiKey(API_KEY_VAR)))?;
        Ok(Self::from_api_key(api_key, model_name))
    }

    /// Create a client from an explicit API key.
    pub fn from_api_key(api_key: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            api_key: api_key.into(),
            model_name: model_name.into(),
        }
    }

    /// Convert a model name string to a gemini-rust Model enum variant.
    ///
    /// Unrecognized names use `Model::Custom`, adding the "models/" prefix
    /// the Gemini API requires.
    fn model_name_to_enum(name: &str) -> Model {
        match name {
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "gemini-2.5-flash-lite" => Model::Gemini25FlashLite,
            "gemini-2.5-pro" => Model::Gemini25Pro,
            other => {
                if other.starts_with("models/") {
                    Model::Custom(other.to_string())
                } else {
                    Model::Custom(format!("models/{}", other))
                }
            }
        }
    }

    fn cached_client_count(&self) -> usize {
        self.clients
            .lock()
            .map(|clients| clients.len())
            .unwrap_or_default()
    }

    /// Get or create the client for a model.
    fn client_for(&self, model_name: &str) -> GeminiResult<Gemini> {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(client) = clients.get(model_name) {
            return Ok(client.clone());
        }

        let client = Gemini::with_model(&self.api_key, Self::model_name_to_enum(model_name))
            .map_err(|e| ServiceError::new(ServiceErrorKind::ClientCreation(e.to_string())))?;
        tracing::debug!(model = model_name, "Created Gemini client");
        clients.insert(model_name.to_string(), client.clone());
        Ok(client)
    }

    /// Internal generate method that returns service errors.
    #[instrument(skip_all, fields(model = tracing::field::Empty, format = %req.response_format()))]
    async fn generate_internal(&self, req: &GenerateRequest) -> GeminiResult<GenerateResponse> {
        let model_name = req.model().as_deref().unwrap_or(&self.model_name);
        tracing::Span::current().record("model", model_name);

        let client = self.client_for(model_name)?;
        let mut builder = client.generate_content();

        if let Some(system) = req.system_text() {
            let system = system.to_string();
            builder = builder.with_system_prompt(&system);
        }

        let prompt = req.user_text();
        builder = builder.with_user_message(&prompt);

        if *req.response_format() == ResponseFormat::Json {
            builder = builder.with_response_mime_type(ResponseFormat::Json.mime_type());
        }

        if let Some(temp) = req.temperature() {
            builder = builder.with_temperature(*temp);
        }

        if let Some(max_tok) = req.max_tokens() {
            builder = builder.with_max_output_tokens(*max_tok as i32);
        }

        let response = builder.execute().await.map_err(Self::parse_gemini_error)?;
        let text = response.text();

        tracing::debug!(chars = text.chars().count(), "Gemini response received");
        let response = GenerateResponse::new(text);
        if response.is_blank() {
            tracing::warn!("Gemini returned no text");
        }
        Ok(response)
    }

    /// Parse gemini-rust errors to extract HTTP status codes.
    fn parse_gemini_error(err: impl std::fmt::Display) -> ServiceError {
        let err_msg = err.to_string();

        // Example: "bad response from server; code 503; description: ..."
        if let Some(status_code) = Self::extract_status_code(&err_msg) {
            ServiceError::new(ServiceErrorKind::HttpError {
                status_code,
                message: err_msg,
            })
        } else {
            ServiceError::new(ServiceErrorKind::ApiRequest(err_msg))
        }
    }

    /// Extract HTTP status code from error message string.
    fn extract_status_code(error_msg: &str) -> Option<u16> {
        let code_start = error_msg.find("code ")?;
        let code_str = &error_msg[code_start + 5..];
        let end = code_str
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(code_str.len());
        code_str[..end].parse().ok()
    }
}

#[async_trait]
impl RetellDriver for GeminiClient {
    async fn generate(&self, req: &GenerateRequest) -> RetellResult<GenerateResponse> {
        self.generate_internal(req).await.map_err(Into::into)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
