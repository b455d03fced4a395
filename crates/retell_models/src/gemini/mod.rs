//! Google Gemini API client implementation.
//!
//! [`GeminiClient`] talks to the Gemini REST API and supports per-request model
//! selection with lazily created, cached per-model clients.

mod client;

pub use client::GeminiClient;

/// Result type for Gemini operations.
pub type GeminiResult<T> = Result<T, retell_error::ServiceError>;
