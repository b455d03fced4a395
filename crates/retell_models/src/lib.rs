//! Text-generation provider integrations for Retell.
//!
//! Each provider lives behind its own feature flag.
//!
//! # Available Providers
//!
//! - **Gemini** (Google) - Enable with `gemini` feature
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "gemini")]
//! # {
//! use retell_models::GeminiClient;
//! use retell_interface::RetellDriver;
//! use retell_core::{GenerateRequest, ResponseFormat};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new()?;
//! let request = GenerateRequest::from_prompt(
//!     "You are a storyteller.",
//!     "Describe a trading floor at dawn.",
//!     ResponseFormat::Text,
//! )?;
//! let response = client.generate(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
