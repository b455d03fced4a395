//! Retell - consistent narrative retelling with LLMs.
//!
//! Retell moves a source narrative into a new setting through a fixed
//! three-call pipeline, then checks the result for leaked source vocabulary.
//!
//! # Features
//!
//! - **World Bible**: a validated, one-to-one mapping of characters, objects,
//!   locations and concepts onto the target context
//! - **Beat extraction**: the source reduced to ordered scene summaries
//! - **Constrained prose**: one call per beat carrying the full mapping and an
//!   explicit list of forbidden terms
//! - **Consistency validation**: case-insensitive scan for blocklisted terms,
//!   with context snippets
//! - **Inspectable artifacts**: every stage writes a file that can be
//!   reviewed, hand-edited and resumed from
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use retell::{Blocklist, FileSystemArtifactStore, GeminiClient, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = std::fs::read_to_string("macbeth.txt")?;
//!     let pipeline = Pipeline::new(GeminiClient::new()?, FileSystemArtifactStore::new("output")?);
//!
//!     let output = pipeline
//!         .run(&source, "A 2030 high-frequency trading firm", &Blocklist::default_terms())
//!         .await?;
//!     println!("{}", output.narrative());
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `gemini` (default) - Google Gemini driver
//! - `api` - run tests that call the live API
//!
//! # Architecture
//!
//! - `retell_error` - Error types
//! - `retell_core` - Generation request and response types
//! - `retell_interface` - `RetellDriver` trait definition
//! - `retell_storage` - Artifact storage
//! - `retell_models` - LLM provider implementations
//! - `retell_narrative` - The transformation pipeline
//!
//! This crate (`retell`) re-exports everything for convenience.

pub use retell_core::*;
pub use retell_error::*;
pub use retell_interface::*;
pub use retell_narrative::*;
pub use retell_storage::*;

#[cfg(feature = "gemini")]
pub use retell_models::*;

pub mod observability;
