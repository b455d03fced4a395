//! Error types for the Retell pipeline.
//!
//! This crate provides the foundation error types used throughout the Retell workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use retell_error::{RetellResult, ConfigError};
//!
//! fn load() -> RetellResult<String> {
//!     Err(ConfigError::new("Missing output directory"))?
//! }
//!
//! match load() {
//!     Ok(value) => println!("Got: {}", value),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod json;
mod pipeline;
mod service;
mod storage;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{RetellError, RetellErrorKind, RetellResult};
pub use json::JsonError;
pub use pipeline::{PipelineError, PipelineErrorKind, PipelineStage, StageError};
pub use service::{ServiceError, ServiceErrorKind};
pub use storage::{StorageError, StorageErrorKind};
