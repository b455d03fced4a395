//! Trait definitions for the Retell pipeline.
//!
//! This crate provides the boundary between the pipeline stages and the
//! external text-generation service.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::RetellDriver;
