//! Core data types for the Retell pipeline.
//!
//! This crate provides the request and response types exchanged with a
//! text-generation service.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod format;
mod message;
mod request;
mod role;

pub use format::ResponseFormat;
pub use message::Message;
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse};
pub use role::Role;
