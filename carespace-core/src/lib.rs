//! Carespace Core Library
//!
//! Shared types, models, and the error taxonomy for the Carespace API.
//! This crate is used by both the SDK and the CLI.

pub mod api;
pub mod error;
pub mod payload;
pub mod types;

// Re-export commonly used types
pub use error::*;
pub use payload::{model_payload, JsonMap, Payload, QueryParams, QueryValue};
pub use types::*;
