//! Command-line surface of carespacectl
//!
//! - [`commands`] holds the clap command tree
//! - [`handlers`] runs each command against the SDK client

mod commands;
mod handlers;

pub use commands::*;
pub use handlers::*;
