//! Carespace CLI Library
//!
//! This library provides the core functionality for the `carespacectl` tool.
//! API access goes through [`carespace_sdk::CarespaceClient`]; this crate
//! adds the command tree, file-backed configuration and output formatting.
//!
//! Configuration types are available via [`config::CliConfig`] and
//! [`config::ConfigBuilder`].

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// Configuration types for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;
