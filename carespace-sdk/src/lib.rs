//! Carespace SDK
//!
//! Async client for the Carespace REST API. The primary entry point is
//! [`CarespaceClient`], which shares one [`transport::HttpTransport`]
//! between the auth, users, clients and programs sub-clients.
//!
//! ```no_run
//! use carespace_sdk::create_development_client;
//!
//! # async fn example() -> carespace_core::Result<()> {
//! let client = create_development_client(None)?;
//! client
//!     .login_and_set_token("user@example.com", "password")
//!     .await?;
//!
//! let users = client.quick_get_users(10, None).await?;
//! println!("Found {} users", users.data.len());
//! client.close();
//! # Ok(())
//! # }
//! ```
//!
//! Requests that fail before producing a response (timeouts, connection
//! errors) are retried with exponential backoff. HTTP error responses are
//! classified into [`CarespaceError`] variants and returned immediately.

/// Resource sub-clients.
pub mod api;

/// High-level client facade and factories.
pub mod client;

/// Client configuration and environment overrides.
pub mod config;

/// HTTP transport, backends and response classification.
pub mod transport;

#[cfg(test)]
pub(crate) mod test_utils;

pub use client::{
    create_client, create_development_client, create_production_client, CarespaceClient,
};
pub use config::{ClientConfig, ClientConfigBuilder, Environment};

pub use carespace_core::{CarespaceError, ErrorKind, Result};
