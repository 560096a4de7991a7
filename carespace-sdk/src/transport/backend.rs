//! HTTP backend seam
//!
//! The transport describes each attempt as an [`OutgoingRequest`] and hands it
//! to an [`HttpBackend`]. Non-2xx responses come back as data; only failures
//! that produced no response at all are reported as [`TransportFailure`].

use async_trait::async_trait;
use carespace_core::{BoxError, CarespaceError, Result};
use reqwest::Client;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

/// HTTP method for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One fully assembled HTTP attempt
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    /// Absolute URL including the query string
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body
    pub body: Option<String>,
}

impl OutgoingRequest {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Failure of an attempt that produced no HTTP response
#[derive(Error, Debug)]
pub enum TransportFailure {
    /// The attempt exceeded its time budget
    #[error("request timed out")]
    Timeout,

    /// Connection refused, DNS failure, reset, ...
    #[error("{0}")]
    Network(#[source] BoxError),

    /// Anything else the backend could not classify
    #[error("{0}")]
    Other(String),
}

/// Executes HTTP attempts on behalf of the transport
#[async_trait]
pub trait HttpBackend: Send + Sync + std::fmt::Debug {
    /// Perform one attempt. Must not retry on its own.
    async fn execute(&self, request: OutgoingRequest) -> std::result::Result<RawResponse, TransportFailure>;

    /// Release pooled connections. Called at most once by the transport.
    fn close(&self) {}
}

/// Default backend built on a pooled `reqwest::Client`
#[derive(Debug)]
pub struct ReqwestBackend {
    client: RwLock<Option<Client>>,
}

impl ReqwestBackend {
    /// Create a backend whose connection timeout matches the per-attempt budget
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CarespaceError::generic(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: RwLock::new(Some(client)),
        })
    }

    fn client(&self) -> Option<Client> {
        self.client
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn execute(&self, request: OutgoingRequest) -> std::result::Result<RawResponse, TransportFailure> {
        let client = self
            .client()
            .ok_or_else(|| TransportFailure::Other("HTTP client has been closed".to_string()))?;

        let mut builder = client.request(request.method.into(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn close(&self) {
        // Dropping the last handle shuts the connection pool down
        self.client
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout
    } else if err.is_connect() || err.is_request() || err.is_body() {
        TransportFailure::Network(Box::new(err))
    } else {
        TransportFailure::Other(err.to_string())
    }
}
