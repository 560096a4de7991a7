//! HTTP transport shared by every resource sub-client.
//!
//! The transport owns the base URL, the bearer credential and the retry
//! policy. Each verb method assembles the URL, normalizes the payload,
//! executes the attempt through an [`HttpBackend`] and returns the decoded
//! JSON object.
//!
//! # Retry Logic
//!
//! Only failures that produced no response are retried:
//! - Timeouts (per attempt)
//! - Network errors (connection refused, DNS, reset)
//! - Anything else the backend could not classify
//!
//! Up to `max_retries` retries follow the first attempt. Before retry `n`
//! (starting at 1) the transport sleeps `2^(n-1)` backoff units, so the
//! waits are 1, 2, 4, ... units. Any non-2xx response is classified and
//! returned immediately, without consuming a retry.

mod backend;
mod classify;

pub use backend::{
    HttpBackend, HttpMethod, OutgoingRequest, RawResponse, ReqwestBackend, TransportFailure,
};
pub use classify::classify_response;

use carespace_core::{CarespaceError, JsonMap, Payload, QueryParams, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, USER_AGENT};

/// Async HTTP transport with retry, error classification and credential state
#[derive(Debug)]
pub struct HttpTransport {
    base_url: String,
    credential: RwLock<Option<String>>,
    timeout: Duration,
    max_retries: u32,
    backoff_unit: Duration,
    default_headers: Vec<(String, String)>,
    backend: Arc<dyn HttpBackend>,
    closed: AtomicBool,
}

impl HttpTransport {
    /// Create a transport backed by a pooled reqwest client
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let backend = ReqwestBackend::new(config.timeout)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Create a transport over a custom backend
    pub fn with_backend(config: &ClientConfig, backend: Arc<dyn HttpBackend>) -> Self {
        let mut default_headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        for (name, value) in &config.headers {
            set_header(&mut default_headers, name, value);
        }

        let credential = config.api_key.clone().filter(|key| !key.is_empty());

        Self {
            base_url: normalize_url(&config.base_url),
            credential: RwLock::new(credential),
            timeout: config.timeout,
            max_retries: config.max_retries,
            backoff_unit: config.backoff_unit,
            default_headers,
            backend,
            closed: AtomicBool::new(false),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Current bearer credential, if any
    pub fn credential(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the bearer credential.
    ///
    /// Applies to every request whose headers are built after this call;
    /// attempts already in flight keep the header they were sent with.
    pub fn set_credential(&self, credential: impl Into<String>) {
        *self
            .credential
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential.into());
        info!("API credential updated");
    }

    /// Remove the bearer credential
    pub fn clear_credential(&self) {
        *self
            .credential
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        info!("API credential cleared");
    }

    /// Release the underlying connection pool.
    ///
    /// Safe to call more than once; returns `true` only for the call that
    /// actually closed the transport. Later requests fail immediately.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.backend.close();
        info!(base_url = %self.base_url, "HTTP transport closed");
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Join the base URL and `path` with exactly one slash and append the
    /// percent-encoded query string, keeping parameter order.
    pub fn build_url(&self, path: &str, params: Option<&QueryParams>) -> String {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        if let Some(params) = params {
            let query = params
                .rendered()
                .into_iter()
                .map(|(key, value)| {
                    format!(
                        "{}={}",
                        urlencoding::encode(key),
                        urlencoding::encode(&value)
                    )
                })
                .collect::<Vec<_>>()
                .join("&");

            if !query.is_empty() {
                url.push('?');
                url.push_str(&query);
            }
        }

        url
    }

    /// Headers for one attempt, with the credential as of now
    fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers = self.default_headers.clone();
        if let Some(credential) = self.credential() {
            set_header(&mut headers, "Authorization", &format!("Bearer {}", credential));
        }
        headers
    }

    pub async fn get(&self, path: &str, params: Option<&QueryParams>) -> Result<JsonMap> {
        self.request(HttpMethod::Get, path, None, params).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Option<&dyn Payload>,
        params: Option<&QueryParams>,
    ) -> Result<JsonMap> {
        self.request(HttpMethod::Post, path, body, params).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Option<&dyn Payload>,
        params: Option<&QueryParams>,
    ) -> Result<JsonMap> {
        self.request(HttpMethod::Put, path, body, params).await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: Option<&dyn Payload>,
        params: Option<&QueryParams>,
    ) -> Result<JsonMap> {
        self.request(HttpMethod::Patch, path, body, params).await
    }

    pub async fn delete(&self, path: &str, params: Option<&QueryParams>) -> Result<JsonMap> {
        self.request(HttpMethod::Delete, path, None, params).await
    }

    /// Execute a request with automatic retry logic.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the first non-2xx response, or the
    /// last transport-level failure once all attempts are used up.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&dyn Payload>,
        params: Option<&QueryParams>,
    ) -> Result<JsonMap> {
        if self.is_closed() {
            return Err(CarespaceError::generic("HTTP client is closed"));
        }

        let url = self.build_url(path, params);
        let body = match body {
            Some(payload) => Some(serde_json::to_string(&payload.to_payload()?)?),
            None => None,
        };

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.backoff_delay(attempt - 1);
                warn!(
                    %method,
                    %url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying request after backoff"
                );
                tokio::time::sleep(delay).await;
            }

            let request = OutgoingRequest {
                method,
                url: url.clone(),
                headers: self.request_headers(),
                body: body.clone(),
            };

            debug!(%method, %url, attempt, "sending request");

            let failure = match tokio::time::timeout(self.timeout, self.backend.execute(request)).await
            {
                Ok(Ok(response)) => {
                    if !response.is_success() {
                        let error = classify_response(&response);
                        debug!(%method, %url, status = response.status, "request failed: {}", error);
                        return Err(error);
                    }
                    return Ok(decode_body(&response.body));
                }
                Ok(Err(failure)) => failure,
                Err(_elapsed) => TransportFailure::Timeout,
            };

            let error = self.transport_error(failure);
            debug!(%method, %url, attempt, "attempt failed: {}", error);
            last_error = Some(error);
        }

        Err(last_error
            .unwrap_or_else(|| CarespaceError::generic("Request failed after all retries")))
    }

    /// Wait before retry `attempt + 1`: `2^attempt` backoff units
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(Duration::MAX)
    }

    fn transport_error(&self, failure: TransportFailure) -> CarespaceError {
        match failure {
            TransportFailure::Timeout => CarespaceError::Timeout {
                message: format!("Request timed out after {}s", self.timeout.as_secs_f64()),
                duration: self.timeout,
            },
            TransportFailure::Network(source) => CarespaceError::Network {
                message: "Network error".to_string(),
                source,
            },
            TransportFailure::Other(reason) => {
                CarespaceError::generic(format!("Unexpected error: {}", reason))
            }
        }
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Remove trailing slashes from a base URL
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Insert or replace a header, matching names case-insensitively
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        Some(entry) => {
            entry.0 = name.to_string();
            entry.1 = value.to_string();
        }
        None => headers.push((name.to_string(), value.to_string())),
    }
}

/// Decode a successful body; anything but a JSON object yields an empty map
fn decode_body(body: &str) -> JsonMap {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            if !body.trim().is_empty() {
                debug!("response body is not a JSON object, returning empty map");
            }
            JsonMap::new()
        }
    }
}
