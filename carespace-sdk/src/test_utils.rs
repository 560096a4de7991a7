//! Test utilities for transport and sub-client testing
//!
//! Provides a scripted in-memory backend that replays canned outcomes and
//! records every attempt it receives.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::transport::{HttpBackend, HttpTransport, OutgoingRequest, RawResponse, TransportFailure};

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum Step {
    /// Return this response
    Respond(RawResponse),
    /// Fail with a network error
    NetworkFailure,
    /// Fail with a backend-reported timeout
    TimeoutFailure,
    /// Fail with an unclassified error
    OtherFailure(String),
    /// Never complete
    Hang,
}

/// Build a JSON response step
pub fn json_response(status: u16, body: Value) -> Step {
    Step::Respond(RawResponse {
        status,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: body.to_string(),
    })
}

/// Backend that replays [`Step`]s in order
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<OutgoingRequest>>,
    call_times: Mutex<Vec<Instant>>,
    closes: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            ..Self::default()
        }
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> OutgoingRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Instants at which each attempt arrived
    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpBackend for ScriptedBackend {
    async fn execute(&self, request: OutgoingRequest) -> Result<RawResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request);
        self.call_times.lock().unwrap().push(Instant::now());

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::NetworkFailure) => Err(TransportFailure::Network(Box::new(
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            ))),
            Some(Step::TimeoutFailure) => Err(TransportFailure::Timeout),
            Some(Step::OtherFailure(reason)) => Err(TransportFailure::Other(reason)),
            Some(Step::Hang) => std::future::pending().await,
            None => Err(TransportFailure::Other("no scripted response left".to_string())),
        }
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Transport over a scripted backend, with no retries
pub fn scripted_transport(steps: Vec<Step>) -> (Arc<HttpTransport>, Arc<ScriptedBackend>) {
    let backend = Arc::new(ScriptedBackend::new(steps));
    let config = ClientConfig {
        base_url: "https://api.example.com".to_string(),
        max_retries: 0,
        ..ClientConfig::default()
    };
    let transport = Arc::new(HttpTransport::with_backend(&config, backend.clone()));
    (transport, backend)
}
