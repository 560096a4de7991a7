//! In-process mock of the Carespace API for integration testing.
//!
//! Serves a small stateful subset of the REST surface plus a few routes
//! that misbehave on purpose (rate limiting, plain-text errors, slow
//! responses).

#![allow(dead_code)]

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const VALID_EMAIL: &str = "user@example.com";
pub const VALID_PASSWORD: &str = "password123";
pub const VALID_TOKEN: &str = "valid-access-token";

/// Mock server state
#[derive(Debug, Clone, Default)]
pub struct MockServerState {
    /// Users keyed by ID
    pub users: Arc<Mutex<HashMap<String, Value>>>,
    /// Clients keyed by ID
    pub clients: Arc<Mutex<HashMap<String, Value>>>,
    /// Hits on the slow route
    pub slow_hits: Arc<AtomicUsize>,
    /// Authorization header of the last request that carried one
    pub last_authorization: Arc<Mutex<Option<String>>>,
}

impl MockServerState {
    fn seeded() -> Self {
        let state = Self::default();
        {
            let mut users = state.users.lock().unwrap();
            for (id, first, last) in [("u1", "Alice", "Smith"), ("u2", "Bob", "Jones")] {
                users.insert(
                    id.to_string(),
                    json!({
                        "id": id,
                        "email": format!("{}@example.com", first.to_lowercase()),
                        "first_name": first,
                        "last_name": last,
                        "role": "practitioner",
                        "is_active": true,
                        "created_at": "2024-01-15T09:30:00Z"
                    }),
                );
            }
        }
        state
    }
}

/// Mock server implementation
#[derive(Debug)]
pub struct MockServer {
    state: MockServerState,
    port: u16,
}

impl MockServer {
    pub fn new() -> Self {
        Self {
            state: MockServerState::seeded(),
            port: 0,
        }
    }

    /// Start the mock server and return the base URL
    pub async fn start(mut self) -> Result<(Self, String)> {
        let app = self.create_router();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        self.port = addr.port();

        let server_url = format!("http://127.0.0.1:{}", self.port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        for _ in 0..20 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Ok((self, server_url))
    }

    pub fn state(&self) -> &MockServerState {
        &self.state
    }

    fn create_router(&self) -> Router {
        Router::new()
            .route("/auth/login", post(login_handler))
            .route("/users", get(list_users_handler))
            .route("/users/profile", get(profile_handler))
            .route("/users/:id", get(get_user_handler))
            .route("/clients", post(create_client_handler))
            .route("/clients/:id", get(get_client_handler))
            .route("/rate-limited", get(rate_limited_handler))
            .route("/broken", get(broken_handler))
            .route("/plain", get(plain_handler))
            .route("/slow", get(slow_handler))
            .with_state(self.state.clone())
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn record_authorization(state: &MockServerState, headers: &HeaderMap) {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        *state.last_authorization.lock().unwrap() = Some(value.to_string());
    }
}

async fn login_handler(Json(body): Json<Value>) -> Response {
    if body["email"] == VALID_EMAIL && body["password"] == VALID_PASSWORD {
        Json(json!({
            "access_token": VALID_TOKEN,
            "refresh_token": "refresh-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        }))
        .into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn list_users_handler(
    State(state): State<MockServerState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record_authorization(&state, &headers);

    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: u32 = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(20);
    let search = params.get("search").map(|s| s.to_lowercase());

    let mut users: Vec<Value> = state
        .users
        .lock()
        .unwrap()
        .values()
        .filter(|user| match &search {
            Some(term) => user.to_string().to_lowercase().contains(term),
            None => true,
        })
        .cloned()
        .collect();
    users.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str()));

    let total = users.len() as u32;
    let data: Vec<Value> = users.into_iter().take(limit as usize).collect();

    Json(json!({
        "data": data,
        "total": total,
        "page": page,
        "limit": limit,
        "pages": total.div_ceil(limit.max(1))
    }))
    .into_response()
}

async fn profile_handler(State(state): State<MockServerState>, headers: HeaderMap) -> Response {
    record_authorization(&state, &headers);

    let expected = format!("Bearer {}", VALID_TOKEN);
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Json(json!({
            "id": "me",
            "email": VALID_EMAIL,
            "name": "Current User"
        }))
        .into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "Authentication required"),
    }
}

async fn get_user_handler(State(state): State<MockServerState>, Path(id): Path<String>) -> Response {
    match state.users.lock().unwrap().get(&id) {
        Some(user) => Json(user.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn create_client_handler(
    State(state): State<MockServerState>,
    Json(mut body): Json<Value>,
) -> Response {
    if body.get("name").and_then(Value::as_str).unwrap_or("").is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "name is required" })),
        )
            .into_response();
    }

    let mut clients = state.clients.lock().unwrap();
    let id = format!("c{}", clients.len() + 1);
    body["id"] = json!(id);
    clients.insert(id, body.clone());

    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_client_handler(
    State(state): State<MockServerState>,
    Path(id): Path<String>,
) -> Response {
    match state.clients.lock().unwrap().get(&id) {
        Some(client) => Json(client.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Client not found"),
    }
}

async fn rate_limited_handler() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, "30")],
        Json(json!({ "message": "Too many requests" })),
    )
        .into_response()
}

async fn broken_handler() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn plain_handler() -> Response {
    (StatusCode::OK, "OK").into_response()
}

async fn slow_handler(State(state): State<MockServerState>) -> Response {
    state.slow_hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({ "message": "finally" })).into_response()
}
