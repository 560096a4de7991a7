//! Authentication endpoints

use carespace_core::api::{LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest};
use carespace_core::{CarespaceError, JsonMap, Result};
use serde_json::json;
use std::sync::Arc;

use super::decode;
use crate::transport::HttpTransport;

/// Authentication API client
#[derive(Debug, Clone)]
pub struct AuthApi {
    transport: Arc<HttpTransport>,
}

fn map_of(pairs: &[(&str, &str)]) -> JsonMap {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), json!(value)))
        .collect()
}

impl AuthApi {
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// Authenticate a user and get access tokens.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed email or empty password
    /// before anything is sent, and an authentication error when the server
    /// rejects the credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = LoginRequest::new(email, password);
        request.validate()?;

        let data = self.transport.post("/auth/login", Some(&request), None).await?;
        decode(data)
    }

    /// Invalidate the current session on the server
    pub async fn logout(&self) -> Result<MessageResponse> {
        let data = self.transport.post("/auth/logout", None, None).await?;
        decode(data)
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<LoginResponse> {
        if refresh_token.is_empty() {
            return Err(CarespaceError::authentication("Refresh token cannot be empty"));
        }
        let request = RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        };

        let data = self.transport.post("/auth/refresh", Some(&request), None).await?;
        decode(data)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        let body = map_of(&[("email", email)]);
        let data = self
            .transport
            .post("/auth/forgot-password", Some(&body), None)
            .await?;
        decode(data)
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<MessageResponse> {
        let body = map_of(&[("token", token), ("password", password)]);
        let data = self
            .transport
            .post("/auth/reset-password", Some(&body), None)
            .await?;
        decode(data)
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse> {
        let body = map_of(&[
            ("current_password", current_password),
            ("new_password", new_password),
        ]);
        let data = self
            .transport
            .post("/auth/change-password", Some(&body), None)
            .await?;
        decode(data)
    }

    pub async fn verify_email(&self, token: &str) -> Result<MessageResponse> {
        let body = map_of(&[("token", token)]);
        let data = self
            .transport
            .post("/auth/verify-email", Some(&body), None)
            .await?;
        decode(data)
    }

    pub async fn resend_verification(&self, email: &str) -> Result<MessageResponse> {
        let body = map_of(&[("email", email)]);
        let data = self
            .transport
            .post("/auth/resend-verification", Some(&body), None)
            .await?;
        decode(data)
    }
}
