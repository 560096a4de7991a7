//! High-level Carespace client
//!
//! [`CarespaceClient`] owns one shared [`HttpTransport`] and exposes the
//! resource sub-clients on top of it. Changing the credential through the
//! facade is visible to every sub-client at once.

use carespace_core::api::{
    ClientsListResponse, LoginResponse, PaginationParams, ProgramFilter, ProgramsListResponse,
    UsersListResponse,
};
use carespace_core::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::api::{AuthApi, ClientsApi, ProgramsApi, UsersApi};
use crate::config::{ClientConfig, Environment};
use crate::transport::{HttpBackend, HttpTransport};

/// Main entry point to the Carespace API
#[derive(Debug, Clone)]
pub struct CarespaceClient {
    transport: Arc<HttpTransport>,
    auth: AuthApi,
    users: UsersApi,
    clients: ClientsApi,
    programs: ProgramsApi,
}

impl CarespaceClient {
    /// Create a client using the default reqwest backend
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::from_transport(Arc::new(transport)))
    }

    /// Create a client over a custom HTTP backend
    pub fn with_backend(config: ClientConfig, backend: Arc<dyn HttpBackend>) -> Self {
        Self::from_transport(Arc::new(HttpTransport::with_backend(&config, backend)))
    }

    fn from_transport(transport: Arc<HttpTransport>) -> Self {
        Self {
            auth: AuthApi::new(Arc::clone(&transport)),
            users: UsersApi::new(Arc::clone(&transport)),
            clients: ClientsApi::new(Arc::clone(&transport)),
            programs: ProgramsApi::new(Arc::clone(&transport)),
            transport,
        }
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn users(&self) -> &UsersApi {
        &self.users
    }

    pub fn clients(&self) -> &ClientsApi {
        &self.clients
    }

    pub fn programs(&self) -> &ProgramsApi {
        &self.programs
    }

    /// The shared transport
    pub fn transport(&self) -> &Arc<HttpTransport> {
        &self.transport
    }

    /// Set or replace the bearer credential for all subsequent requests
    pub fn set_api_key(&self, api_key: impl Into<String>) {
        self.transport.set_credential(api_key);
    }

    pub fn api_key(&self) -> Option<String> {
        self.transport.credential()
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Per-attempt timeout
    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }

    /// Release the connection pool. Later calls through any clone fail.
    pub fn close(&self) -> bool {
        self.transport.close()
    }

    /// Log in and install the returned access token as the credential
    pub async fn login_and_set_token(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let response = self.auth.login(email, password).await?;
        self.set_api_key(response.access_token.clone());
        Ok(response)
    }

    pub async fn quick_get_users(
        &self,
        limit: u32,
        search: Option<&str>,
    ) -> Result<UsersListResponse> {
        let mut params = PaginationParams::default().with_limit(limit);
        params.search = search.map(str::to_string);
        self.users.get_users(&params).await
    }

    pub async fn quick_get_clients(
        &self,
        limit: u32,
        search: Option<&str>,
    ) -> Result<ClientsListResponse> {
        let mut params = PaginationParams::default().with_limit(limit);
        params.search = search.map(str::to_string);
        self.clients.get_clients(&params).await
    }

    pub async fn quick_get_programs(
        &self,
        limit: u32,
        category: Option<&str>,
    ) -> Result<ProgramsListResponse> {
        let filter = ProgramFilter {
            pagination: PaginationParams::default().with_limit(limit),
            category: category.map(str::to_string),
            ..ProgramFilter::default()
        };
        self.programs.get_programs(&filter).await
    }

    /// Check that the API is reachable and answering.
    ///
    /// With a credential this fetches the caller's profile, otherwise a
    /// one-item user listing. Any error counts as unhealthy.
    pub async fn health_check(&self) -> bool {
        let outcome = if self.api_key().is_some() {
            self.users.get_user_profile().await.map(|_| ())
        } else {
            self.users
                .get_users(&PaginationParams::default().with_limit(1))
                .await
                .map(|_| ())
        };

        match outcome {
            Ok(()) => true,
            Err(e) => {
                debug!("health check failed: {}", e);
                false
            }
        }
    }
}

/// Create a client for `base_url` with default timeout and retries
pub fn create_client(base_url: &str, api_key: Option<&str>) -> Result<CarespaceClient> {
    let mut builder = ClientConfig::builder().with_base_url(base_url)?;
    if let Some(key) = api_key {
        builder = builder.with_api_key(key);
    }
    CarespaceClient::new(builder.build()?)
}

/// Create a client for the production deployment
pub fn create_production_client(api_key: &str) -> Result<CarespaceClient> {
    environment_client(Environment::Production, Some(api_key))
}

/// Create a client for the development deployment
pub fn create_development_client(api_key: Option<&str>) -> Result<CarespaceClient> {
    environment_client(Environment::Development, api_key)
}

fn environment_client(environment: Environment, api_key: Option<&str>) -> Result<CarespaceClient> {
    let mut builder = ClientConfig::builder().with_environment(environment);
    if let Some(key) = api_key {
        builder = builder.with_api_key(key);
    }
    CarespaceClient::new(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{json_response, ScriptedBackend, Step};
    use carespace_core::ErrorKind;
    use serde_json::json;

    fn scripted_client(steps: Vec<Step>) -> (CarespaceClient, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::new(steps));
        let config = ClientConfig {
            base_url: "https://api.example.com".to_string(),
            max_retries: 0,
            ..ClientConfig::default()
        };
        (CarespaceClient::with_backend(config, backend.clone()), backend)
    }

    fn login_body() -> serde_json::Value {
        json!({
            "access_token": "fresh-token",
            "refresh_token": "refresh",
            "expires_in": 3600
        })
    }

    #[tokio::test]
    async fn test_login_and_set_token() {
        let (client, backend) = scripted_client(vec![
            json_response(200, login_body()),
            json_response(200, json!({"id": "me", "email": "me@example.com"})),
        ]);
        assert!(client.api_key().is_none());

        let response = client
            .login_and_set_token("me@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(response.access_token, "fresh-token");
        assert_eq!(client.api_key().as_deref(), Some("fresh-token"));

        client.users().get_user_profile().await.unwrap();
        assert_eq!(
            backend.last_request().header("authorization"),
            Some("Bearer fresh-token")
        );
    }

    #[tokio::test]
    async fn test_failed_login_keeps_credential() {
        let (client, _backend) = scripted_client(vec![json_response(
            401,
            json!({"message": "Invalid credentials"}),
        )]);
        client.set_api_key("old");

        let err = client
            .login_and_set_token("me@example.com", "wrong")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(client.api_key().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_sub_clients_share_credential() {
        let (client, backend) = scripted_client(vec![
            json_response(200, json!({"data": [], "total": 0, "page": 1, "limit": 5, "pages": 0})),
            json_response(200, json!({"data": [], "total": 0, "page": 1, "limit": 5, "pages": 0})),
        ]);

        client.set_api_key("shared");
        client.quick_get_clients(5, Some("doe")).await.unwrap();
        client.quick_get_programs(5, Some("rehab")).await.unwrap();

        let requests = backend.requests();
        assert_eq!(
            requests[0].url,
            "https://api.example.com/clients?page=1&limit=5&search=doe&sort_order=asc"
        );
        assert!(requests[1].url.contains("category=rehab"));
        for request in requests {
            assert_eq!(request.header("Authorization"), Some("Bearer shared"));
        }
    }

    #[tokio::test]
    async fn test_health_check_without_credential_lists_users() {
        let (client, backend) = scripted_client(vec![json_response(
            200,
            json!({"data": [], "total": 0, "page": 1, "limit": 1, "pages": 0}),
        )]);

        assert!(client.health_check().await);
        assert_eq!(
            backend.last_request().url,
            "https://api.example.com/users?page=1&limit=1&sort_order=asc"
        );
    }

    #[tokio::test]
    async fn test_health_check_with_credential_uses_profile() {
        let (client, backend) = scripted_client(vec![json_response(
            200,
            json!({"id": "me", "email": "me@example.com"}),
        )]);
        client.set_api_key("token");

        assert!(client.health_check().await);
        assert_eq!(backend.last_request().url, "https://api.example.com/users/profile");
    }

    #[tokio::test]
    async fn test_health_check_failure_is_false() {
        let (client, _backend) = scripted_client(vec![Step::NetworkFailure]);
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_close_is_shared_by_clones() {
        let (client, backend) = scripted_client(vec![]);
        let clone = client.clone();

        assert!(client.close());
        assert!(!clone.close());
        assert_eq!(backend.close_count(), 1);

        let err = clone.users().get_user_profile().await.unwrap_err();
        assert_eq!(err.message(), "HTTP client is closed");
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_factories() {
        let client = tokio_test::assert_ok!(create_production_client("prod-key"));
        assert_eq!(client.base_url(), "https://api.carespace.ai");
        assert_eq!(client.api_key().as_deref(), Some("prod-key"));

        let client = create_development_client(None).unwrap();
        assert_eq!(client.base_url(), "https://api-dev.carespace.ai");
        assert!(client.api_key().is_none());
        assert_eq!(client.timeout(), Duration::from_secs(30));

        let client = create_client("https://custom.example.com/", Some("k")).unwrap();
        assert_eq!(client.base_url(), "https://custom.example.com");

        tokio_test::assert_err!(create_client("not-a-url", None));
    }
}
