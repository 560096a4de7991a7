//! User management endpoints

use carespace_core::api::{
    CreateUserRequest, MessageResponse, PaginationParams, UpdateUserRequest, UsersListResponse,
};
use carespace_core::{JsonMap, Result, User};
use std::sync::Arc;

use super::{decode, segment};
use crate::transport::HttpTransport;

/// Users API client
#[derive(Debug, Clone)]
pub struct UsersApi {
    transport: Arc<HttpTransport>,
}

impl UsersApi {
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// List users, one page at a time
    pub async fn get_users(&self, params: &PaginationParams) -> Result<UsersListResponse> {
        params.validate()?;
        let data = self.transport.get("/users", Some(&params.to_query())).await?;
        decode(data)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        let path = format!("/users/{}", segment(user_id)?);
        decode(self.transport.get(&path, None).await?)
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User> {
        decode(self.transport.post("/users", Some(request), None).await?)
    }

    pub async fn update_user(&self, user_id: &str, request: &UpdateUserRequest) -> Result<User> {
        let path = format!("/users/{}", segment(user_id)?);
        decode(self.transport.put(&path, Some(request), None).await?)
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<MessageResponse> {
        let path = format!("/users/{}", segment(user_id)?);
        decode(self.transport.delete(&path, None).await?)
    }

    /// Profile of the user the current credential belongs to
    pub async fn get_user_profile(&self) -> Result<User> {
        decode(self.transport.get("/users/profile", None).await?)
    }

    pub async fn update_user_profile(&self, request: &UpdateUserRequest) -> Result<User> {
        decode(self.transport.put("/users/profile", Some(request), None).await?)
    }

    /// Free-form settings document of a user
    pub async fn get_user_settings(&self, user_id: &str) -> Result<JsonMap> {
        let path = format!("/users/{}/settings", segment(user_id)?);
        self.transport.get(&path, None).await
    }

    pub async fn update_user_settings(&self, user_id: &str, settings: &JsonMap) -> Result<JsonMap> {
        let path = format!("/users/{}/settings", segment(user_id)?);
        self.transport.put(&path, Some(settings), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{json_response, scripted_transport};
    use crate::transport::HttpMethod;
    use carespace_core::api::SortOrder;
    use carespace_core::ErrorKind;
    use serde_json::json;

    fn user_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "email": format!("{}@example.com", id),
            "first_name": "Test",
            "last_name": "User",
            "role": "client",
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_get_users_sends_pagination() {
        let (transport, backend) = scripted_transport(vec![json_response(
            200,
            json!({
                "data": [user_json("u1"), user_json("u2")],
                "total": 2, "page": 1, "limit": 10, "pages": 1
            }),
        )]);
        let users = UsersApi::new(transport);

        let params = PaginationParams::default()
            .with_limit(10)
            .with_search("test user")
            .with_sort("created_at", SortOrder::Desc);
        let list = users.get_users(&params).await.unwrap();

        assert_eq!(list.data.len(), 2);
        assert_eq!(list.data[0].display_name(), "Test User");
        assert_eq!(
            backend.last_request().url,
            "https://api.example.com/users?page=1&limit=10&search=test%20user&sort_by=created_at&sort_order=desc"
        );
    }

    #[tokio::test]
    async fn test_get_users_rejects_bad_limit() {
        let (transport, backend) = scripted_transport(vec![]);
        let users = UsersApi::new(transport);

        let err = users
            .get_users(&PaginationParams::page(1, 500))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_get_user() {
        let (transport, backend) = scripted_transport(vec![json_response(200, user_json("u1"))]);
        let users = UsersApi::new(transport);

        let user = users.get_user("u1").await.unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(backend.last_request().url, "https://api.example.com/users/u1");
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let (transport, _backend) =
            scripted_transport(vec![json_response(404, json!({"message": "User not found"}))]);
        let users = UsersApi::new(transport);

        let err = users.get_user("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn test_empty_id_rejected() {
        let (transport, backend) = scripted_transport(vec![]);
        let users = UsersApi::new(transport);

        assert!(users.delete_user("").await.is_err());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_user_uses_put() {
        let (transport, backend) = scripted_transport(vec![json_response(200, user_json("u1"))]);
        let users = UsersApi::new(transport);

        let request = UpdateUserRequest {
            first_name: Some("Renamed".to_string()),
            ..UpdateUserRequest::default()
        };
        users.update_user("u1", &request).await.unwrap();

        let sent = backend.last_request();
        assert_eq!(sent.method, HttpMethod::Put);
        assert_eq!(sent.body.as_deref(), Some(r#"{"first_name":"Renamed"}"#));
    }

    #[tokio::test]
    async fn test_user_settings_round_trip_raw_map() {
        let (transport, backend) = scripted_transport(vec![json_response(
            200,
            json!({"theme": "dark", "notifications": {"email": true}}),
        )]);
        let users = UsersApi::new(transport);

        let settings = json!({"theme": "dark"}).as_object().unwrap().clone();
        let updated = users.update_user_settings("u1", &settings).await.unwrap();

        assert_eq!(updated["notifications"]["email"], true);
        assert_eq!(
            backend.last_request().url,
            "https://api.example.com/users/u1/settings"
        );
    }

    #[tokio::test]
    async fn test_get_user_profile() {
        let (transport, backend) = scripted_transport(vec![json_response(200, user_json("me"))]);
        let users = UsersApi::new(transport);

        let profile = users.get_user_profile().await.unwrap();
        assert_eq!(profile.email, "me@example.com");
        assert_eq!(backend.last_request().url, "https://api.example.com/users/profile");
    }
}
