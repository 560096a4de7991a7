//! Resource sub-clients
//!
//! Each sub-client maps its operations onto transport calls and decodes the
//! returned JSON object into typed models.

mod auth;
mod clients;
mod programs;
mod users;

pub use auth::AuthApi;
pub use clients::ClientsApi;
pub use programs::ProgramsApi;
pub use users::UsersApi;

use carespace_core::{CarespaceError, JsonMap, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a transport result into a typed model
pub(crate) fn decode<T: DeserializeOwned>(map: JsonMap) -> Result<T> {
    serde_json::from_value(Value::Object(map)).map_err(|e| CarespaceError::Decode(e.to_string()))
}

/// Percent-encode a resource identifier for use as a path segment
pub(crate) fn segment(id: &str) -> Result<String> {
    if id.trim().is_empty() {
        return Err(CarespaceError::validation("Resource ID cannot be empty"));
    }
    Ok(urlencoding::encode(id).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use carespace_core::api::MessageResponse;
    use carespace_core::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_decode_success() {
        let map = json!({"message": "ok"}).as_object().unwrap().clone();
        let response: MessageResponse = decode(map).unwrap();
        assert_eq!(response.message, "ok");
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let err = decode::<MessageResponse>(JsonMap::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_segment() {
        assert_eq!(segment("abc-123").unwrap(), "abc-123");
        assert_eq!(segment("a/b c").unwrap(), "a%2Fb%20c");
        assert!(segment("  ").is_err());
    }
}
