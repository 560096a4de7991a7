//! Translation of failed HTTP responses into classified errors

use carespace_core::{CarespaceError, JsonMap};
use serde_json::Value;

use super::backend::RawResponse;

/// Map a non-2xx response to the matching [`CarespaceError`] kind.
///
/// | status     | kind           |
/// |------------|----------------|
/// | 401        | Authentication |
/// | 400, 4xx   | Validation     |
/// | 404        | NotFound       |
/// | 429        | RateLimit      |
/// | 5xx        | Server         |
/// | other      | Generic        |
pub fn classify_response(response: &RawResponse) -> CarespaceError {
    let status = response.status;
    let parsed = serde_json::from_str::<Value>(&response.body).ok();
    let message = extract_message(status, parsed.as_ref(), &response.body);
    let body = match parsed {
        Some(Value::Object(map)) => map,
        _ => JsonMap::new(),
    };
    let status_code = Some(status);

    match status {
        401 => CarespaceError::Authentication {
            message,
            status: status_code,
            body,
        },
        404 => CarespaceError::NotFound {
            message,
            status: status_code,
            body,
        },
        429 => CarespaceError::RateLimit {
            message,
            status: status_code,
            retry_after: parse_retry_after(response.header("Retry-After")),
            body,
        },
        400..=499 => CarespaceError::Validation {
            message,
            status: status_code,
            body,
        },
        500..=599 => CarespaceError::Server {
            message,
            status: status_code,
            body,
        },
        _ => CarespaceError::Generic {
            message,
            status: status_code,
            body,
        },
    }
}

/// Pick the error message: `message` key, `error` key, raw text, `HTTP <status>`
fn extract_message(status: u16, parsed: Option<&Value>, text: &str) -> String {
    if let Some(Value::Object(map)) = parsed {
        for key in ["message", "error"] {
            match map.get(key) {
                Some(Value::String(s)) => return s.clone(),
                Some(Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }

    if text.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        text.to_string()
    }
}

/// Integer seconds from a `Retry-After` header; anything else is ignored
fn parse_retry_after(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse().ok())
}
