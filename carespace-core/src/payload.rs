//! Request payloads and query parameters
//!
//! Every request body is normalized to a plain [`JsonMap`] before it reaches
//! the transport. Typed models do this through [`Payload`], dropping fields
//! whose value is absent; raw maps pass through unchanged.

use serde::Serialize;
use serde_json::Value;

use crate::error::{CarespaceError, Result};

/// Generic decoded JSON object, as returned by every transport call
pub type JsonMap = serde_json::Map<String, Value>;

/// Capability of being sent as a JSON request body
pub trait Payload: Send + Sync {
    /// Convert into a string-keyed map, omitting absent fields
    fn to_payload(&self) -> Result<JsonMap>;
}

impl Payload for JsonMap {
    fn to_payload(&self) -> Result<JsonMap> {
        Ok(self.clone())
    }
}

/// Serialize a typed model into a map, recursively dropping `null` fields.
///
/// Fails if the model does not serialize to a JSON object.
pub fn model_payload<T: Serialize + ?Sized>(model: &T) -> Result<JsonMap> {
    match serde_json::to_value(model)? {
        Value::Object(map) => Ok(strip_nulls(map)),
        other => Err(CarespaceError::Serialization(format!(
            "payload must serialize to a JSON object, got {}",
            value_type(&other)
        ))),
    }
}

fn strip_nulls(map: JsonMap) -> JsonMap {
    map.into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| match value {
            Value::Object(inner) => (key, Value::Object(strip_nulls(inner))),
            other => (key, other),
        })
        .collect()
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Implement [`Payload`] for serializable models.
#[macro_export]
macro_rules! impl_payload {
    ($($model:ty),+ $(,)?) => {
        $(
            impl $crate::payload::Payload for $model {
                fn to_payload(&self) -> $crate::error::Result<$crate::payload::JsonMap> {
                    $crate::payload::model_payload(self)
                }
            }
        )+
    };
}

/// Scalar value of a query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl std::fmt::Display for QueryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryValue::Str(s) => write!(f, "{}", s),
            QueryValue::Int(i) => write!(f, "{}", i),
            QueryValue::Float(x) => write!(f, "{}", x),
            QueryValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Str(value.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

macro_rules! query_int {
    ($($int:ty),+) => {
        $(
            impl From<$int> for QueryValue {
                fn from(value: $int) -> Self {
                    QueryValue::Int(value as i64)
                }
            }
        )+
    };
}

query_int!(i32, i64, u8, u16, u32);

/// Ordered query-parameter mapping.
///
/// Entries keep insertion order. An entry with an absent value is kept here
/// but skipped when the URL is built, as is an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, Option<QueryValue>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }

    /// Add a parameter that may be absent (builder style)
    pub fn with_opt<V: Into<QueryValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.insert(key, value.map(Into::into));
        self
    }

    /// Insert or replace a parameter, keeping the original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: Option<QueryValue>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameters that will actually be sent, rendered as text, in order
    pub fn rendered(&self) -> Vec<(&str, String)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| {
                let text = value.as_ref()?.to_string();
                if text.is_empty() {
                    None
                } else {
                    Some((key.as_str(), text))
                }
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for QueryParams
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.insert(key, value.map(Into::into));
        }
        params
    }
}
