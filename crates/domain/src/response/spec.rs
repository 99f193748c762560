//! Response specification type
//!
//! Contains the representation of a received HTTP response: status,
//! flattened headers, raw body text, the parsed payload and timing.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::path::{PathError, query_path};

/// Parsed response payload.
///
/// A body that parses as JSON is kept structured; anything else stays text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ResponseData {
    /// Body parsed as JSON.
    Json(Value),
    /// Body that is not valid JSON.
    Text(String),
}

impl ResponseData {
    /// Parses a body, falling back to text when it is not JSON.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Self::Text(body.to_string());
        }
        serde_json::from_str(trimmed).map_or_else(|_| Self::Text(body.to_string()), Self::Json)
    }

    /// Returns the JSON value if the body was JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Returns true if the body parsed as JSON.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }
}

impl Default for ResponseData {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// HTTP response specification.
///
/// Built once by the transport and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, flattened to one value per name.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Parsed payload.
    pub data: ResponseData,
    /// Raw body text.
    pub body: String,
    /// Time from dispatch to the last body byte.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl ResponseSpec {
    /// Creates a new `ResponseSpec` from raw response data.
    ///
    /// Invalid UTF-8 in the body is replaced with the replacement character.
    #[must_use]
    pub fn new(
        status: u16,
        headers: HashMap<String, String>,
        body: &[u8],
        duration: Duration,
    ) -> Self {
        let body = String::from_utf8_lossy(body).into_owned();
        let data = ResponseData::from_body(&body);
        Self {
            status,
            headers,
            data,
            body,
            duration,
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the `Content-Type` header value, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("content-type")
    }

    /// Returns the response time in whole milliseconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    /// Looks up a dot path inside the parsed payload.
    ///
    /// Text bodies only answer the root path (`""` or `$`), which yields the
    /// whole text as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a `PathError` if the path is malformed.
    pub fn query(&self, path: &str) -> Result<Option<Value>, PathError> {
        match &self.data {
            ResponseData::Json(json) => Ok(query_path(json, path)?.cloned()),
            ResponseData::Text(text) => {
                let path = path.trim();
                if path.is_empty() || path == "$" {
                    Ok(Some(Value::String(text.clone())))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
