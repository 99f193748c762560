//! HTTP Request body types

use serde::{Deserialize, Serialize};

/// HTTP request body.
///
/// Bodies read from a script are always `Text`; `Json` exists for callers
/// that build requests programmatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// Raw text, sent verbatim (also used for hand-written multipart bodies)
    Text(String),
    /// Structured JSON, serialised when the request is dispatched
    Json(serde_json::Value),
}

impl RequestBody {
    /// Creates an empty body.
    #[must_use]
    pub const fn none() -> Self {
        Self::None
    }

    /// Creates a raw text body.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Creates a structured JSON body.
    #[must_use]
    pub const fn json(value: serde_json::Value) -> Self {
        Self::Json(value)
    }

    /// Returns whether the body is empty or none.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(content) => content.is_empty(),
            Self::Json(_) => false,
        }
    }

    /// Returns the raw text if this is a text body.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(content) => Some(content),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body() {
        assert!(RequestBody::none().is_empty());
        assert!(RequestBody::text("").is_empty());
        assert!(!RequestBody::json(serde_json::json!(null)).is_empty());
    }

    #[test]
    fn test_as_text() {
        let body = RequestBody::text("hello");
        assert_eq!(body.as_text(), Some("hello"));
        assert_eq!(RequestBody::json(serde_json::json!({})).as_text(), None);
    }
}
