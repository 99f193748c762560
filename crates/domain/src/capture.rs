//! Variable capture directives.

use serde::{Deserialize, Serialize};

/// Stores a value read from a response under a variable name.
///
/// `expression` is a dot path into the response data, e.g. `access_token`,
/// `data.user.id`, `$.items[0].id` or `items.0.id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableCapture {
    /// Destination variable name.
    pub key: String,
    /// Extraction path into the response data.
    pub expression: String,
}

impl VariableCapture {
    /// Creates a new capture directive.
    #[must_use]
    pub fn new(key: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expression: expression.into(),
        }
    }
}
