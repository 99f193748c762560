//! Variable store
//!
//! Holds the bindings for one run. Seeded before the run, then grown and
//! overwritten by capture directives as requests complete.

use std::collections::HashMap;

use courier_domain::{RequestBody, RequestSpec, ResponseSpec};
use serde_json::Value;
use thiserror::Error;

use super::parser::parse_variables;

/// Result of substituting placeholders in one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// The text with every known placeholder replaced.
    pub resolved: String,

    /// Names that were substituted, in order of appearance.
    pub resolved_variables: Vec<String>,

    /// Names left verbatim because no binding exists.
    pub unresolved: Vec<String>,
}

impl ResolutionResult {
    /// Returns true if every placeholder was substituted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// A capture expression that did not yield a value.
///
/// Non-fatal: the target variable keeps its previous value (or stays unset).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("capture '{key}' from '{expression}': {reason}")]
pub struct ExtractionMiss {
    /// Destination variable name.
    pub key: String,
    /// The expression that missed.
    pub expression: String,
    /// Why nothing was extracted.
    pub reason: String,
}

/// Named variable bindings for a single run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableStore {
    variables: HashMap<String, Value>,
}

impl VariableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `variables` into the store; later keys overwrite earlier ones.
    pub fn set_variables(&mut self, variables: impl IntoIterator<Item = (String, Value)>) {
        self.variables.extend(variables);
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Returns all bindings.
    #[must_use]
    pub const fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Replaces every `${name}` whose binding exists; leaves the rest verbatim.
    ///
    /// Substitution is a single pass: a bound value that itself contains
    /// `${...}` is inserted as-is and not expanded, so applying this twice
    /// to such text may change it again. Text without placeholders is
    /// returned unchanged.
    #[must_use]
    pub fn replace_variables(&self, text: &str) -> String {
        self.resolve(text).resolved
    }

    /// Substitutes placeholders and reports which names were (un)resolved.
    #[must_use]
    pub fn resolve(&self, text: &str) -> ResolutionResult {
        let references = parse_variables(text);
        let mut resolved = String::with_capacity(text.len());
        let mut resolved_variables = Vec::new();
        let mut unresolved = Vec::new();
        let mut last_end = 0;

        for reference in references {
            resolved.push_str(&text[last_end..reference.span.start]);
            match self.variables.get(&reference.name) {
                Some(value) => {
                    resolved.push_str(&value_to_string(value));
                    resolved_variables.push(reference.name);
                }
                None => {
                    resolved.push_str(&text[reference.span.clone()]);
                    unresolved.push(reference.name);
                }
            }
            last_end = reference.span.end;
        }
        resolved.push_str(&text[last_end..]);

        ResolutionResult {
            resolved,
            resolved_variables,
            unresolved,
        }
    }

    /// Returns an execution-ready copy of `request` with placeholders
    /// substituted in the URL, header values and body.
    ///
    /// Unresolved names are logged and left in place.
    #[must_use]
    pub fn substitute_request(&self, request: &RequestSpec) -> RequestSpec {
        let mut unresolved = Vec::new();
        let mut apply = |text: &str| {
            let result = self.resolve(text);
            unresolved.extend(result.unresolved);
            result.resolved
        };

        let mut substituted = request.clone();
        substituted.url = apply(&request.url);
        for header in substituted.headers.iter_mut() {
            header.value = apply(&header.value);
        }
        substituted.body = match &request.body {
            RequestBody::None => RequestBody::None,
            RequestBody::Text(text) => RequestBody::Text(apply(text)),
            RequestBody::Json(json) => RequestBody::Json(substitute_json(json, &mut apply)),
        };

        if !unresolved.is_empty() {
            let unresolved = distinct_names(unresolved);
            tracing::warn!(
                request = %request.name,
                unresolved = ?unresolved,
                "unresolved variables left in request"
            );
        }

        substituted
    }

    /// Extracts `expression` from the response data and binds it to `key`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionMiss` when the path is malformed or does not exist;
    /// the store is left unchanged.
    pub fn capture(
        &mut self,
        key: &str,
        expression: &str,
        response: &ResponseSpec,
    ) -> Result<Value, ExtractionMiss> {
        let miss = |reason: String| ExtractionMiss {
            key: key.to_string(),
            expression: expression.to_string(),
            reason,
        };

        let value = response
            .query(expression)
            .map_err(|e| miss(e.to_string()))?
            .ok_or_else(|| miss("path not found in response".to_string()))?;

        self.variables.insert(key.to_string(), value.clone());
        Ok(value)
    }
}

/// Sorted names with duplicates removed, wherever they appeared.
fn distinct_names(mut names: Vec<String>) -> Vec<String> {
    names.sort_unstable();
    names.dedup();
    names
}

/// String form used for substitution: strings verbatim, anything else as JSON.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn substitute_json(value: &Value, apply: &mut impl FnMut(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(apply(s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| substitute_json(v, apply)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_json(v, apply)))
                .collect(),
        ),
        other => other.clone(),
    }
}
