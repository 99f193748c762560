//! Dot-path queries over JSON values.
//!
//! Supported forms: `field`, `field.nested`, `$.field`, `array[0]`,
//! `array.0`, `array[*]` and the empty path / `$` for the whole document.

use serde_json::Value;
use thiserror::Error;

/// A path expression that cannot be evaluated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The bracket index is not a number or `*`.
    #[error("invalid array index '{0}'")]
    InvalidIndex(String),

    /// A `[` without a matching `]`.
    #[error("unclosed '[' in segment '{0}'")]
    UnclosedBracket(String),
}

/// Looks up `path` inside `json`.
///
/// Returns `Ok(None)` when an intermediate segment is missing; traversal
/// stops at the first missing segment.
///
/// # Errors
///
/// Returns a `PathError` when the path itself is malformed.
pub fn query_path<'a>(json: &'a Value, path: &str) -> Result<Option<&'a Value>, PathError> {
    let path = path.trim();
    let path = path.strip_prefix('$').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);

    let mut current = json;
    for segment in split_path_segments(path) {
        if let Some((name, index)) = parse_array_access(&segment)? {
            if !name.is_empty() {
                match current.get(name) {
                    Some(v) => current = v,
                    None => return Ok(None),
                }
            }
            if index == "*" {
                return Ok(Some(current));
            }
            let idx: usize = index
                .parse()
                .map_err(|_| PathError::InvalidIndex(index.to_string()))?;
            match current.get(idx) {
                Some(v) => current = v,
                None => return Ok(None),
            }
        } else {
            let next = match current {
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => current.get(segment.as_str()),
            };
            match next {
                Some(v) => current = v,
                None => return Ok(None),
            }
        }
    }

    Ok(Some(current))
}

/// Split a path into segments, respecting array brackets.
fn split_path_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_bracket = false;

    for ch in path.chars() {
        match ch {
            '.' if !in_bracket => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                in_bracket = true;
                current.push(ch);
            }
            ']' => {
                in_bracket = false;
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Parse array access like "field[0]" into ("field", "0").
fn parse_array_access(segment: &str) -> Result<Option<(&str, &str)>, PathError> {
    let Some(bracket_start) = segment.find('[') else {
        return Ok(None);
    };
    if !segment.ends_with(']') {
        return Err(PathError::UnclosedBracket(segment.to_string()));
    }
    let name = &segment[..bracket_start];
    let index = segment[bracket_start + 1..segment.len() - 1].trim();
    Ok(Some((name, index)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_plain_and_dollar_paths_agree() {
        let doc = json!({"user": {"id": 123, "name": "John"}});
        assert_eq!(query_path(&doc, "user.id").unwrap(), Some(&json!(123)));
        assert_eq!(query_path(&doc, "$.user.id").unwrap(), Some(&json!(123)));
    }

    #[test]
    fn test_missing_intermediate_stops() {
        let doc = json!({"user": {"id": 1}});
        assert_eq!(query_path(&doc, "account.id").unwrap(), None);
        assert_eq!(query_path(&doc, "user.id.deeper").unwrap(), None);
    }

    #[test]
    fn test_array_access() {
        let doc = json!({"items": [{"id": 1}, {"id": 2}]});
        assert_eq!(query_path(&doc, "items[1].id").unwrap(), Some(&json!(2)));
        assert_eq!(query_path(&doc, "items.0.id").unwrap(), Some(&json!(1)));
        assert_eq!(query_path(&doc, "items[5]").unwrap(), None);
        assert_eq!(
            query_path(&doc, "items[*]").unwrap(),
            Some(&json!([{"id": 1}, {"id": 2}]))
        );
    }

    #[test]
    fn test_root_path() {
        let doc = json!([1, 2]);
        assert_eq!(query_path(&doc, "$").unwrap(), Some(&doc));
        assert_eq!(query_path(&doc, "").unwrap(), Some(&doc));
    }

    #[test]
    fn test_malformed_paths() {
        let doc = json!({"items": []});
        assert_eq!(
            query_path(&doc, "items[x]"),
            Err(PathError::InvalidIndex("x".to_string()))
        );
        assert_eq!(
            query_path(&doc, "items[0"),
            Err(PathError::UnclosedBracket("items[0".to_string()))
        );
    }
}
