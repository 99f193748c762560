//! Placeholder parser for `${variable}` syntax
//!
//! Parses strings to extract variable references with their positions.

use std::ops::Range;

/// A `${name}` occurrence in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The variable name, without `${ }` and surrounding whitespace.
    pub name: String,

    /// Byte range of the whole placeholder in the original string.
    pub span: Range<usize>,
}

/// Parses a string and extracts all variable references.
///
/// An unclosed `${` ends the scan; an empty `${}` is not a reference.
///
/// # Examples
///
/// ```
/// use courier_application::variables::parser::parse_variables;
///
/// let refs = parse_variables("Bearer ${token} for ${ user }");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "token");
/// assert_eq!(refs[1].name, "user");
/// ```
#[must_use]
pub fn parse_variables(input: &str) -> Vec<VariableReference> {
    let mut references = Vec::new();
    let mut offset = 0;

    while let Some(found) = input[offset..].find("${") {
        let start = offset + found;
        let name_start = start + 2;
        let Some(close) = input[name_start..].find('}') else {
            break;
        };
        let end = name_start + close + 1;

        let name = input[name_start..end - 1].trim();
        if !name.is_empty() {
            references.push(VariableReference {
                name: name.to_string(),
                span: start..end,
            });
        }
        offset = end;
    }

    references
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_variable() {
        let refs = parse_variables("${name}");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "name");
        assert_eq!(refs[0].span, 0..7);
    }

    #[test]
    fn test_parse_multiple_variables() {
        let refs = parse_variables("${base_url}/api/${version}/users/${id}");
        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["base_url", "version", "id"]);
    }

    #[test]
    fn test_adjacent_variables() {
        let refs = parse_variables("${a}${b}${c}");
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[2].span, 8..12);
    }

    #[test]
    fn test_not_placeholders() {
        assert!(parse_variables("Hello, World!").is_empty());
        assert!(parse_variables("{name}").is_empty());
        assert!(parse_variables("$name").is_empty());
        assert!(parse_variables("${}").is_empty());
        assert!(parse_variables("${   }").is_empty());
    }

    #[test]
    fn test_unclosed_variable() {
        let refs = parse_variables("${ok} then ${broken");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "ok");
    }

    #[test]
    fn test_variable_in_json() {
        let refs = parse_variables(r#"{"name": "${user_name}", "id": ${user_id}}"#);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].name, "user_id");
    }

    #[test]
    fn test_span_positions() {
        let input = "Hello ${name}, welcome!";
        let refs = parse_variables(input);
        assert_eq!(&input[refs[0].span.clone()], "${name}");
    }
}
