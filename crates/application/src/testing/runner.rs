//! Test runner implementation.
//!
//! Evaluates the assertions of a test block against a response.

use courier_domain::{
    Assertion, AssertionResult, ComparisonOperator, ResponseData, ResponseSpec, StatusExpectation,
    TestBlock,
};
use regex::Regex;
use serde_json::Value;

/// Longest body excerpt shown in a failure.
const PREVIEW_LEN: usize = 100;

/// Evaluates assertions against responses.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestRunner;

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates every assertion of `test`, in order.
    #[must_use]
    pub fn run(&self, test: &TestBlock, response: &ResponseSpec) -> Vec<AssertionResult> {
        test.assertions
            .iter()
            .map(|assertion| self.run_assertion(assertion, response))
            .collect()
    }

    /// Run a single assertion against a response.
    #[must_use]
    pub fn run_assertion(&self, assertion: &Assertion, response: &ResponseSpec) -> AssertionResult {
        let outcome = match assertion {
            Assertion::StatusCode { expected } => check_status_code(response, expected),
            Assertion::ResponseTime { max_ms } => check_response_time(response, *max_ms),
            Assertion::HeaderExists { name, value } => {
                check_header_exists(response, name, value.as_deref())
            }
            Assertion::HeaderMatches { name, pattern } => {
                check_header_matches(response, name, pattern)
            }
            Assertion::BodyContains { text, ignore_case } => {
                check_body_contains(response, text, *ignore_case)
            }
            Assertion::BodyMatches { pattern } => check_body_matches(response, pattern),
            Assertion::BodyEquals { expected } => check_body_equals(response, expected),
            Assertion::JsonPath { path, expected } => {
                check_json_path(response, path, expected.as_ref())
            }
            Assertion::JsonPathMatches {
                path,
                operator,
                value,
            } => check_json_path_matches(response, path, *operator, value),
            Assertion::IsJson => check_is_json(response),
            Assertion::ContentType { expected } => check_content_type(response, expected),
        };

        match outcome {
            Check::Pass(None) => AssertionResult::pass(assertion.clone()),
            Check::Pass(Some(actual)) => AssertionResult::pass_with_value(assertion.clone(), actual),
            Check::Fail(None, error) => AssertionResult::fail(assertion.clone(), error),
            Check::Fail(Some(actual), error) => {
                AssertionResult::fail_with_value(assertion.clone(), actual, error)
            }
        }
    }
}

/// Outcome of one check: the actual value seen, plus an error when failing.
enum Check {
    Pass(Option<String>),
    Fail(Option<String>, String),
}

fn check_status_code(response: &ResponseSpec, expected: &StatusExpectation) -> Check {
    let actual = response.status;
    if expected.matches(actual) {
        Check::Pass(Some(actual.to_string()))
    } else {
        Check::Fail(
            Some(actual.to_string()),
            format!("Expected status {}, got {actual}", expected.description()),
        )
    }
}

fn check_response_time(response: &ResponseSpec, max_ms: u64) -> Check {
    let actual_ms = response.duration_ms();
    let actual = format!("{actual_ms}ms");
    if actual_ms <= max_ms {
        Check::Pass(Some(actual))
    } else {
        Check::Fail(
            Some(actual),
            format!("Response took {actual_ms}ms, expected <= {max_ms}ms"),
        )
    }
}

fn check_header_exists(response: &ResponseSpec, name: &str, expected: Option<&str>) -> Check {
    let Some(actual) = response.get_header(name) else {
        return Check::Fail(None, format!("Header '{name}' not found"));
    };
    match expected {
        Some(expected) if actual != expected => Check::Fail(
            Some(actual.to_string()),
            format!("Header '{name}' value mismatch: expected '{expected}', got '{actual}'"),
        ),
        _ => Check::Pass(Some(actual.to_string())),
    }
}

fn check_header_matches(response: &ResponseSpec, name: &str, pattern: &str) -> Check {
    let Some(actual) = response.get_header(name) else {
        return Check::Fail(None, format!("Header '{name}' not found"));
    };
    match Regex::new(pattern) {
        Ok(regex) if regex.is_match(actual) => Check::Pass(Some(actual.to_string())),
        Ok(_) => Check::Fail(
            Some(actual.to_string()),
            format!("Header '{name}' value '{actual}' does not match pattern '{pattern}'"),
        ),
        Err(e) => Check::Fail(None, format!("Invalid regex pattern '{pattern}': {e}")),
    }
}

fn check_body_contains(response: &ResponseSpec, text: &str, ignore_case: bool) -> Check {
    let body = &response.body;
    let contains = if ignore_case {
        body.to_lowercase().contains(&text.to_lowercase())
    } else {
        body.contains(text)
    };

    if contains {
        Check::Pass(None)
    } else {
        Check::Fail(Some(preview(body)), format!("Body does not contain '{text}'"))
    }
}

fn check_body_matches(response: &ResponseSpec, pattern: &str) -> Check {
    match Regex::new(pattern) {
        Ok(regex) if regex.is_match(&response.body) => Check::Pass(None),
        Ok(_) => Check::Fail(
            Some(preview(&response.body)),
            format!("Body does not match pattern '{pattern}'"),
        ),
        Err(e) => Check::Fail(None, format!("Invalid regex pattern '{pattern}': {e}")),
    }
}

fn check_body_equals(response: &ResponseSpec, expected: &str) -> Check {
    if response.body.trim_end() == expected.trim_end() {
        Check::Pass(None)
    } else {
        Check::Fail(
            Some(preview(&response.body)),
            "Body does not match expected value".to_string(),
        )
    }
}

/// Looks up `path` in a JSON body, turning every miss into a failure message.
fn lookup(response: &ResponseSpec, path: &str) -> Result<Value, String> {
    if !response.data.is_json() {
        return Err("Body is not valid JSON".to_string());
    }
    match response.query(path) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(format!("JSON path '{path}' not found")),
        Err(e) => Err(format!("Invalid JSON path '{path}': {e}")),
    }
}

fn check_json_path(response: &ResponseSpec, path: &str, expected: Option<&Value>) -> Check {
    let value = match lookup(response, path) {
        Ok(value) => value,
        Err(error) => return Check::Fail(None, error),
    };
    match expected {
        Some(expected) if !json_equals(&value, expected) => Check::Fail(
            Some(value.to_string()),
            format!("JSON path '{path}' value mismatch: expected {expected}, got {value}"),
        ),
        _ => Check::Pass(Some(value.to_string())),
    }
}

fn check_json_path_matches(
    response: &ResponseSpec,
    path: &str,
    operator: ComparisonOperator,
    expected: &Value,
) -> Check {
    let value = match lookup(response, path) {
        Ok(value) => value,
        Err(error) => return Check::Fail(None, error),
    };
    if compare_json_values(&value, operator, expected) {
        Check::Pass(Some(value.to_string()))
    } else {
        Check::Fail(
            Some(value.to_string()),
            format!(
                "JSON path '{path}' comparison failed: {value} {} {expected}",
                operator.symbol()
            ),
        )
    }
}

fn check_is_json(response: &ResponseSpec) -> Check {
    match &response.data {
        ResponseData::Json(_) => Check::Pass(None),
        ResponseData::Text(_) => Check::Fail(None, "Body is not valid JSON".to_string()),
    }
}

fn check_content_type(response: &ResponseSpec, expected: &str) -> Check {
    match response.content_type() {
        Some(actual) if actual.to_lowercase().contains(&expected.to_lowercase()) => {
            Check::Pass(Some(actual.to_string()))
        }
        Some(actual) => Check::Fail(
            Some(actual.to_string()),
            format!("Content-Type '{actual}' does not contain '{expected}'"),
        ),
        None => Check::Fail(None, "No Content-Type header present".to_string()),
    }
}

/// Equality that treats `1` and `1.0` as equal and compares a string value
/// with a scalar expectation by its text (`"42"` equals `42`).
#[allow(clippy::float_cmp)]
fn json_equals(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::Number(_) | Value::Bool(_)) => *a == expected.to_string(),
        (Value::Number(_) | Value::Bool(_), Value::String(b)) => actual.to_string() == *b,
        _ => false,
    }
}

/// Compare two JSON values using the given operator.
fn compare_json_values(actual: &Value, operator: ComparisonOperator, expected: &Value) -> bool {
    match operator {
        ComparisonOperator::Equals => json_equals(actual, expected),
        ComparisonOperator::NotEquals => !json_equals(actual, expected),
        ComparisonOperator::GreaterThan => compare_numeric(actual, expected, |a, b| a > b),
        ComparisonOperator::GreaterThanOrEqual => compare_numeric(actual, expected, |a, b| a >= b),
        ComparisonOperator::LessThan => compare_numeric(actual, expected, |a, b| a < b),
        ComparisonOperator::LessThanOrEqual => compare_numeric(actual, expected, |a, b| a <= b),
        ComparisonOperator::Contains => match (actual, expected) {
            (Value::String(s), Value::String(needle)) => s.contains(needle.as_str()),
            (Value::Array(items), _) => items.iter().any(|item| json_equals(item, expected)),
            (Value::Object(map), Value::String(key)) => map.contains_key(key),
            _ => false,
        },
        ComparisonOperator::Matches => match (actual, expected) {
            (Value::String(s), Value::String(pattern)) => {
                Regex::new(pattern).is_ok_and(|re| re.is_match(s))
            }
            _ => false,
        },
    }
}

fn compare_numeric(actual: &Value, expected: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(actual), as_number(expected)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

fn preview(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_LEN) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
