//! Response testing and assertions.
//!
//! Test blocks declared in a script, the assertions they hold, and the
//! per-test results and run summary produced by executing them.

use serde::{Deserialize, Serialize};

use crate::error::RequestErrorKind;

/// A test assertion to run against a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assertion {
    /// Check response status code.
    StatusCode {
        /// Expected status code or range.
        expected: StatusExpectation,
    },
    /// Check response time.
    ResponseTime {
        /// Maximum allowed time in milliseconds.
        max_ms: u64,
    },
    /// Check header exists and optionally its value.
    HeaderExists {
        /// Header name (case-insensitive).
        name: String,
        /// Optional expected value.
        value: Option<String>,
    },
    /// Check header value matches pattern.
    HeaderMatches {
        /// Header name.
        name: String,
        /// Regex pattern to match.
        pattern: String,
    },
    /// Check body contains text.
    BodyContains {
        /// Text to search for.
        text: String,
        /// Case-insensitive search.
        #[serde(default)]
        ignore_case: bool,
    },
    /// Check body matches regex pattern.
    BodyMatches {
        /// Regex pattern.
        pattern: String,
    },
    /// Check JSON path exists and optionally its value.
    JsonPath {
        /// JSONPath expression (e.g., "$.data.id").
        path: String,
        /// Expected value (as JSON).
        expected: Option<serde_json::Value>,
    },
    /// Check JSON path value matches condition.
    JsonPathMatches {
        /// JSONPath expression.
        path: String,
        /// Comparison operator.
        operator: ComparisonOperator,
        /// Value to compare against.
        value: serde_json::Value,
    },
    /// Check body equals expected value.
    BodyEquals {
        /// Expected body content.
        expected: String,
    },
    /// Check body is valid JSON.
    IsJson,
    /// Check content type.
    ContentType {
        /// Expected content type (partial match).
        expected: String,
    },
}

impl Assertion {
    /// Get a human-readable description of this assertion.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusCode { expected } => format!("Status code {}", expected.description()),
            Self::ResponseTime { max_ms } => format!("Response time < {max_ms}ms"),
            Self::HeaderExists {
                name,
                value: Some(v),
            } => {
                format!("Header '{name}' equals '{v}'")
            }
            Self::HeaderExists { name, value: None } => format!("Header '{name}' exists"),
            Self::HeaderMatches { name, pattern } => {
                format!("Header '{name}' matches /{pattern}/")
            }
            Self::BodyContains { text, .. } => format!("Body contains '{text}'"),
            Self::BodyMatches { pattern } => format!("Body matches /{pattern}/"),
            Self::JsonPath {
                path,
                expected: Some(v),
            } => {
                format!("JSON {path} equals {v}")
            }
            Self::JsonPath {
                path,
                expected: None,
            } => format!("JSON {path} exists"),
            Self::JsonPathMatches {
                path,
                operator,
                value,
            } => {
                format!("JSON {} {} {}", path, operator.symbol(), value)
            }
            Self::BodyEquals { expected } => format!("Body equals '{expected}'"),
            Self::IsJson => "Body is valid JSON".to_string(),
            Self::ContentType { expected } => format!("Content-Type contains '{expected}'"),
        }
    }
}

/// Expected status code value or range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// Range of status codes (e.g., 200-299).
    Range {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
    /// One of multiple status codes.
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    /// Check if a status code matches this expectation.
    #[must_use]
    pub fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::Range { min, max } => status >= *min && status <= *max,
            Self::OneOf(codes) => codes.contains(&status),
        }
    }

    /// Get description of the expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Exact(code) => format!("= {code}"),
            Self::Range { min, max } => format!("in {min}-{max}"),
            Self::OneOf(codes) => {
                let codes_str: Vec<_> = codes.iter().map(ToString::to_string).collect();
                format!("in [{}]", codes_str.join(", "))
            }
        }
    }

    /// Create a "success" expectation (200-299).
    #[must_use]
    pub const fn success() -> Self {
        Self::Range { min: 200, max: 299 }
    }

    /// Create an exact status expectation.
    #[must_use]
    pub const fn exact(code: u16) -> Self {
        Self::Exact(code)
    }
}

impl Default for StatusExpectation {
    fn default() -> Self {
        Self::success()
    }
}

/// Comparison operators for value assertions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// Equal to.
    Equals,
    /// Not equal to.
    NotEquals,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal to.
    GreaterThanOrEqual,
    /// Less than.
    LessThan,
    /// Less than or equal to.
    LessThanOrEqual,
    /// Contains (for strings/arrays).
    Contains,
    /// Matches regex pattern.
    Matches,
}

impl ComparisonOperator {
    /// Get the symbol for this operator.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Contains => "contains",
            Self::Matches => "matches",
        }
    }
}

/// Result of running a single assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionResult {
    /// The assertion that was run.
    pub assertion: Assertion,
    /// Whether the assertion passed.
    pub passed: bool,
    /// Actual value found (for display).
    pub actual: Option<String>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl AssertionResult {
    /// Create a passed result.
    #[must_use]
    pub fn pass(assertion: Assertion) -> Self {
        Self {
            assertion,
            passed: true,
            actual: None,
            error: None,
        }
    }

    /// Create a passed result with actual value.
    #[must_use]
    pub fn pass_with_value(assertion: Assertion, actual: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: true,
            actual: Some(actual.into()),
            error: None,
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn fail(assertion: Assertion, error: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: false,
            actual: None,
            error: Some(error.into()),
        }
    }

    /// Create a failed result with actual value.
    #[must_use]
    pub fn fail_with_value(
        assertion: Assertion,
        actual: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            assertion,
            passed: false,
            actual: Some(actual.into()),
            error: Some(error.into()),
        }
    }
}

/// A named group of assertions attached to a request.
///
/// The test passes only if every assertion passes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestBlock {
    /// Test name as written after `@test`.
    pub name: String,
    /// Assertions evaluated in order.
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

impl TestBlock {
    /// Creates an empty test block.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assertions: Vec::new(),
        }
    }

    /// Add an assertion (builder pattern).
    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }
}

/// Outcome of one test (or of one request without declared tests).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Name of the request that produced this result.
    pub request: String,
    /// Test name.
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Response status, absent when the request never completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Classification of a request-level failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<RequestErrorKind>,
    /// Individual assertion outcomes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<AssertionResult>,
}

impl TestResult {
    /// Result of a test block evaluated against a response.
    ///
    /// Passes iff every assertion passed; the error lists the failed ones.
    #[must_use]
    pub fn from_assertions(
        request: impl Into<String>,
        name: impl Into<String>,
        status_code: u16,
        assertions: Vec<AssertionResult>,
    ) -> Self {
        let failures: Vec<String> = assertions
            .iter()
            .filter(|r| !r.passed)
            .map(|r| match &r.error {
                Some(error) => format!("{}: {error}", r.assertion.description()),
                None => r.assertion.description(),
            })
            .collect();

        Self {
            request: request.into(),
            name: name.into(),
            passed: failures.is_empty(),
            status_code: Some(status_code),
            error: (!failures.is_empty()).then(|| failures.join("; ")),
            error_kind: None,
            assertions,
        }
    }

    /// Result of a request with no declared tests: passes iff the status is 2xx.
    #[must_use]
    pub fn from_status(request: impl Into<String>, status_code: u16) -> Self {
        let request = request.into();
        let passed = (200..300).contains(&status_code);
        Self {
            name: request.clone(),
            request,
            passed,
            status_code: Some(status_code),
            error: (!passed).then(|| format!("Unexpected status code {status_code}")),
            error_kind: None,
            assertions: Vec::new(),
        }
    }

    /// Result of a request that failed before a response was received.
    #[must_use]
    pub fn request_failed(
        request: impl Into<String>,
        kind: RequestErrorKind,
        message: impl Into<String>,
    ) -> Self {
        let request = request.into();
        Self {
            name: request.clone(),
            request,
            passed: false,
            status_code: None,
            error: Some(message.into()),
            error_kind: Some(kind),
            assertions: Vec::new(),
        }
    }
}

/// Aggregate outcome of a run.
///
/// `total_tests == passed_tests + failed_tests` and `results` keeps the order
/// in which results were produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    /// Number of results.
    pub total_tests: usize,
    /// Number of passing results.
    pub passed_tests: usize,
    /// Number of failing results.
    pub failed_tests: usize,
    /// Individual results in production order.
    pub results: Vec<TestResult>,
}

impl TestSummary {
    /// Builds a summary, computing the counts from the results.
    #[must_use]
    pub fn from_results(results: Vec<TestResult>) -> Self {
        let total_tests = results.len();
        let passed_tests = results.iter().filter(|r| r.passed).count();
        Self {
            total_tests,
            passed_tests,
            failed_tests: total_tests - passed_tests,
            results,
        }
    }

    /// Check if all tests passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed_tests == 0
    }

    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total_tests == 0 {
            100.0
        } else {
            (self.passed_tests as f64 / self.total_tests as f64) * 100.0
        }
    }
}
