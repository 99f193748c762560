//! Request specification type

use serde::{Deserialize, Serialize};

use super::{Header, Headers, HttpMethod, RequestBody};
use crate::capture::VariableCapture;
use crate::testing::TestBlock;

/// One request block of a script, with its tests and capture directives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Human-readable name used in reports
    pub name: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Target URL (may contain `${name}` placeholders)
    pub url: String,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// Request body
    #[serde(default)]
    pub body: RequestBody,
    /// Named test blocks evaluated against the response
    #[serde(default)]
    pub tests: Vec<TestBlock>,
    /// Values to capture from the response, in declared order
    #[serde(default)]
    pub captures: Vec<VariableCapture>,
    /// 1-based script line of the request line, 0 when built in code
    #[serde(default)]
    pub line: usize,
}

impl RequestSpec {
    /// Creates a new request with the given method and URL.
    #[must_use]
    pub fn new(name: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            url: url.into(),
            headers: Headers::new(),
            body: RequestBody::none(),
            tests: Vec::new(),
            captures: Vec::new(),
            line: 0,
        }
    }

    /// Creates a GET request with the given URL.
    #[must_use]
    pub fn get(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Get, url)
    }

    /// Adds a header (builder pattern).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(Header::new(name, value));
        self
    }

    /// Sets the body (builder pattern).
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Adds a test block (builder pattern).
    #[must_use]
    pub fn with_test(mut self, test: TestBlock) -> Self {
        self.tests.push(test);
        self
    }

    /// Adds a capture directive (builder pattern).
    #[must_use]
    pub fn with_capture(mut self, capture: VariableCapture) -> Self {
        self.captures.push(capture);
        self
    }
}
