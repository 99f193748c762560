//! Courier Domain - Core types
//!
//! This crate defines the data model for the Courier request runner:
//! requests as parsed from a script, responses, assertions and results.
//! All types here are pure Rust with no I/O dependencies.

pub mod capture;
pub mod error;
pub mod request;
pub mod response;
pub mod testing;
pub mod tls;

pub use capture::VariableCapture;
pub use error::{DomainError, DomainResult, RequestErrorKind};
pub use request::{Header, Headers, HttpMethod, RequestBody, RequestSpec};
pub use response::{PathError, ResponseData, ResponseSpec, query_path};
pub use testing::{
    Assertion, AssertionResult, ComparisonOperator, StatusExpectation, TestBlock, TestResult,
    TestSummary,
};
pub use tls::{TlsConfig, TlsSecurityWarning};
