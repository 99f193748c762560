//! Courier Application - Use cases and ports
//!
//! This crate contains the request pipeline: variable substitution,
//! multipart reconstruction, request execution, assertion evaluation and
//! the sequential run that ties them together. It depends on
//! `courier-domain` and defines the ports that the infrastructure layer
//! implements.

pub mod error;
pub mod multipart;
pub mod ports;
pub mod testing;
pub mod use_cases;
pub mod variables;

pub use error::{ApplicationError, ApplicationResult};
pub use multipart::{MultipartError, MultipartPart, PartKind, parse_multipart};
pub use ports::{
    FileSystem, FileSystemError, HttpClient, PartContent, PreparedBody, PreparedPart,
    PreparedRequest, ProbeOutcome, TransportOutcome,
};
pub use testing::TestRunner;
pub use use_cases::{RequestError, RequestExecutor, RunOptions, TestOrchestrator};
pub use variables::{ExtractionMiss, ResolutionResult, VariableStore};
