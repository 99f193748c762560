//! Port definitions (interfaces for infrastructure adapters)

mod file_system;
mod http_client;

pub use file_system::{FileSystem, FileSystemError};
pub use http_client::{
    HttpClient, PROBE_TIMEOUT, PartContent, PreparedBody, PreparedPart, PreparedRequest,
    ProbeOutcome, REQUEST_TIMEOUT, TransportOutcome,
};
