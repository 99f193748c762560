//! Application use cases (business logic orchestration).

mod execute_request;
mod run_requests;

pub use execute_request::{ExecuteResult, RequestError, RequestExecutor};
pub use run_requests::{RunOptions, TestOrchestrator};
