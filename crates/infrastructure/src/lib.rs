//! Courier Infrastructure - Adapters and entry points
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer, the script parser, and the top-level functions a
//! host calls to run a script:
//!
//! - [`parse_script`] turns script text into requests.
//! - [`run_requests`] runs already-parsed requests with a seed mapping.
//! - [`run_script_file`] reads a script and its seed variables from disk
//!   and runs it.

pub mod adapters;
pub mod http;
pub mod persistence;
pub mod scripting;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use courier_application::ports::FileSystem;
use courier_application::{
    ApplicationError, ApplicationResult, RunOptions, TestOrchestrator, VariableStore,
};
use courier_domain::{RequestSpec, TestSummary};
use serde_json::Value;

pub use adapters::ReqwestHttpClient;
pub use http::{BodyBuildError, BuiltBody, build_body};
pub use persistence::{DEFAULT_VARIABLES_FILE, FileVariablesRepository, TokioFileSystem};
pub use scripting::{ParseError, ParseErrorKind, parse_script};

impl From<ParseError> for ApplicationError {
    fn from(error: ParseError) -> Self {
        Self::Parse(error.to_string())
    }
}

/// Where a script run gets its seed variables and upload directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptRunConfig {
    /// Seed file to load instead of `variables.json` next to the script.
    /// Unlike the default file, a named file must exist.
    pub vars_file: Option<PathBuf>,
    /// Bindings applied after the seed file; last writer wins.
    pub overrides: HashMap<String, Value>,
    /// Directory for multipart uploads; defaults to the script's directory.
    pub base_dir: Option<PathBuf>,
}

/// Runs parsed requests against real servers.
///
/// `seed` initialises the variable store for this run only.
///
/// # Errors
///
/// Returns an error only when the run cannot start, e.g. the HTTP client
/// fails to build. Failing requests become failing results.
pub async fn run_requests(
    requests: &[RequestSpec],
    seed: HashMap<String, Value>,
    options: &RunOptions,
) -> ApplicationResult<TestSummary> {
    let client = Arc::new(ReqwestHttpClient::insecure()?);
    let fs = Arc::new(TokioFileSystem::new());

    let mut store = VariableStore::new();
    store.set_variables(seed);

    let orchestrator = TestOrchestrator::new(client, fs);
    Ok(orchestrator.run(requests, &mut store, options).await)
}

/// Reads and runs a script, seeding variables from `variables.json` next to
/// it (if present) and then from `overrides`.
///
/// # Errors
///
/// Returns an error if the script cannot be read or parsed, the seed file is
/// invalid, or the HTTP client cannot be built.
pub async fn run_script_file(
    path: &Path,
    overrides: HashMap<String, Value>,
) -> ApplicationResult<TestSummary> {
    let config = ScriptRunConfig {
        overrides,
        ..ScriptRunConfig::default()
    };
    run_script_file_with(path, config).await
}

/// [`run_script_file`] with an explicit seed file and upload directory.
///
/// # Errors
///
/// Same as [`run_script_file`]; additionally a named `vars_file` must exist.
pub async fn run_script_file_with(
    path: &Path,
    config: ScriptRunConfig,
) -> ApplicationResult<TestSummary> {
    let fs = TokioFileSystem::new();
    let script = fs
        .read_file_string(path)
        .await
        .map_err(|source| ApplicationError::ScriptUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
    let requests = parse_script(&script)?;

    let script_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let repository = FileVariablesRepository::new(fs);
    let mut seed = match &config.vars_file {
        Some(vars_file) => repository.load(vars_file).await?,
        None => {
            repository
                .load_optional(&FileVariablesRepository::<TokioFileSystem>::default_path(
                    &script_dir,
                ))
                .await?
        }
    };
    seed.extend(config.overrides);

    tracing::debug!(
        script = %path.display(),
        requests = requests.len(),
        variables = seed.len(),
        "script loaded"
    );

    let options = RunOptions::new(config.base_dir.unwrap_or(script_dir));
    run_requests(&requests, seed, &options).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_script_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let err = run_script_file(&dir.path().join("none.http"), HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ScriptUnreadable { .. }));
    }

    #[tokio::test]
    async fn test_parse_error_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.http");
        std::fs::write(&path, "NOPE http://a.test\n").unwrap();

        let err = run_script_file(&path, HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Parse(msg) if msg.contains("malformed request line")));
    }

    #[tokio::test]
    async fn test_invalid_seed_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ok.http");
        std::fs::write(&path, "GET http://127.0.0.1:9/\n").unwrap();
        std::fs::write(dir.path().join(DEFAULT_VARIABLES_FILE), "\"just a string\"").unwrap();

        let err = run_script_file(&path, HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidVariables { .. }));
    }

    #[tokio::test]
    async fn test_empty_script_gives_empty_summary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.http");
        std::fs::write(&path, "# nothing to run\n").unwrap();

        let summary = run_script_file(&path, HashMap::new()).await.unwrap();
        assert_eq!(summary.total_tests, 0);
        assert!(summary.results.is_empty());
    }
}
