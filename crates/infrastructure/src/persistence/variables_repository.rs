//! Seed variables stored as a JSON object on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use courier_application::ApplicationError;
use courier_application::ports::{FileSystem, FileSystemError};
use serde_json::Value;

/// File name looked up next to a script when no seed file is named.
pub const DEFAULT_VARIABLES_FILE: &str = "variables.json";

/// Loads seed variables through a [`FileSystem`].
#[derive(Debug, Clone)]
pub struct FileVariablesRepository<F> {
    fs: F,
}

impl<F: FileSystem> FileVariablesRepository<F> {
    /// Creates a repository reading through `fs`.
    #[must_use]
    pub const fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Path of the default seed file for a script directory.
    #[must_use]
    pub fn default_path(script_dir: &Path) -> PathBuf {
        script_dir.join(DEFAULT_VARIABLES_FILE)
    }

    /// Loads `path`, returning an empty map when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidVariables` if the file cannot be
    /// read or does not hold a JSON object.
    pub async fn load_optional(&self, path: &Path) -> Result<HashMap<String, Value>, ApplicationError> {
        match self.fs.read_file_string(path).await {
            Ok(content) => parse_seed(path, &content),
            Err(FileSystemError::NotFound(_)) => {
                tracing::debug!(path = %path.display(), "no seed variables file");
                Ok(HashMap::new())
            }
            Err(e) => Err(invalid(path, e.to_string())),
        }
    }

    /// Loads `path`, which must exist.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidVariables` if the file is missing,
    /// unreadable, or not a JSON object.
    pub async fn load(&self, path: &Path) -> Result<HashMap<String, Value>, ApplicationError> {
        let content = self
            .fs
            .read_file_string(path)
            .await
            .map_err(|e| invalid(path, e.to_string()))?;
        parse_seed(path, &content)
    }
}

fn invalid(path: &Path, reason: String) -> ApplicationError {
    ApplicationError::InvalidVariables {
        path: path.to_path_buf(),
        reason,
    }
}

fn parse_seed(path: &Path, content: &str) -> Result<HashMap<String, Value>, ApplicationError> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(other) => Err(invalid(
            path,
            format!("expected a JSON object, found {}", json_kind(&other)),
        )),
        Err(e) => Err(invalid(path, e.to_string())),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
