//! Execute Request Use Case
//!
//! Turns one substituted request into a response: URL validation, the
//! liveness probe, body construction and dispatch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use courier_domain::{RequestBody, RequestErrorKind, RequestSpec, ResponseSpec};
use thiserror::Error;
use url::Url;

use crate::multipart::{MultipartError, MultipartPart, PartKind, parse_multipart};
use crate::ports::{
    FileSystem, FileSystemError, HttpClient, PartContent, PreparedBody, PreparedPart,
    PreparedRequest, ProbeOutcome, REQUEST_TIMEOUT, TransportOutcome,
};

/// Result type for request execution.
pub type ExecuteResult = Result<ResponseSpec, RequestError>;

/// A request that did not produce a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// The URL is not an absolute http(s) URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// URL after substitution.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The liveness probe timed out.
    #[error("server unreachable: {0}")]
    ServerUnreachable(String),

    /// No response within the request timeout.
    #[error("request timed out after {}s", REQUEST_TIMEOUT.as_secs())]
    Timeout,

    /// Connection-level failure.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// A multipart file part names a missing file.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The body could not be built.
    #[error("invalid body: {0}")]
    InvalidBody(String),
}

impl RequestError {
    /// Classification used in reports.
    #[must_use]
    pub const fn kind(&self) -> RequestErrorKind {
        match self {
            Self::InvalidUrl { .. } => RequestErrorKind::InvalidUrl,
            Self::ServerUnreachable(_) => RequestErrorKind::ServerUnreachable,
            Self::Timeout => RequestErrorKind::Timeout,
            Self::NetworkFailure(_) => RequestErrorKind::NetworkFailure,
            Self::FileNotFound(_) => RequestErrorKind::FileNotFound,
            Self::InvalidBody(_) => RequestErrorKind::InvalidBody,
        }
    }
}

impl From<MultipartError> for RequestError {
    fn from(err: MultipartError) -> Self {
        Self::InvalidBody(err.to_string())
    }
}

/// Use case for executing HTTP requests.
///
/// File parts of multipart bodies are resolved against `base_dir` and read
/// through the `FileSystem` port.
pub struct RequestExecutor<C: HttpClient, F: FileSystem> {
    client: Arc<C>,
    fs: Arc<F>,
    base_dir: PathBuf,
}

impl<C: HttpClient, F: FileSystem> RequestExecutor<C, F> {
    /// Creates a new executor.
    pub fn new(client: Arc<C>, fs: Arc<F>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            fs,
            base_dir: base_dir.into(),
        }
    }

    /// Executes an already substituted request.
    ///
    /// Error statuses are not failures: a 4xx/5xx response is returned as
    /// `Ok` so assertions can inspect it.
    ///
    /// # Errors
    ///
    /// Returns `RequestError` when the URL is invalid, the probe times out,
    /// the body cannot be built, or the transport fails or times out.
    pub async fn execute(&self, request: &RequestSpec) -> ExecuteResult {
        let url = validate_url(&request.url)?;

        match self.client.probe(&url).await {
            ProbeOutcome::Reachable => tracing::debug!(%url, "probe succeeded"),
            ProbeOutcome::TimedOut => {
                tracing::debug!(%url, "probe timed out");
                return Err(RequestError::ServerUnreachable(
                    url.host_str().unwrap_or(url.as_str()).to_string(),
                ));
            }
            ProbeOutcome::Failed(reason) => {
                tracing::debug!(%url, %reason, "probe failed, continuing");
            }
        }

        let prepared = self.prepare(request, url).await?;
        tracing::debug!(method = %prepared.method, url = %prepared.url, "dispatching request");

        match self.client.send(prepared).await {
            TransportOutcome::Success(response) | TransportOutcome::HttpErrorWithBody(response) => {
                Ok(response)
            }
            TransportOutcome::Timeout => Err(RequestError::Timeout),
            TransportOutcome::NetworkFailure(message) => Err(RequestError::NetworkFailure(message)),
        }
    }

    /// Builds the wire body according to the effective `Content-Type`.
    async fn prepare(&self, request: &RequestSpec, url: Url) -> Result<PreparedRequest, RequestError> {
        let mut headers = request.headers.clone();
        let content_type = headers.content_type().map(str::to_ascii_lowercase);

        let body = match (&request.body, content_type.as_deref()) {
            (RequestBody::None, _) => PreparedBody::None,
            (RequestBody::Text(text), Some(ct)) if ct.starts_with("multipart/form-data") => {
                let parts = parse_multipart(text, headers.content_type())?;
                let prepared = self.prepare_parts(parts).await?;
                headers.remove("content-type");
                PreparedBody::Multipart(prepared)
            }
            (RequestBody::Json(_), Some(ct)) if ct.starts_with("multipart/form-data") => {
                return Err(RequestError::InvalidBody(
                    "multipart requests need a textual body".to_string(),
                ));
            }
            (RequestBody::Text(text), _) => PreparedBody::Text(text.clone()),
            (RequestBody::Json(json), _) => PreparedBody::Text(json.to_string()),
        };

        Ok(PreparedRequest {
            method: request.method,
            url,
            headers,
            body,
        })
    }

    async fn prepare_parts(
        &self,
        parts: Vec<MultipartPart>,
    ) -> Result<Vec<PreparedPart>, RequestError> {
        let mut prepared = Vec::with_capacity(parts.len());
        for part in parts {
            let content = match part.kind {
                PartKind::Text(text) => PartContent::Text(text),
                PartKind::File { file_name, path } => {
                    let resolved = resolve_path(&self.base_dir, &path);
                    let bytes = self.fs.read_file(&resolved).await.map_err(|e| match e {
                        FileSystemError::NotFound(p) => RequestError::FileNotFound(p),
                        other => RequestError::InvalidBody(other.to_string()),
                    })?;
                    PartContent::File { file_name, bytes }
                }
            };
            prepared.push(PreparedPart {
                name: part.name,
                content_type: part.content_type,
                content,
            });
        }
        Ok(prepared)
    }
}

/// Parses `raw` and requires an absolute http(s) URL.
fn validate_url(raw: &str) -> Result<Url, RequestError> {
    let invalid = |reason: String| RequestError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.has_host() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Relative paths are taken from `base_dir`; absolute ones are kept.
fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
