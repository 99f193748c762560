//! HTTP Client port

use std::future::Future;
use std::time::Duration;

use courier_domain::{Headers, HttpMethod, ResponseSpec};
use url::Url;

/// Timeout of the `HEAD` liveness probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Total timeout of the main request, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A request ready for the wire: URL validated, body built.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute http(s) URL.
    pub url: Url,
    /// Headers to send. For multipart bodies the original `Content-Type`
    /// has already been removed.
    pub headers: Headers,
    /// Body to send.
    pub body: PreparedBody,
}

/// Body of a [`PreparedRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreparedBody {
    /// No body.
    #[default]
    None,
    /// Bytes sent verbatim.
    Text(String),
    /// A form the transport encodes with its own boundary.
    Multipart(Vec<PreparedPart>),
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPart {
    /// Field name from `Content-Disposition`.
    pub name: String,
    /// Explicit part `Content-Type`, if declared.
    pub content_type: Option<String>,
    /// Field payload.
    pub content: PartContent,
}

/// Payload of a multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    /// Literal text value.
    Text(String),
    /// File contents read from disk.
    File {
        /// File name announced to the server.
        file_name: String,
        /// File contents.
        bytes: Vec<u8>,
    },
}

/// Result of one dispatch, classified once by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome {
    /// A 2xx (or other non-error) response.
    Success(ResponseSpec),
    /// No complete response within [`REQUEST_TIMEOUT`].
    Timeout,
    /// Connection-level failure with the transport's message.
    NetworkFailure(String),
    /// The server answered with an error status; the body is still available.
    HttpErrorWithBody(ResponseSpec),
}

/// Result of the best-effort liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered, whatever the status.
    Reachable,
    /// No answer within [`PROBE_TIMEOUT`].
    TimedOut,
    /// Any other failure. Not authoritative: the request still proceeds.
    Failed(String),
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
pub trait HttpClient: Send + Sync {
    /// Issues a `HEAD` request to `url` under [`PROBE_TIMEOUT`].
    fn probe(&self, url: &Url) -> impl Future<Output = ProbeOutcome> + Send;

    /// Sends the request under [`REQUEST_TIMEOUT`] and classifies the result.
    fn send(&self, request: PreparedRequest) -> impl Future<Output = TransportOutcome> + Send;
}
