//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It probes hosts, dispatches prepared requests, and classifies every
//! outcome exactly once into a `TransportOutcome`.

use std::collections::HashMap;
use std::time::Instant;

use courier_application::ApplicationError;
use courier_application::ports::{
    HttpClient, PROBE_TIMEOUT, PreparedRequest, ProbeOutcome, REQUEST_TIMEOUT, TransportOutcome,
};
use courier_domain::{HttpMethod, ResponseSpec, TlsConfig};
use reqwest::{Client, Method, Url};

use crate::http::build_body;

/// HTTP client implementation using reqwest.
///
/// Scripts routinely target development servers with self-signed
/// certificates, so the default policy is [`TlsConfig::insecure`].
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a client with the given TLS policy.
    ///
    /// Every relaxed setting is logged once as a warning.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::HttpClient` if the client cannot be created.
    pub fn new(tls: &TlsConfig) -> Result<Self, ApplicationError> {
        for warning in tls.security_warnings() {
            tracing::warn!("{}", warning.message());
        }

        let client = Client::builder()
            .user_agent(concat!("Courier/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(tls.accept_invalid_certs || tls.accept_invalid_hostnames)
            .build()
            .map_err(|e| ApplicationError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates a client with the relaxed default TLS policy.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::HttpClient` if the client cannot be created.
    pub fn insecure() -> Result<Self, ApplicationError> {
        Self::new(&TlsConfig::insecure())
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
            HttpMethod::Trace => Method::TRACE,
        }
    }

    /// Classifies a reqwest failure.
    fn map_error(error: &reqwest::Error) -> TransportOutcome {
        if error.is_timeout() {
            TransportOutcome::Timeout
        } else {
            TransportOutcome::NetworkFailure(error.to_string())
        }
    }

    async fn dispatch(&self, request: PreparedRequest) -> TransportOutcome {
        let PreparedRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let body = match build_body(body) {
            Ok(body) => body,
            Err(e) => return TransportOutcome::NetworkFailure(e.to_string()),
        };

        let mut builder = self.client.request(Self::to_reqwest_method(method), url);
        for header in headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }
        builder = body.apply(builder);

        let start = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Self::map_error(&e),
        };

        let status = response.status().as_u16();
        let response_headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body_bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Self::map_error(&e),
        };
        let duration = start.elapsed();

        let spec = ResponseSpec::new(status, response_headers, &body_bytes, duration);
        if status >= 400 {
            TransportOutcome::HttpErrorWithBody(spec)
        } else {
            TransportOutcome::Success(spec)
        }
    }
}

impl HttpClient for ReqwestHttpClient {
    async fn probe(&self, url: &Url) -> ProbeOutcome {
        let result = self
            .client
            .head(url.clone())
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) => {
                tracing::debug!(url = %url, status = response.status().as_u16(), "probe answered");
                ProbeOutcome::Reachable
            }
            Err(e) if e.is_timeout() => ProbeOutcome::TimedOut,
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }

    async fn send(&self, request: PreparedRequest) -> TransportOutcome {
        self.dispatch(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use courier_application::ports::PreparedBody;
    use courier_domain::Headers;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Trace),
            Method::TRACE
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_client_creation() {
        assert!(ReqwestHttpClient::insecure().is_ok());
        assert!(ReqwestHttpClient::new(&TlsConfig::new()).is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_failure() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = ReqwestHttpClient::insecure().unwrap();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/ping")).unwrap();

        assert!(matches!(client.probe(&url).await, ProbeOutcome::Failed(_)));

        let outcome = client
            .send(PreparedRequest {
                method: HttpMethod::Get,
                url,
                headers: Headers::new(),
                body: PreparedBody::None,
            })
            .await;
        assert!(matches!(outcome, TransportOutcome::NetworkFailure(_)));
    }
}
