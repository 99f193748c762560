//! Run Requests Use Case
//!
//! Executes parsed requests one after another, evaluating their tests and
//! applying their captures, and aggregates the results.

use std::path::PathBuf;
use std::sync::Arc;

use courier_domain::{RequestSpec, ResponseSpec, TestResult, TestSummary};

use super::execute_request::RequestExecutor;
use crate::ports::{FileSystem, HttpClient};
use crate::testing::TestRunner;
use crate::variables::VariableStore;

/// Host-provided settings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Directory that multipart file paths are resolved against.
    pub base_dir: PathBuf,
}

impl RunOptions {
    /// Options resolving uploads against `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

/// Drives the request pipeline.
///
/// Requests run strictly in order: captures from request *n* are bound
/// before request *n + 1* is substituted. A failing request never stops the
/// run; it contributes a failing result instead.
pub struct TestOrchestrator<C: HttpClient, F: FileSystem> {
    client: Arc<C>,
    fs: Arc<F>,
    runner: TestRunner,
}

impl<C: HttpClient, F: FileSystem> TestOrchestrator<C, F> {
    /// Creates an orchestrator over the given ports.
    pub const fn new(client: Arc<C>, fs: Arc<F>) -> Self {
        Self {
            client,
            fs,
            runner: TestRunner::new(),
        }
    }

    /// Runs `requests` in order and returns the summary.
    pub async fn run(
        &self,
        requests: &[RequestSpec],
        store: &mut VariableStore,
        options: &RunOptions,
    ) -> TestSummary {
        tracing::info!(
            requests = requests.len(),
            variables = store.len(),
            "run started"
        );

        let executor = RequestExecutor::new(
            Arc::clone(&self.client),
            Arc::clone(&self.fs),
            options.base_dir.clone(),
        );
        let mut results = Vec::with_capacity(requests.len());

        for (index, request) in requests.iter().enumerate() {
            tracing::info!(
                index = index + 1,
                name = %request.name,
                method = %request.method,
                "running request"
            );

            let substituted = store.substitute_request(request);
            match executor.execute(&substituted).await {
                Ok(response) => {
                    results.extend(self.evaluate(request, &response));
                    apply_captures(request, &response, store);
                }
                Err(err) => {
                    tracing::info!(name = %request.name, error = %err, "request failed");
                    results.push(TestResult::request_failed(
                        request.name.as_str(),
                        err.kind(),
                        err.to_string(),
                    ));
                }
            }
        }

        let summary = TestSummary::from_results(results);
        tracing::info!(
            total = summary.total_tests,
            passed = summary.passed_tests,
            failed = summary.failed_tests,
            "run finished"
        );
        summary
    }

    /// One result per test block, or a single 2xx check when none are declared.
    fn evaluate(&self, request: &RequestSpec, response: &ResponseSpec) -> Vec<TestResult> {
        if request.tests.is_empty() {
            return vec![TestResult::from_status(request.name.as_str(), response.status)];
        }

        request
            .tests
            .iter()
            .map(|test| {
                TestResult::from_assertions(
                    request.name.as_str(),
                    test.name.as_str(),
                    response.status,
                    self.runner.run(test, response),
                )
            })
            .collect()
    }
}

fn apply_captures(request: &RequestSpec, response: &ResponseSpec, store: &mut VariableStore) {
    for capture in &request.captures {
        match store.capture(&capture.key, &capture.expression, response) {
            Ok(value) => tracing::debug!(key = %capture.key, %value, "captured variable"),
            Err(miss) => tracing::warn!(request = %request.name, "{miss}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::{FileSystemError, PreparedRequest, ProbeOutcome, TransportOutcome};
    use courier_domain::{
        Assertion, HttpMethod, RequestBody, RequestErrorKind, StatusExpectation, TestBlock,
        VariableCapture,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::{HashMap, VecDeque};
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;
    use url::Url;

    /// Replays scripted outcomes in order and records every dispatched URL.
    #[derive(Default)]
    struct ScriptedClient {
        outcomes: Mutex<VecDeque<TransportOutcome>>,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(outcomes: impl IntoIterator<Item = TransportOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    impl HttpClient for ScriptedClient {
        async fn probe(&self, _url: &Url) -> ProbeOutcome {
            ProbeOutcome::Reachable
        }

        async fn send(&self, request: PreparedRequest) -> TransportOutcome {
            self.urls.lock().unwrap().push(request.url.to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request")
        }
    }

    struct NoFiles;

    impl FileSystem for NoFiles {
        async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileSystemError> {
            Err(FileSystemError::NotFound(path.to_path_buf()))
        }

        async fn read_file_string(&self, path: &Path) -> Result<String, FileSystemError> {
            Err(FileSystemError::NotFound(path.to_path_buf()))
        }
    }

    fn ok(status: u16, body: &str) -> TransportOutcome {
        let response = ResponseSpec::new(status, HashMap::new(), body.as_bytes(), Duration::from_millis(3));
        if response.is_success() {
            TransportOutcome::Success(response)
        } else {
            TransportOutcome::HttpErrorWithBody(response)
        }
    }

    fn status_test(name: &str, code: u16) -> TestBlock {
        TestBlock::new(name).with_assertion(Assertion::StatusCode {
            expected: StatusExpectation::exact(code),
        })
    }

    async fn run(
        client: ScriptedClient,
        requests: &[RequestSpec],
        store: &mut VariableStore,
    ) -> (TestSummary, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        let orchestrator = TestOrchestrator::new(Arc::clone(&client), Arc::new(NoFiles));
        let summary = orchestrator
            .run(requests, store, &RunOptions::new("/tmp"))
            .await;
        (summary, client)
    }

    #[tokio::test]
    async fn test_ping_end_to_end() {
        let requests = [RequestSpec::get("ping", "https://example.test/ping")
            .with_test(status_test("status is 200", 200))];
        let mut store = VariableStore::new();

        let (summary, _) = run(ScriptedClient::new([ok(200, r#"{"ok":true}"#)]), &requests, &mut store).await;

        assert_eq!(summary.total_tests, 1);
        assert_eq!(summary.passed_tests, 1);
        assert_eq!(summary.failed_tests, 0);
        assert_eq!(summary.results[0].status_code, Some(200));
    }

    #[tokio::test]
    async fn test_capture_then_use() {
        let requests = [
            RequestSpec::new("login", HttpMethod::Post, "http://api.test/login")
                .with_body(RequestBody::text("{}"))
                .with_capture(VariableCapture::new("token", "access_token")),
            RequestSpec::get("profile", "http://api.test/me?token=${token}"),
        ];
        let mut store = VariableStore::new();

        let (summary, client) = run(
            ScriptedClient::new([ok(200, r#"{"access_token":"s3cret"}"#), ok(200, "{}")]),
            &requests,
            &mut store,
        )
        .await;

        assert_eq!(summary.passed_tests, 2);
        assert_eq!(client.urls()[1], "http://api.test/me?token=s3cret");
        assert_eq!(store.get("token"), Some(&json!("s3cret")));
    }

    #[tokio::test]
    async fn test_capture_not_visible_to_its_own_request() {
        let requests = [RequestSpec::get("self", "http://api.test/${id}")
            .with_capture(VariableCapture::new("id", "id"))];
        let mut store = VariableStore::new();

        let (_, client) = run(ScriptedClient::new([ok(200, r#"{"id": 5}"#)]), &requests, &mut store).await;

        assert_eq!(client.urls()[0], "http://api.test/$%7Bid%7D");
        assert_eq!(store.get("id"), Some(&json!(5)));
    }

    #[tokio::test]
    async fn test_fail_soft_on_timeout() {
        let requests = [
            RequestSpec::get("one", "http://api.test/1"),
            RequestSpec::get("two", "http://api.test/2")
                .with_capture(VariableCapture::new("never", "x")),
            RequestSpec::get("three", "http://api.test/3"),
        ];
        let mut store = VariableStore::new();

        let (summary, _) = run(
            ScriptedClient::new([ok(200, "{}"), TransportOutcome::Timeout, ok(204, "")]),
            &requests,
            &mut store,
        )
        .await;

        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.passed_tests, 2);
        assert_eq!(summary.failed_tests, 1);

        let names: Vec<_> = summary.results.iter().map(|r| r.request.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);

        let failed = &summary.results[1];
        assert!(!failed.passed);
        assert_eq!(failed.status_code, None);
        assert_eq!(failed.error_kind, Some(RequestErrorKind::Timeout));
        assert!(failed.error.is_some());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_one_result_per_test_block_in_order() {
        let requests = [
            RequestSpec::get("multi", "http://api.test/items")
                .with_test(status_test("is ok", 200))
                .with_test(TestBlock::new("has items").with_assertion(Assertion::JsonPath {
                    path: "items[0]".to_string(),
                    expected: None,
                }))
                .with_test(status_test("is created", 201)),
            RequestSpec::get("plain", "http://api.test/missing"),
        ];
        let mut store = VariableStore::new();

        let (summary, _) = run(
            ScriptedClient::new([ok(200, r#"{"items": [1]}"#), ok(404, "not found")]),
            &requests,
            &mut store,
        )
        .await;

        let outcome: Vec<_> = summary
            .results
            .iter()
            .map(|r| (r.name.as_str(), r.passed))
            .collect();
        assert_eq!(
            outcome,
            vec![
                ("is ok", true),
                ("has items", true),
                ("is created", false),
                ("plain", false),
            ]
        );
        assert_eq!(summary.total_tests, summary.passed_tests + summary.failed_tests);
        assert_eq!(summary.results[3].status_code, Some(404));
    }

    #[tokio::test]
    async fn test_error_status_still_evaluated() {
        let requests = [RequestSpec::get("gone", "http://api.test/gone")
            .with_test(status_test("is 404", 404))
            .with_capture(VariableCapture::new("reason", "error"))];
        let mut store = VariableStore::new();

        let (summary, _) = run(
            ScriptedClient::new([ok(404, r#"{"error": "gone"}"#)]),
            &requests,
            &mut store,
        )
        .await;

        assert!(summary.all_passed());
        assert_eq!(store.get("reason"), Some(&json!("gone")));
    }

    #[tokio::test]
    async fn test_invalid_url_after_substitution() {
        let requests = [RequestSpec::get("unresolved", "${base}/users")];
        let mut store = VariableStore::new();

        let (summary, client) = run(ScriptedClient::default(), &requests, &mut store).await;

        assert_eq!(summary.failed_tests, 1);
        assert_eq!(summary.results[0].error_kind, Some(RequestErrorKind::InvalidUrl));
        assert!(summary.results[0].error.as_deref().unwrap().contains("${base}/users"));
        assert!(client.urls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_run() {
        let mut store = VariableStore::new();
        let (summary, _) = run(ScriptedClient::default(), &[], &mut store).await;
        assert_eq!(summary, TestSummary::from_results(Vec::new()));
    }
}
