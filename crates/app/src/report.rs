//! Summary rendering.

use std::fmt::Write;

use console::style;
use courier_domain::{TestResult, TestSummary};

/// Renders the summary for a terminal.
pub fn render_text(summary: &TestSummary) -> String {
    let mut out = String::new();

    for result in &summary.results {
        render_result(&mut out, result);
    }

    if !summary.results.is_empty() {
        out.push('\n');
    }

    let counts = format!(
        "{} tests, {} passed, {} failed ({:.1}%)",
        summary.total_tests,
        summary.passed_tests,
        summary.failed_tests,
        summary.pass_rate()
    );
    let counts = if summary.all_passed() {
        style(counts).green().bold()
    } else {
        style(counts).red().bold()
    };
    let _ = writeln!(out, "{counts}");

    out
}

fn render_result(out: &mut String, result: &TestResult) {
    let mark = if result.passed {
        style("\u{2714}").green().bold()
    } else {
        style("\u{2718}").red().bold()
    };

    let label = if result.name == result.request {
        result.request.clone()
    } else {
        format!("{} \u{203a} {}", result.request, result.name)
    };
    let status = result
        .status_code
        .map(|code| format!(" [{code}]"))
        .unwrap_or_default();
    let _ = writeln!(out, "{mark} {label}{status}");

    if result.passed {
        return;
    }

    if let Some(kind) = result.error_kind {
        let _ = writeln!(
            out,
            "    {} {}",
            style(kind.title()).red(),
            result.error.as_deref().unwrap_or_default()
        );
        for suggestion in kind.suggestions() {
            let _ = writeln!(out, "      {} {suggestion}", style("hint:").dim());
        }
        return;
    }

    let failed: Vec<_> = result.assertions.iter().filter(|a| !a.passed).collect();
    if failed.is_empty() {
        if let Some(error) = &result.error {
            let _ = writeln!(out, "    {error}");
        }
        return;
    }
    for assertion in failed {
        let actual = assertion
            .actual
            .as_deref()
            .map(|a| format!(" (actual: {a})"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "    {} {}{actual}",
            style("\u{2718}").red(),
            assertion.assertion.description()
        );
        if let Some(error) = &assertion.error {
            let _ = writeln!(out, "      {}", style(error).dim());
        }
    }
}

/// Renders the summary as pretty-printed JSON.
pub fn render_json(summary: &TestSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use courier_domain::{Assertion, AssertionResult, RequestErrorKind, StatusExpectation};
    use pretty_assertions::assert_eq;

    fn summary() -> TestSummary {
        TestSummary::from_results(vec![
            TestResult::from_status("Ping", 200),
            TestResult::from_assertions(
                "Get user",
                "user loaded",
                404,
                vec![AssertionResult::fail_with_value(
                    Assertion::StatusCode {
                        expected: StatusExpectation::Exact(200),
                    },
                    "404",
                    "Expected status = 200",
                )],
            ),
            TestResult::request_failed("Slow", RequestErrorKind::Timeout, "request timed out"),
        ])
    }

    #[test]
    fn test_text_report() {
        console::set_colors_enabled(false);
        let text = render_text(&summary());

        assert!(text.contains("\u{2714} Ping [200]"));
        assert!(text.contains("\u{2718} Get user \u{203a} user loaded [404]"));
        assert!(text.contains("Status code = 200 (actual: 404)"));
        assert!(text.contains("Request Timeout request timed out"));
        assert!(text.contains("3 tests, 1 passed, 2 failed (33.3%)"));
    }

    #[test]
    fn test_empty_report() {
        console::set_colors_enabled(false);
        assert_eq!(
            render_text(&TestSummary::default()),
            "0 tests, 0 passed, 0 failed (100.0%)\n"
        );
    }

    #[test]
    fn test_json_report_uses_camel_case() {
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&summary()).unwrap()).unwrap();
        assert_eq!(json["totalTests"], 3);
        assert_eq!(json["failedTests"], 2);
        assert_eq!(json["results"][2]["errorKind"], "timeout");
    }
}
