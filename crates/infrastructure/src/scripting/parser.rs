//! Parser for the Courier request script format.
//!
//! A script is a sequence of request blocks separated by lines starting with
//! `###`:
//!
//! ```text
//! ### Login
//! POST ${baseUrl}/login HTTP/1.1
//! Content-Type: application/json
//!
//! {"user": "admin", "password": "${password}"}
//!
//! @test login succeeds
//! status == 200
//! json $.access_token exists
//!
//! @capture token <- access_token
//! ```
//!
//! Inside a block, the first non-comment line is the request line, header
//! lines follow until a blank line, then the raw body runs until the first
//! `@test` or `@capture` directive. Lines starting with `#` or `//` are
//! comments everywhere except inside a body that has other content.

use std::fmt;
use std::str::FromStr;

use courier_domain::{
    Assertion, ComparisonOperator, Header, HttpMethod, RequestBody, RequestSpec,
    StatusExpectation, TestBlock, VariableCapture,
};
use serde_json::Value;
use thiserror::Error;

/// What kind of grammar violation a [`ParseError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The request line is not `METHOD URL [HTTP/x]`, or the method is unknown.
    MalformedRequestLine,
    /// A body line appeared in the header section without a blank line first.
    MissingSeparator,
    /// A header line with an empty or illegal name.
    InvalidHeader,
    /// An assertion that does not match the grammar or sits outside `@test`.
    InvalidAssertion,
    /// A `@capture` directive without `key <- expression`.
    InvalidCapture,
}

impl ParseErrorKind {
    /// Short human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedRequestLine => "malformed request line",
            Self::MissingSeparator => "missing blank line before body",
            Self::InvalidHeader => "invalid header",
            Self::InvalidAssertion => "invalid assertion",
            Self::InvalidCapture => "invalid capture",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A script that does not follow the grammar. Fatal to the whole script.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} at line {line} (block {block}, '{name}'): {message}")]
pub struct ParseError {
    /// Violation category.
    pub kind: ParseErrorKind,
    /// 1-based index of the block among the script's non-empty blocks.
    pub block: usize,
    /// Best known name of the request being parsed.
    pub name: String,
    /// 1-based line in the script.
    pub line: usize,
    /// Details.
    pub message: String,
}

/// Parse a script into requests, in appearance order.
///
/// Blocks containing only comments and whitespace are skipped.
///
/// # Errors
///
/// Returns the first grammar violation found; no block is ever dropped
/// silently.
pub fn parse_script(script: &str) -> Result<Vec<RequestSpec>, ParseError> {
    let mut requests = Vec::new();

    let blocks = split_blocks(script);
    for (index, block) in blocks.iter().filter(|b| !b.is_blank()).enumerate() {
        requests.push(BlockParser::new(index + 1, block).parse()?);
    }

    Ok(requests)
}

struct Block<'a> {
    title: Option<String>,
    lines: Vec<(usize, &'a str)>,
}

impl Block<'_> {
    fn is_blank(&self) -> bool {
        self.lines.iter().all(|(_, line)| {
            let line = line.trim();
            line.is_empty() || is_comment(line)
        })
    }
}

fn split_blocks(script: &str) -> Vec<Block<'_>> {
    let mut blocks = vec![Block {
        title: None,
        lines: Vec::new(),
    }];

    for (idx, raw) in script.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(title) = line.strip_prefix("###") {
            let title = title.trim();
            blocks.push(Block {
                title: (!title.is_empty()).then(|| title.to_string()),
                lines: Vec::new(),
            });
        } else if let Some(block) = blocks.last_mut() {
            block.lines.push((idx + 1, line));
        }
    }

    blocks
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with('#') || trimmed.starts_with("//")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    RequestLine,
    Headers,
    Body,
    Directives,
}

struct BlockParser<'a> {
    index: usize,
    block: &'a Block<'a>,
    section: Section,
    name_directive: Option<String>,
    request: Option<RequestSpec>,
    body: Vec<&'a str>,
    tests: Vec<TestBlock>,
    captures: Vec<VariableCapture>,
}

impl<'a> BlockParser<'a> {
    const fn new(index: usize, block: &'a Block<'a>) -> Self {
        Self {
            index,
            block,
            section: Section::RequestLine,
            name_directive: None,
            request: None,
            body: Vec::new(),
            tests: Vec::new(),
            captures: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<RequestSpec, ParseError> {
        let block = self.block;
        for &(line_no, line) in &block.lines {
            self.line(line_no, line)?;
        }

        let name = self.name();
        let Some(mut request) = self.request else {
            let line = self.block.lines.first().map_or(0, |(n, _)| *n);
            return Err(ParseError {
                kind: ParseErrorKind::MalformedRequestLine,
                block: self.index,
                name,
                line,
                message: "block has no request line".to_string(),
            });
        };

        request.name = name;
        request.body = body_from_lines(&self.body);
        request.tests = self.tests;
        request.captures = self.captures;
        Ok(request)
    }

    fn name(&self) -> String {
        self.block
            .title
            .clone()
            .or_else(|| self.name_directive.clone())
            .or_else(|| {
                self.request
                    .as_ref()
                    .map(|r| format!("{} {}", r.method, r.url))
            })
            .unwrap_or_else(|| format!("block {}", self.index))
    }

    fn error(&self, kind: ParseErrorKind, line: usize, message: impl Into<String>) -> ParseError {
        ParseError {
            kind,
            block: self.index,
            name: self.name(),
            line,
            message: message.into(),
        }
    }

    fn line(&mut self, line_no: usize, line: &'a str) -> Result<(), ParseError> {
        let trimmed = line.trim();

        if self.section == Section::Body {
            if is_directive(trimmed) {
                self.section = Section::Directives;
            } else {
                self.body.push(line);
                return Ok(());
            }
        }

        if trimmed.is_empty() {
            if self.section == Section::Headers {
                self.section = Section::Body;
            }
            return Ok(());
        }
        if is_comment(trimmed) {
            return Ok(());
        }
        if let Some(name) = directive_arg(trimmed, "@name") {
            self.name_directive = Some(name.to_string());
            return Ok(());
        }

        match self.section {
            Section::RequestLine => {
                self.request = Some(self.request_line(line_no, trimmed)?);
                self.section = Section::Headers;
                Ok(())
            }
            Section::Headers if is_directive(trimmed) => {
                self.section = Section::Directives;
                self.directive(line_no, trimmed)
            }
            Section::Headers => self.header(line_no, trimmed),
            Section::Body | Section::Directives => self.directive(line_no, trimmed),
        }
    }

    fn request_line(&self, line_no: usize, line: &str) -> Result<RequestSpec, ParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (method, url) = match tokens.as_slice() {
            [method, url] => (*method, *url),
            [method, url, version] if version.starts_with("HTTP/") => (*method, *url),
            _ => {
                return Err(self.error(
                    ParseErrorKind::MalformedRequestLine,
                    line_no,
                    format!("expected 'METHOD URL [HTTP/version]', found '{line}'"),
                ));
            }
        };

        let method = HttpMethod::from_str(method).map_err(|_| {
            self.error(
                ParseErrorKind::MalformedRequestLine,
                line_no,
                format!("unsupported method '{method}'"),
            )
        })?;

        let mut request = RequestSpec::new(String::new(), method, url);
        request.line = line_no;
        Ok(request)
    }

    fn header(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        let Some((name, value)) = line
            .split_once(':')
            .filter(|_| !line.starts_with('{') && !line.starts_with('['))
        else {
            return Err(self.error(
                ParseErrorKind::MissingSeparator,
                line_no,
                format!("'{line}' is not a header; separate the body with a blank line"),
            ));
        };

        let header = Header::parse(name, value)
            .map_err(|e| self.error(ParseErrorKind::InvalidHeader, line_no, e.to_string()))?;
        if let Some(request) = self.request.as_mut() {
            request.headers.add(header);
        }
        Ok(())
    }

    fn directive(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        if let Some(name) = directive_arg(line, "@test") {
            let name = if name.is_empty() {
                format!("test {}", self.tests.len() + 1)
            } else {
                name.to_string()
            };
            self.tests.push(TestBlock::new(name));
            return Ok(());
        }

        if let Some(spec) = directive_arg(line, "@capture") {
            let capture = parse_capture(spec)
                .ok_or_else(|| {
                    self.error(
                        ParseErrorKind::InvalidCapture,
                        line_no,
                        format!("expected '@capture key <- expression', found '{line}'"),
                    )
                })?;
            self.captures.push(capture);
            return Ok(());
        }

        let assertion = parse_assertion(line)
            .map_err(|message| self.error(ParseErrorKind::InvalidAssertion, line_no, message))?;
        if self.tests.is_empty() {
            return Err(self.error(
                ParseErrorKind::InvalidAssertion,
                line_no,
                format!("'{line}' is outside of a @test block"),
            ));
        }
        if let Some(test) = self.tests.last_mut() {
            test.assertions.push(assertion);
        }
        Ok(())
    }
}

fn is_directive(trimmed: &str) -> bool {
    directive_arg(trimmed, "@test").is_some() || directive_arg(trimmed, "@capture").is_some()
}

/// Returns the argument of `@keyword arg`, requiring a word boundary after
/// the keyword.
fn directive_arg<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| rest.trim())
}

fn parse_capture(spec: &str) -> Option<VariableCapture> {
    let (key, expression) = spec
        .split_once("<-")
        .or_else(|| spec.split_once('\u{2190}'))?;
    let key = key.trim();
    let expression = expression.trim();

    let valid_key = !key.is_empty() && !key.contains(char::is_whitespace);
    (valid_key && !expression.is_empty()).then(|| VariableCapture::new(key, expression))
}

/// Body lines with surrounding blank lines removed.
///
/// A body made only of comment lines is no body at all.
fn body_from_lines(lines: &[&str]) -> RequestBody {
    if lines.iter().all(|l| {
        let l = l.trim();
        l.is_empty() || is_comment(l)
    }) {
        return RequestBody::none();
    }

    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => RequestBody::text(lines[start..=end].join("\n")),
        _ => RequestBody::none(),
    }
}

/// Splits off the first whitespace-delimited word.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    s.split_once(char::is_whitespace)
        .map_or((s, ""), |(word, rest)| (word, rest.trim()))
}

/// Removes one pair of matching `"` or `'` quotes.
fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 {
        if value.starts_with('"') && value.ends_with('"') {
            if let Ok(Value::String(s)) = serde_json::from_str(value) {
                return s;
            }
            return value[1..value.len() - 1].to_string();
        }
        if value.starts_with('\'') && value.ends_with('\'') {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

/// A JSON literal when the text parses as one, otherwise a string.
fn json_literal(value: &str) -> Value {
    let value = value.trim();
    if value.starts_with('\'') {
        return Value::String(unquote(value));
    }
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn require_value<'a>(value: &'a str, what: &str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(format!("missing {what}"))
    } else {
        Ok(value)
    }
}

fn parse_status_code(text: &str) -> Result<u16, String> {
    text.trim()
        .parse()
        .map_err(|_| format!("'{}' is not a status code", text.trim()))
}

/// Parses one assertion line.
fn parse_assertion(line: &str) -> Result<Assertion, String> {
    let (subject, rest) = split_word(line);
    match subject.to_ascii_lowercase().as_str() {
        "status" => parse_status(rest),
        "header" => {
            let (name, rest) = split_word(rest);
            let name = require_value(name, "header name")?.to_string();
            let (op, value) = split_word(rest);
            match op {
                "exists" if value.is_empty() => Ok(Assertion::HeaderExists { name, value: None }),
                "==" | "is" => Ok(Assertion::HeaderExists {
                    name,
                    value: Some(unquote(require_value(value, "header value")?)),
                }),
                "matches" => Ok(Assertion::HeaderMatches {
                    name,
                    pattern: unquote(require_value(value, "pattern")?),
                }),
                _ => Err(format!("unknown header check '{op}'")),
            }
        }
        "body" => {
            let (op, value) = split_word(rest);
            let value = unquote(require_value(value, "body value")?);
            match op {
                "contains" => Ok(Assertion::BodyContains {
                    text: value,
                    ignore_case: false,
                }),
                "matches" => Ok(Assertion::BodyMatches { pattern: value }),
                "==" | "is" => Ok(Assertion::BodyEquals { expected: value }),
                _ => Err(format!("unknown body check '{op}'")),
            }
        }
        "json" => parse_json_assertion(rest),
        "duration" | "time" => {
            let (op, value) = split_word(rest);
            if !matches!(op, "<" | "<=") {
                return Err(format!("expected '<' after '{subject}', found '{op}'"));
            }
            let value = require_value(value, "duration")?;
            let millis = value.strip_suffix("ms").unwrap_or(value).trim();
            let max_ms = millis
                .parse()
                .map_err(|_| format!("'{value}' is not a duration in milliseconds"))?;
            Ok(Assertion::ResponseTime { max_ms })
        }
        "content-type" => {
            let (op, value) = split_word(rest);
            if !matches!(op, "contains" | "==" | "is") {
                return Err(format!("unknown content-type check '{op}'"));
            }
            Ok(Assertion::ContentType {
                expected: unquote(require_value(value, "content type")?),
            })
        }
        "is" if rest.eq_ignore_ascii_case("json") => Ok(Assertion::IsJson),
        _ => Err(format!("unrecognised assertion '{line}'")),
    }
}

fn parse_status(rest: &str) -> Result<Assertion, String> {
    let (op, value) = split_word(rest);
    let value = require_value(value, "status code")?;

    let expected = match op {
        "==" | "is" => StatusExpectation::Exact(parse_status_code(value)?),
        "in" => {
            if let Some(list) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
                let codes = list
                    .split(',')
                    .map(parse_status_code)
                    .collect::<Result<Vec<_>, _>>()?;
                StatusExpectation::OneOf(codes)
            } else {
                let (min, max) = value
                    .split_once('-')
                    .ok_or_else(|| format!("expected 'A-B' or '[A, B]', found '{value}'"))?;
                StatusExpectation::Range {
                    min: parse_status_code(min)?,
                    max: parse_status_code(max)?,
                }
            }
        }
        _ => return Err(format!("unknown status check '{op}'")),
    };

    Ok(Assertion::StatusCode { expected })
}

fn parse_json_assertion(rest: &str) -> Result<Assertion, String> {
    let (path, rest) = split_word(rest);
    let path = require_value(path, "JSON path")?.to_string();
    let (op, value) = split_word(rest);

    let operator = match op {
        "exists" if value.is_empty() => {
            return Ok(Assertion::JsonPath {
                path,
                expected: None,
            });
        }
        "==" | "is" => {
            return Ok(Assertion::JsonPath {
                path,
                expected: Some(json_literal(require_value(value, "expected value")?)),
            });
        }
        "!=" => ComparisonOperator::NotEquals,
        ">" => ComparisonOperator::GreaterThan,
        ">=" => ComparisonOperator::GreaterThanOrEqual,
        "<" => ComparisonOperator::LessThan,
        "<=" => ComparisonOperator::LessThanOrEqual,
        "contains" => ComparisonOperator::Contains,
        "matches" => ComparisonOperator::Matches,
        _ => return Err(format!("unknown JSON check '{op}'")),
    };

    let value = require_value(value, "comparison value")?;
    let value = if operator == ComparisonOperator::Matches {
        Value::String(unquote(value))
    } else {
        json_literal(value)
    };

    Ok(Assertion::JsonPathMatches {
        path,
        operator,
        value,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn kind_of(script: &str) -> ParseErrorKind {
        parse_script(script).unwrap_err().kind
    }

    #[test]
    fn test_single_get() {
        let requests = parse_script("GET http://localhost:8080/ping\n").unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "GET http://localhost:8080/ping");
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].line, 1);
        assert_eq!(requests[0].body, RequestBody::None);
    }

    #[test]
    fn test_full_block() {
        let script = "\
### Login
POST ${baseUrl}/login HTTP/1.1
Content-Type: application/json
X-Trace: abc

{
  \"user\": \"${user}\"
}

@test login succeeds
status == 200
json $.token exists

@capture token <- token
@capture user_id \u{2190} $.user.id
";
        let requests = parse_script(script).unwrap();
        let login = &requests[0];

        assert_eq!(login.name, "Login");
        assert_eq!(login.method, HttpMethod::Post);
        assert_eq!(login.url, "${baseUrl}/login");
        assert_eq!(login.line, 2);
        assert_eq!(login.headers.content_type(), Some("application/json"));
        assert_eq!(login.headers.get("x-trace"), Some("abc"));
        assert_eq!(
            login.body.as_text(),
            Some("{\n  \"user\": \"${user}\"\n}")
        );
        assert_eq!(
            login.tests,
            vec![
                TestBlock::new("login succeeds")
                    .with_assertion(Assertion::StatusCode {
                        expected: StatusExpectation::Exact(200)
                    })
                    .with_assertion(Assertion::JsonPath {
                        path: "$.token".to_string(),
                        expected: None
                    })
            ]
        );
        assert_eq!(
            login.captures,
            vec![
                VariableCapture::new("token", "token"),
                VariableCapture::new("user_id", "$.user.id"),
            ]
        );
    }

    #[test]
    fn test_blocks_in_order_and_blank_blocks_skipped() {
        let script = "\
# leading comment only

### First
GET http://a.test/1

###
// nothing here

### Third
DELETE http://a.test/3
";
        let requests = parse_script(script).unwrap();
        let names: Vec<_> = requests.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Third"]);
    }

    #[test]
    fn test_name_directive_and_default_name() {
        let script = "\
###
@name health
GET http://a.test/health

###
PUT http://a.test/items/1
";
        let requests = parse_script(script).unwrap();
        assert_eq!(requests[0].name, "health");
        assert_eq!(requests[1].name, "PUT http://a.test/items/1");
    }

    #[test]
    fn test_comments_ignored_outside_body() {
        let script = "\
# comment before
GET http://a.test
# between headers
Accept: */*
";
        let requests = parse_script(script).unwrap();
        assert_eq!(requests[0].headers.len(), 1);
    }

    #[test]
    fn test_body_runs_to_directive() {
        let script = "POST http://a.test\n\nline one\n# not a comment here\n\n@capture id <- id\n";
        let request = &parse_script(script).unwrap()[0];
        assert_eq!(request.body.as_text(), Some("line one\n# not a comment here"));
        assert_eq!(request.captures.len(), 1);
    }

    #[test]
    fn test_comment_only_body_is_dropped() {
        let script = "GET http://a.test\n\n# note\n\n@test ok\nstatus == 200\n";
        let request = &parse_script(script).unwrap()[0];
        assert_eq!(request.body, RequestBody::None);
        assert_eq!(request.tests.len(), 1);
    }

    #[test]
    fn test_directives_directly_after_headers() {
        let script = "GET http://a.test\nAccept: text/plain\n@test ok\nstatus in 200-299\n";
        let request = &parse_script(script).unwrap()[0];
        assert_eq!(request.tests.len(), 1);
        assert_eq!(request.body, RequestBody::None);
    }

    #[test]
    fn test_multipart_body_kept_verbatim() {
        let script = "\
POST http://a.test/upload
Content-Type: multipart/form-data; boundary=XyZ

--XyZ
Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"

< ./a.txt
--XyZ--
";
        let request = &parse_script(script).unwrap()[0];
        assert!(request.body.as_text().unwrap().starts_with("--XyZ\n"));
        assert!(request.body.as_text().unwrap().ends_with("--XyZ--"));
    }

    #[test]
    fn test_malformed_request_line() {
        assert_eq!(kind_of("http://a.test\n"), ParseErrorKind::MalformedRequestLine);
        assert_eq!(kind_of("FETCH http://a.test\n"), ParseErrorKind::MalformedRequestLine);
        assert_eq!(
            kind_of("GET http://a.test extra tokens\n"),
            ParseErrorKind::MalformedRequestLine
        );
        assert_eq!(kind_of("@name only\n"), ParseErrorKind::MalformedRequestLine);
    }

    #[test]
    fn test_missing_separator() {
        let err = parse_script("POST http://a.test\nContent-Type: text/plain\n{\"a\": 1}\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingSeparator);
        assert_eq!(err.line, 3);
        assert_eq!(err.block, 1);
        assert_eq!(err.name, "POST http://a.test");

        assert_eq!(
            kind_of("POST http://a.test\nplain text body\n"),
            ParseErrorKind::MissingSeparator
        );
    }

    #[test]
    fn test_invalid_header() {
        assert_eq!(kind_of("GET http://a.test\n: value\n"), ParseErrorKind::InvalidHeader);
        assert_eq!(
            kind_of("GET http://a.test\nBad Name: value\n"),
            ParseErrorKind::InvalidHeader
        );
    }

    #[test]
    fn test_invalid_assertion() {
        assert_eq!(
            kind_of("GET http://a.test\n\n@test t\nstatus maybe 200\n"),
            ParseErrorKind::InvalidAssertion
        );
        assert_eq!(
            kind_of("GET http://a.test\n\n@capture a <- b\nstatus == 200\n"),
            ParseErrorKind::InvalidAssertion
        );
    }

    #[test]
    fn test_invalid_capture() {
        for line in ["@capture token", "@capture <- token", "@capture token <-", "@capture a b <- c"] {
            let script = format!("GET http://a.test\n\n{line}\n");
            assert_eq!(kind_of(&script), ParseErrorKind::InvalidCapture, "{line}");
        }
    }

    #[test]
    fn test_error_reports_block_index() {
        let script = "### ok\nGET http://a.test\n\n### broken\nNOPE\n";
        let err = parse_script(script).unwrap_err();
        assert_eq!(err.block, 2);
        assert_eq!(err.name, "broken");
        assert_eq!(err.line, 5);
    }

    #[test]
    fn test_status_assertions() {
        assert_eq!(
            parse_assertion("status is 201").unwrap(),
            Assertion::StatusCode {
                expected: StatusExpectation::Exact(201)
            }
        );
        assert_eq!(
            parse_assertion("status in 200-299").unwrap(),
            Assertion::StatusCode {
                expected: StatusExpectation::Range { min: 200, max: 299 }
            }
        );
        assert_eq!(
            parse_assertion("status in [200, 204]").unwrap(),
            Assertion::StatusCode {
                expected: StatusExpectation::OneOf(vec![200, 204])
            }
        );
        assert!(parse_assertion("status == abc").is_err());
    }

    #[test]
    fn test_header_and_body_assertions() {
        assert_eq!(
            parse_assertion("header X-Id exists").unwrap(),
            Assertion::HeaderExists {
                name: "X-Id".to_string(),
                value: None
            }
        );
        assert_eq!(
            parse_assertion("header Content-Type == 'text/plain'").unwrap(),
            Assertion::HeaderExists {
                name: "Content-Type".to_string(),
                value: Some("text/plain".to_string())
            }
        );
        assert_eq!(
            parse_assertion(r"header ETag matches ^W/").unwrap(),
            Assertion::HeaderMatches {
                name: "ETag".to_string(),
                pattern: "^W/".to_string()
            }
        );
        assert_eq!(
            parse_assertion("body contains \"hello world\"").unwrap(),
            Assertion::BodyContains {
                text: "hello world".to_string(),
                ignore_case: false
            }
        );
        assert_eq!(
            parse_assertion("body == pong").unwrap(),
            Assertion::BodyEquals {
                expected: "pong".to_string()
            }
        );
    }

    #[test]
    fn test_json_assertions() {
        assert_eq!(
            parse_assertion("json $.id == 42").unwrap(),
            Assertion::JsonPath {
                path: "$.id".to_string(),
                expected: Some(json!(42))
            }
        );
        assert_eq!(
            parse_assertion("json user.name is 'Ada'").unwrap(),
            Assertion::JsonPath {
                path: "user.name".to_string(),
                expected: Some(json!("Ada"))
            }
        );
        assert_eq!(
            parse_assertion("json $.meta.count >= 2").unwrap(),
            Assertion::JsonPathMatches {
                path: "$.meta.count".to_string(),
                operator: ComparisonOperator::GreaterThanOrEqual,
                value: json!(2)
            }
        );
        assert_eq!(
            parse_assertion("json $.tags contains \"new\"").unwrap(),
            Assertion::JsonPathMatches {
                path: "$.tags".to_string(),
                operator: ComparisonOperator::Contains,
                value: json!("new")
            }
        );
        assert_eq!(
            parse_assertion("json $.email matches ^[a-z]+@").unwrap(),
            Assertion::JsonPathMatches {
                path: "$.email".to_string(),
                operator: ComparisonOperator::Matches,
                value: json!("^[a-z]+@")
            }
        );
    }

    #[test]
    fn test_misc_assertions() {
        assert_eq!(
            parse_assertion("duration < 500ms").unwrap(),
            Assertion::ResponseTime { max_ms: 500 }
        );
        assert_eq!(
            parse_assertion("time < 250").unwrap(),
            Assertion::ResponseTime { max_ms: 250 }
        );
        assert_eq!(
            parse_assertion("content-type contains json").unwrap(),
            Assertion::ContentType {
                expected: "json".to_string()
            }
        );
        assert_eq!(parse_assertion("is json").unwrap(), Assertion::IsJson);
        assert!(parse_assertion("duration > 5").is_err());
        assert!(parse_assertion("something else").is_err());
    }

    #[test]
    fn test_crlf_script() {
        let requests = parse_script("### A\r\nGET http://a.test\r\nAccept: */*\r\n\r\nbody\r\n").unwrap();
        assert_eq!(requests[0].headers.get("accept"), Some("*/*"));
        assert_eq!(requests[0].body.as_text(), Some("body"));
    }
}
