//! Hand-written `multipart/form-data` bodies.
//!
//! Scripts spell out multipart bodies the way they appear on the wire:
//!
//! ```text
//! --boundary
//! Content-Disposition: form-data; name="title"
//!
//! Quarterly report
//! --boundary
//! Content-Disposition: form-data; name="file"; filename="report.pdf"
//! Content-Type: application/pdf
//!
//! < ./report.pdf
//! --boundary--
//! ```
//!
//! A part is a file part when its disposition carries `filename=`; its body
//! is then a path (optionally prefixed with `<`), not the file contents.

use thiserror::Error;

/// Malformed multipart text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MultipartError {
    /// No `boundary=` parameter and no `--` delimiter line.
    #[error("no multipart boundary found")]
    MissingBoundary,

    /// A part header line without a `:`.
    #[error("invalid part header on line {line}: '{text}'")]
    InvalidPartHeader {
        /// 1-based line within the body.
        line: usize,
        /// Offending text.
        text: String,
    },

    /// The body has text but no line matches the boundary delimiter.
    #[error("no part delimited by '--{boundary}' found in the body")]
    NoParts {
        /// The boundary that was searched for.
        boundary: String,
    },

    /// A part without `Content-Disposition: form-data; name="..."`.
    #[error("part {index} has no field name")]
    MissingName {
        /// 1-based part index.
        index: usize,
    },
}

/// A decoded part of a textual multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    /// Field name.
    pub name: String,
    /// Declared part `Content-Type`.
    pub content_type: Option<String>,
    /// Text value or file reference.
    pub kind: PartKind,
}

/// Whether a part carries literal text or names a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartKind {
    /// Literal field value.
    Text(String),
    /// Reference to a local file to upload.
    File {
        /// `filename=` from the disposition.
        file_name: String,
        /// Path as written in the script, `<` prefix removed.
        path: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectHeaders,
    ExpectBody,
}

#[derive(Debug, Default)]
struct PartBuilder {
    name: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    body: Vec<String>,
}

impl PartBuilder {
    fn header(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case("content-disposition") {
            self.name = disposition_param(value, "name");
            self.file_name = disposition_param(value, "filename");
        } else if name.eq_ignore_ascii_case("content-type") {
            self.content_type = Some(value.to_string());
        }
    }

    fn finish(self, index: usize) -> Result<MultipartPart, MultipartError> {
        let name = self.name.ok_or(MultipartError::MissingName { index })?;
        let content = self.body.join("\n");

        let kind = match self.file_name {
            Some(file_name) => {
                let path = content.trim();
                let path = path.strip_prefix('<').unwrap_or(path).trim();
                let path = if path.is_empty() { file_name.clone() } else { path.to_string() };
                PartKind::File { file_name, path }
            }
            None => PartKind::Text(content),
        };

        Ok(MultipartPart {
            name,
            content_type: self.content_type,
            kind,
        })
    }
}

/// Extracts `boundary=` from a `Content-Type` value.
#[must_use]
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"').to_string())
            .filter(|b| !b.is_empty())
    })
}

/// Reads `key="value"` (or unquoted) from a `Content-Disposition` value.
fn disposition_param(disposition: &str, key: &str) -> Option<String> {
    disposition.split(';').skip(1).find_map(|param| {
        let (k, v) = param.split_once('=')?;
        k.trim()
            .eq_ignore_ascii_case(key)
            .then(|| v.trim().trim_matches('"').to_string())
    })
}

/// Decomposes a textual multipart body into parts.
///
/// The boundary comes from `content_type` when it has one, otherwise from the
/// first line starting with `--`. Lines before the first delimiter are
/// ignored, a missing closing delimiter is tolerated, and a part with no
/// blank line after its headers has an empty body.
///
/// # Errors
///
/// Returns `MultipartError` when no boundary can be found, a non-blank body
/// has no delimiter line for it, a part header is malformed, or a part has
/// no field name.
pub fn parse_multipart(
    body: &str,
    content_type: Option<&str>,
) -> Result<Vec<MultipartPart>, MultipartError> {
    let boundary = content_type
        .and_then(boundary_from_content_type)
        .or_else(|| {
            body.lines()
                .map(str::trim_end)
                .find_map(|l| l.strip_prefix("--"))
                .map(|b| b.strip_suffix("--").unwrap_or(b).to_string())
        })
        .filter(|b| !b.is_empty())
        .ok_or(MultipartError::MissingBoundary)?;

    let delimiter = format!("--{boundary}");
    let closing = format!("--{boundary}--");

    let mut parts = Vec::new();
    let mut current: Option<PartBuilder> = None;
    let mut state = State::ExpectHeaders;

    for (idx, raw) in body.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let marker = line.trim_end();

        if marker == closing || marker == delimiter {
            if let Some(part) = current.take() {
                parts.push(part.finish(parts.len() + 1)?);
            }
            if marker == closing {
                break;
            }
            current = Some(PartBuilder::default());
            state = State::ExpectHeaders;
            continue;
        }

        let Some(part) = current.as_mut() else {
            continue;
        };

        match state {
            State::ExpectHeaders if line.trim().is_empty() => state = State::ExpectBody,
            State::ExpectHeaders => {
                let (name, value) =
                    line.split_once(':')
                        .ok_or_else(|| MultipartError::InvalidPartHeader {
                            line: idx + 1,
                            text: line.to_string(),
                        })?;
                part.header(name.trim(), value.trim());
            }
            State::ExpectBody => part.body.push(line.to_string()),
        }
    }

    if let Some(part) = current {
        parts.push(part.finish(parts.len() + 1)?);
    }

    if parts.is_empty() && !body.trim().is_empty() {
        return Err(MultipartError::NoParts { boundary });
    }

    Ok(parts)
}
