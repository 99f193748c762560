//! Turns a prepared body into something reqwest can send.
//!
//! Multipart forms are rebuilt here with reqwest's own encoder, which picks
//! a fresh boundary and sets the `Content-Type` header itself.

use courier_application::ports::{PartContent, PreparedBody, PreparedPart};
use reqwest::multipart::{Form, Part};

/// Error type for body building operations.
#[derive(Debug, thiserror::Error)]
pub enum BodyBuildError {
    /// A part declared a `Content-Type` reqwest cannot parse.
    #[error("invalid MIME type '{mime}' for part '{part}': {message}")]
    InvalidMime {
        /// Field name of the part.
        part: String,
        /// The rejected value.
        mime: String,
        /// Parser message.
        message: String,
    },
}

/// Result of building a body.
#[derive(Debug)]
pub enum BuiltBody {
    /// No body.
    None,
    /// Sent verbatim.
    Text(String),
    /// Multipart form data.
    Multipart(Form),
}

impl BuiltBody {
    /// Attaches the body to a request builder.
    #[must_use]
    pub fn apply(self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::None => builder,
            Self::Text(text) => builder.body(text),
            Self::Multipart(form) => builder.multipart(form),
        }
    }
}

/// Build a reqwest body from a prepared body.
///
/// # Errors
///
/// Returns `BodyBuildError::InvalidMime` when a part's content type is not a
/// valid MIME type.
pub fn build_body(body: PreparedBody) -> Result<BuiltBody, BodyBuildError> {
    match body {
        PreparedBody::None => Ok(BuiltBody::None),
        PreparedBody::Text(text) => Ok(BuiltBody::Text(text)),
        PreparedBody::Multipart(parts) => build_multipart_form(parts).map(BuiltBody::Multipart),
    }
}

fn build_multipart_form(parts: Vec<PreparedPart>) -> Result<Form, BodyBuildError> {
    let mut form = Form::new();

    for part in parts {
        let mime = part_mime(&part);
        let PreparedPart { name, content, .. } = part;

        let built = match content {
            PartContent::Text(value) => Part::text(value),
            PartContent::File { file_name, bytes } => Part::bytes(bytes).file_name(file_name),
        };

        let built = match mime {
            Some(mime) => built
                .mime_str(&mime)
                .map_err(|e| BodyBuildError::InvalidMime {
                    part: name.clone(),
                    mime,
                    message: e.to_string(),
                })?,
            None => built,
        };

        form = form.part(name, built);
    }

    Ok(form)
}

/// The declared part type, or a guess from the file name for file parts.
fn part_mime(part: &PreparedPart) -> Option<String> {
    if let Some(declared) = &part.content_type {
        return Some(declared.clone());
    }
    match &part.content {
        PartContent::Text(_) => None,
        PartContent::File { file_name, .. } => Some(
            mime_guess::from_path(file_name)
                .first_or_octet_stream()
                .to_string(),
        ),
    }
}
