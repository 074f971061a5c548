//! Error types for the wiki API client.
//!
//! # Design
//! Data-shape failures (`MissingField`, `TypeMismatch`) are kept apart from
//! transport failures (`HttpError`) and body-parsing failures
//! (`DeserializationError`) so callers can tell "the server answered with
//! something unexpected" from "we never got a usable answer". A reply that
//! carries the API's own `error` object lands in `ApiReply`.

use thiserror::Error;

/// Errors returned by URL rendering, reply accessors and `WikiClient` parse
/// methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The composed request string is not a valid URL. Only a bad domain,
    /// protocol or action can cause this; parameter values are always
    /// percent-encoded before insertion.
    #[error("malformed request URL `{url}`: {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A required field is absent or null.
    #[error("missing required field `{key}`")]
    MissingField { key: String },

    /// A field exists but cannot be coerced to the requested type.
    #[error("field `{key}` is not a valid {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// The server returned a non-200 status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body is not a JSON object.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The server answered with an API `error` object.
    #[error("API error {code}: {info}")]
    ApiReply { code: String, info: String },
}

impl ApiError {
    pub(crate) fn missing(key: &str) -> Self {
        ApiError::MissingField {
            key: key.to_string(),
        }
    }

    pub(crate) fn mismatch(key: &str, expected: &'static str) -> Self {
        ApiError::TypeMismatch {
            key: key.to_string(),
            expected,
        }
    }
}
