//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! The core renders `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. The caller executes the request with its
//! own HTTP client, including any retry, cookie or auth handling, and hands
//! the status and body back.

use url::Url;

/// A GET request against the wiki API described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
///
/// Constructed by the caller after executing an `HttpRequest`, then passed
/// to `WikiClient::parse_*`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
