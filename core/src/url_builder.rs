//! Accumulating request URL builder.
//!
//! # Design
//! A `UrlBuilder` is created once per logical query and mutated between
//! pagination rounds; usually only the continuation token changes. Keys and
//! values are stored already percent-encoded, so neither can split into extra
//! pairs. `format` and `action` always render first, exactly once; setting
//! either replaces the fixed value. The rest live in a `BTreeMap` so the
//! rendered query string has a stable order and two renders without a
//! mutation in between are byte-identical.

use std::collections::BTreeMap;

use log::debug;
use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct UrlBuilder {
    endpoint: String,
    format: String,
    action: String,
    params: BTreeMap<String, String>,
}

impl UrlBuilder {
    /// Start a builder for `action` on `domain` (shorthand such as
    /// `commons.wikimedia.org`). `params` must NOT be URL-encoded.
    pub fn new<K, V>(
        config: &ApiConfig,
        domain: &str,
        action: &str,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut builder = Self {
            endpoint: config.endpoint(domain),
            format: "json".to_string(),
            action: encode(action),
            params: BTreeMap::new(),
        };
        builder.set_params(params);
        builder
    }

    /// Set `key` to `value`, replacing any earlier value. Both are
    /// percent-encoded here, so passing an encoded string double-encodes it.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        let value = encode(value.as_ref());
        match encode(&key.into()).as_str() {
            "format" => self.format = value,
            "action" => self.action = value,
            key => {
                self.params.insert(key.to_string(), value);
            }
        }
    }

    /// Apply `set_param` for every pair. Keys not named here keep their
    /// current value.
    pub fn set_params<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        for (key, value) in params {
            self.set_param(key, value);
        }
    }

    /// The stored (encoded) value for the encoded `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        match key {
            "format" => Some(&self.format),
            "action" => Some(&self.action),
            _ => self.params.get(key).map(String::as_str),
        }
    }

    /// Compose the URL from the current state. Re-derived on every call.
    pub fn render(&self) -> Result<Url, ApiError> {
        let mut raw = format!("{}?format={}&action={}", self.endpoint, self.format, self.action);
        for (key, value) in &self.params {
            raw.push('&');
            raw.push_str(key);
            raw.push('=');
            raw.push_str(value);
        }
        debug!("rendered request URL {raw}");
        Url::parse(&raw).map_err(|source| ApiError::MalformedUrl { url: raw, source })
    }
}

fn encode(raw: &str) -> String {
    byte_serialize(raw.as_bytes()).collect()
}
