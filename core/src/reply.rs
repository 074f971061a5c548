//! Typed, null-tolerant view over one decoded server response.
//!
//! # Design
//! A `Reply` wraps a single JSON object behind an `Arc`, so cloning a reply
//! (e.g. to hold it in an `RSet` and hand it to a record constructor) never
//! copies the document. Accessors come in two flavours:
//!
//! - `*_r` accessors are required: a missing/null field is `MissingField`, a
//!   field of the wrong shape is `TypeMismatch`.
//! - the plain accessors return `Option` and never fail; bulk extraction in
//!   `RSet` is built on them.
//!
//! Nested collections come back as freshly allocated `Vec<Reply>`, never as
//! references into this reply. Each nested reply owns a copy of its own
//! object; the `*_iter` forms make that copy only for elements that are
//! actually consumed.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    doc: Arc<Map<String, Value>>,
}

impl Reply {
    pub fn new(doc: Map<String, Value>) -> Self {
        Self { doc: Arc::new(doc) }
    }

    /// Parse a raw response body. The root must be a JSON object; a reply
    /// carrying the API's `error` object is reported as `ApiReply`.
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        let reply = Reply::try_from(value)?;
        if let Some(error) = reply.get_object("error") {
            return Err(ApiError::ApiReply {
                code: error.get_string("code").unwrap_or_default(),
                info: error.get_string("info").unwrap_or_default(),
            });
        }
        Ok(reply)
    }

    /// The wrapped document.
    pub fn document(&self) -> &Map<String, Value> {
        &self.doc
    }

    /// `true` iff `key` is present at the top level and not null.
    pub fn has(&self, key: &str) -> bool {
        self.present(key).is_some()
    }

    pub fn get_string_r(&self, key: &str) -> Result<String, ApiError> {
        match self.present(key) {
            None => Err(ApiError::missing(key)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(ApiError::mismatch(key, "string")),
        }
    }

    /// Numbers with no fractional part are accepted even when encoded as
    /// floats (`42.0`); anything else is a `TypeMismatch`.
    pub fn get_int_r(&self, key: &str) -> Result<i64, ApiError> {
        let value = self.present(key).ok_or_else(|| ApiError::missing(key))?;
        value
            .as_i64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < -(i64::MIN as f64))
                    .map(|f| f as i64)
            })
            .ok_or_else(|| ApiError::mismatch(key, "integer"))
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_string_r(key).ok()
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get_int_r(key).ok()
    }

    /// The object at `key` as its own reply.
    pub fn get_object(&self, key: &str) -> Option<Reply> {
        match self.present(key) {
            Some(Value::Object(map)) => Some(Reply::new(map.clone())),
            _ => None,
        }
    }

    /// Treat the object at `key` as a collection keyed by opaque ids (e.g.
    /// `pages` keyed by page id) and wrap each object value. Absent keys and
    /// non-object members yield nothing.
    pub fn big_json_object_get(&self, key: &str) -> Vec<Reply> {
        self.big_json_object_iter(key).collect()
    }

    pub fn big_json_object_iter<'a>(&'a self, key: &str) -> impl Iterator<Item = Reply> + 'a {
        self.present(key)
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|map| map.values())
            .filter_map(object_reply)
    }

    /// Wrap each object element of the array at `key`. Absent keys, non-array
    /// values and non-object elements yield nothing.
    pub fn get_ja_of_jo(&self, key: &str) -> Vec<Reply> {
        self.ja_of_jo_iter(key).collect()
    }

    pub fn ja_of_jo_iter<'a>(&'a self, key: &str) -> impl Iterator<Item = Reply> + 'a {
        self.present(key)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(object_reply)
    }

    /// Parameters from the top-level `continue` object, ready for
    /// `UrlBuilder::set_params`. `None` means the result set is exhausted.
    pub fn continuation(&self) -> Option<BTreeMap<String, String>> {
        let cont = self.get_object("continue")?;
        let params = cont
            .document()
            .iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k.clone(), s.clone())),
                Value::Number(n) => Some((k.clone(), n.to_string())),
                _ => None,
            })
            .collect();
        Some(params)
    }

    fn present(&self, key: &str) -> Option<&Value> {
        self.doc.get(key).filter(|v| !v.is_null())
    }
}

impl TryFrom<Value> for Reply {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Reply::new(map)),
            other => Err(ApiError::DeserializationError(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}

fn object_reply(value: &Value) -> Option<Reply> {
    value.as_object().map(|map| Reply::new(map.clone()))
}
