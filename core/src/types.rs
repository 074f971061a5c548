//! Domain records built from replies.
//!
//! # Design
//! Records copy what they need out of a `Reply` at construction and keep no
//! reference to it afterwards. Fields the API guarantees for a successful
//! response are read with the required accessors, so a malformed reply fails
//! the whole record.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::error::ApiError;
use crate::reply::Reply;

/// One revision of a file as returned by `prop=imageinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub title: String,
    pub user: String,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
    /// Size in bytes.
    pub size: i64,
    /// Width and height in pixels.
    pub dimensions: (i64, i64),
    pub url: Url,
    pub sha1: String,
    pub mime: String,
    /// Only present when a thumbnail was requested with `iiurlwidth`.
    pub thumb_url: Option<Url>,
    pub thumb_dimensions: Option<(i64, i64)>,
    /// The canonical title, when it differs from `title`.
    pub redirects_to: Option<String>,
}

impl ImageInfo {
    pub fn from_reply(title: &str, r: &Reply) -> Result<Self, ApiError> {
        let (thumb_url, thumb_dimensions) = if r.has("thumburl") {
            (
                Some(url_field(r, "thumburl")?),
                Some((r.get_int_r("thumbwidth")?, r.get_int_r("thumbheight")?)),
            )
        } else {
            (None, None)
        };

        let canonical = r.get_string_r("canonicaltitle")?;
        let redirects_to = (canonical != title).then_some(canonical);

        Ok(Self {
            title: title.to_string(),
            user: r.get_string_r("user")?,
            comment: r.get_string_r("comment")?,
            timestamp: timestamp_field(r, "timestamp")?,
            size: r.get_int_r("size")?,
            dimensions: (r.get_int_r("width")?, r.get_int_r("height")?),
            url: url_field(r, "url")?,
            sha1: r.get_string_r("sha1")?,
            mime: r.get_string_r("mime")?,
            thumb_url,
            thumb_dimensions,
            redirects_to,
        })
    }

    /// One record per reply, in reply order. Fails on the first bad reply.
    pub fn make_image_infos(title: &str, replies: &[Reply]) -> Result<Vec<Self>, ApiError> {
        replies.iter().map(|r| Self::from_reply(title, r)).collect()
    }

    /// Comparator for `sort_by`: newer uploads before older ones.
    pub fn cmp_newest_first(&self, other: &Self) -> Ordering {
        other.timestamp.cmp(&self.timestamp)
    }
}


impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}x{}, {} bytes) by {} at {}",
            self.title,
            self.dimensions.0,
            self.dimensions.1,
            self.size,
            self.user,
            self.timestamp.to_rfc3339()
        )
    }
}

fn url_field(r: &Reply, key: &str) -> Result<Url, ApiError> {
    Url::parse(&r.get_string_r(key)?).map_err(|_| ApiError::mismatch(key, "URL"))
}

fn timestamp_field(r: &Reply, key: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(&r.get_string_r(key)?)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ApiError::mismatch(key, "RFC 3339 timestamp"))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn info_json() -> Value {
        json!({
            "timestamp": "2016-03-04T05:06:07Z",
            "user": "Example",
            "comment": "upload",
            "size": 1024,
            "width": 640,
            "height": 480,
            "url": "https://upload.example.org/a/ab/Foo.jpg",
            "sha1": "da39a3ee5e6b4b0d3255bfef95601890afd80709",
            "mime": "image/jpeg",
            "canonicaltitle": "File:Foo.jpg"
        })
    }

    fn reply(value: Value) -> Reply {
        Reply::try_from(value).unwrap()
    }

    #[test]
    fn without_thumburl_leaves_thumbnail_empty() {
        let info = ImageInfo::from_reply("File:Foo.jpg", &reply(info_json())).unwrap();
        assert_eq!(info.thumb_url, None);
        assert_eq!(info.thumb_dimensions, None);
        assert_eq!(info.redirects_to, None);
    }

    #[test]
    fn with_thumburl_populates_thumbnail() {
        let mut value = info_json();
        value["thumburl"] = json!("http://x/thumb.jpg");
        value["thumbwidth"] = json!(120);
        value["thumbheight"] = json!(90);
        let info = ImageInfo::from_reply("File:Foo.jpg", &reply(value)).unwrap();
        assert_eq!(info.thumb_url.unwrap().as_str(), "http://x/thumb.jpg");
        assert_eq!(info.thumb_dimensions, Some((120, 90)));
    }

    #[test]
    fn fields_match_direct_reply_accessors() {
        let r = reply(info_json());
        let info = ImageInfo::from_reply("File:Foo.jpg", &r).unwrap();
        assert_eq!(info.size, r.get_int_r("size").unwrap());
        assert_eq!(info.dimensions, (r.get_int_r("width").unwrap(), r.get_int_r("height").unwrap()));
        assert_eq!(info.user, r.get_string_r("user").unwrap());
        assert_eq!(info.comment, r.get_string_r("comment").unwrap());
        assert_eq!(info.sha1, r.get_string_r("sha1").unwrap());
        assert_eq!(info.mime, r.get_string_r("mime").unwrap());
        assert_eq!(info.url.as_str(), r.get_string_r("url").unwrap());
    }

    #[test]
    fn differing_canonical_title_is_a_redirect() {
        let info = ImageInfo::from_reply("File:Old.jpg", &reply(info_json())).unwrap();
        assert_eq!(info.redirects_to.as_deref(), Some("File:Foo.jpg"));
    }

    #[test]
    fn missing_required_field_fails_the_record() {
        let mut value = info_json();
        value.as_object_mut().unwrap().remove("sha1");
        let err = ImageInfo::from_reply("File:Foo.jpg", &reply(value)).unwrap_err();
        assert!(matches!(err, ApiError::MissingField { ref key } if key == "sha1"));
    }

    #[test]
    fn bad_timestamp_is_type_mismatch() {
        let mut value = info_json();
        value["timestamp"] = json!("yesterday");
        let err = ImageInfo::from_reply("File:Foo.jpg", &reply(value)).unwrap_err();
        assert!(matches!(err, ApiError::TypeMismatch { ref key, .. } if key == "timestamp"));
    }

    #[test]
    fn serializes_for_export() {
        let info = ImageInfo::from_reply("File:Foo.jpg", &reply(info_json())).unwrap();
        let out = serde_json::to_value(&info).unwrap();
        assert_eq!(out["size"], 1024);
        assert_eq!(out["url"], "https://upload.example.org/a/ab/Foo.jpg");
        assert_eq!(out["thumb_url"], Value::Null);
    }

    #[test]
    fn sorts_newest_first() {
        let mut older = info_json();
        older["timestamp"] = json!("2010-01-01T00:00:00Z");
        let mut infos =
            ImageInfo::make_image_infos("File:Foo.jpg", &[reply(older), reply(info_json())]).unwrap();
        infos.sort_by(ImageInfo::cmp_newest_first);
        assert_eq!(infos[0].timestamp.to_rfc3339(), "2016-03-04T05:06:07+00:00");
    }

    #[test]
    fn same_revision_under_two_titles_stays_distinct() {
        let a = ImageInfo::from_reply("File:A.jpg", &reply(info_json())).unwrap();
        let b = ImageInfo::from_reply("File:B.jpg", &reply(info_json())).unwrap();
        assert_ne!(a, b);
        let mut infos = vec![b.clone(), a.clone()];
        infos.sort_by(ImageInfo::cmp_newest_first);
        assert_eq!(infos, vec![b, a]);
    }
}
