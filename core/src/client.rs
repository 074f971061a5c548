//! Stateless request builder and response parser for a wiki's `api.php`.
//!
//! # Design
//! `WikiClient` holds only the endpoint convention and the domain. Queries
//! are prepared as `UrlBuilder`s (so the caller can add continuation
//! parameters between rounds), turned into `HttpRequest`s by
//! `build_request`, and the caller's `HttpResponse` comes back through
//! `parse_*`. The caller owns the pagination loop:
//!
//! ```text
//! let mut builder = client.category_members("Category:Foo");
//! let mut pages = RSet::new();
//! loop {
//!     let page = client.parse_query(execute(client.build_request(&builder)?))?;
//!     pages.push(page.query);
//!     match page.continuation {
//!         Some(params) => builder.set_params(params),
//!         None => break,
//!     }
//! }
//! let titles = client.category_member_titles(&pages);
//! ```

use std::collections::BTreeMap;

use serde_json::Map;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::reply::Reply;
use crate::rset::RSet;
use crate::types::ImageInfo;
use crate::url_builder::UrlBuilder;

/// One page of an `action=query` result.
#[derive(Debug, Clone)]
pub struct QueryPage {
    /// The reply's `query` object, or an empty reply when the server sent
    /// none (e.g. an empty category).
    pub query: Reply,
    /// Parameters for the next round; `None` once the listing is complete.
    pub continuation: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct WikiClient {
    config: ApiConfig,
    domain: String,
}

impl WikiClient {
    pub fn new(config: ApiConfig, domain: &str) -> Self {
        Self {
            config,
            domain: domain.trim_end_matches('/').to_string(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn url_builder<K, V>(&self, action: &str, params: impl IntoIterator<Item = (K, V)>) -> UrlBuilder
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        UrlBuilder::new(&self.config, &self.domain, action, params)
    }

    pub fn query<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> UrlBuilder
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        self.url_builder("query", params)
    }

    /// All members of `category` (full title, e.g. `Category:Foo`).
    pub fn category_members(&self, category: &str) -> UrlBuilder {
        self.query([
            ("list", "categorymembers"),
            ("cmtitle", category),
            ("cmlimit", "max"),
        ])
    }

    /// The wiki's namespace table.
    pub fn namespaces(&self) -> UrlBuilder {
        self.query([("meta", "siteinfo"), ("siprop", "namespaces")])
    }

    /// Every revision of the file `title`, with the properties `ImageInfo`
    /// requires.
    pub fn image_info(&self, title: &str) -> UrlBuilder {
        self.query([
            ("prop", "imageinfo"),
            ("iiprop", "canonicaltitle|url|size|sha1|mime|user|timestamp|comment"),
            ("iilimit", "max"),
            ("titles", title),
        ])
    }

    pub fn build_request(&self, builder: &UrlBuilder) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            url: builder.render()?,
            headers: vec![
                ("accept".to_string(), "application/json".to_string()),
                ("user-agent".to_string(), self.config.user_agent.clone()),
            ],
        })
    }

    pub fn parse_reply(&self, response: HttpResponse) -> Result<Reply, ApiError> {
        check_status(&response)?;
        Reply::from_body(&response.body)
    }

    pub fn parse_query(&self, response: HttpResponse) -> Result<QueryPage, ApiError> {
        let reply = self.parse_reply(response)?;
        Ok(QueryPage {
            query: reply.get_object("query").unwrap_or_else(|| Reply::new(Map::new())),
            continuation: reply.continuation(),
        })
    }

    /// Titles from the `query` objects of a `category_members` listing.
    pub fn category_member_titles(&self, pages: &RSet) -> Vec<String> {
        pages.string_from_ja_of_jo("categorymembers", "title")
    }

    /// `(id, name)` pairs from the `query` objects of a `namespaces` request.
    pub fn namespace_table(&self, pages: &RSet) -> Vec<(i64, String)> {
        pages.int_string_from_jo("namespaces", "id", "*")
    }

    /// `ImageInfo` records from the `query` objects of an `image_info`
    /// request, newest first.
    pub fn image_infos(&self, title: &str, pages: &RSet) -> Result<Vec<ImageInfo>, ApiError> {
        let revisions = pages.get_jo_of_ja_in_jo("pages", "imageinfo");
        let mut infos = ImageInfo::make_image_infos(title, &revisions)?;
        infos.sort_by(ImageInfo::cmp_newest_first);
        Ok(infos)
    }
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
