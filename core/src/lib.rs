//! Query/reply core for a wiki's HTTP `api.php`.
//!
//! # Overview
//! Builds request URLs and unwraps JSON replies into typed values without
//! touching the network (host-does-IO pattern). The caller executes the HTTP
//! round trip and drives pagination.
//!
//! # Design
//! - `UrlBuilder` owns one query's parameter set and re-renders it on demand,
//!   so only the continuation token needs changing between rounds.
//! - `Reply` wraps one decoded response object; `*_r` accessors fail on
//!   missing or mistyped fields, plain accessors return `Option`.
//! - `RSet` collects the replies of a paginated query and extracts across
//!   them, skipping malformed elements.
//! - `WikiClient` ties these to the endpoint convention in `ApiConfig` and
//!   maps replies to records such as `ImageInfo`.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod reply;
pub mod rset;
pub mod types;
pub mod url_builder;

pub use client::{QueryPage, WikiClient};
pub use config::ApiConfig;
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse};
pub use reply::Reply;
pub use rset::RSet;
pub use types::ImageInfo;
pub use url_builder::UrlBuilder;
