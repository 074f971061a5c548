//! Endpoint convention shared by every request to a wiki.

/// Protocol prefix and API script path used to build request URLs.
///
/// Passed explicitly into `UrlBuilder` and `WikiClient` instead of living in
/// a global, so tests can point at a plain-HTTP local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub protocol: String,
    pub api_path: String,
    /// Sent as `user-agent` on every request built by `WikiClient`.
    pub user_agent: String,
}

impl ApiConfig {
    pub fn with_protocol(protocol: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            ..Self::default()
        }
    }

    /// `<protocol><domain><api_path>`, e.g. `https://commons.wikimedia.org/w/api.php`.
    pub fn endpoint(&self, domain: &str) -> String {
        format!("{}{}{}", self.protocol, domain, self.api_path)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            protocol: "https://".to_string(),
            api_path: "/w/api.php".to_string(),
            user_agent: concat!("wiki-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
