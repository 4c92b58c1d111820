//! HTTP client for Reddit API and media requests

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// User agent attached to every request; Reddit rejects blank agents
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Origin sent with media requests; some CDN paths reject requests without it
pub const REDDIT_ORIGIN: &str = "https://www.reddit.com";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent string override
    pub user_agent: Option<String>,
    /// Origin header for media requests
    pub origin: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: None,
            origin: REDDIT_ORIGIN.to_string(),
        }
    }
}

/// Reddit HTTP client
///
/// Wraps one shared `reqwest::Client` and knows which headers the API and
/// media hosts expect. Authorization is attached by the caller via
/// [`crate::platform::auth::TokenManager`].
#[derive(Clone)]
pub struct RedditClient {
    client: Client,
    config: HttpClientConfig,
}

impl RedditClient {
    /// Create a new Reddit client with default configuration
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new Reddit client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Self {
        let mut builder = ClientBuilder::new()
            .timeout(config.timeout)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        } else {
            builder = builder.user_agent(USER_AGENT);
        }

        let client = builder.build().expect("Failed to build HTTP client");

        Self { client, config }
    }

    /// Get the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Create a request against the Reddit JSON API
    pub fn create_api_request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Accept", "application/json")
    }

    /// Create a request against a media host.
    ///
    /// The referer is the originating post URL; the media CDN rejects some
    /// requests lacking Referer or Origin.
    pub fn create_media_request(
        &self,
        method: reqwest::Method,
        url: &str,
        referer: &str,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Accept", "*/*")
            .header("Referer", referer)
            .header("Origin", self.config.origin.as_str())
    }
}

impl Default for RedditClient {
    fn default() -> Self {
        Self::new()
    }
}
