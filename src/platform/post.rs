//! Post payload fetching and the raw Reddit data model

use crate::error::RrdError;
use crate::platform::auth::TokenManager;
use crate::platform::client::RedditClient;
use crate::utils::url::{extract_post_id, public_json_endpoint};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Authenticated API host
const API_BASE: &str = "https://oauth.reddit.com";

/// Listing envelope returned by both the info endpoint and the public
/// `.json` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thing {
    pub data: RawPost,
}

/// The subtree of a post payload the pipeline needs.
///
/// Reddit's JSON shapes are loosely specified; every field downstream code
/// touches is optional or defaulted so that odd posts deserialize rather
/// than abort.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default)]
    pub media: Option<PostMedia>,
    #[serde(default)]
    pub secure_media: Option<PostMedia>,
    #[serde(default)]
    pub crosspost_parent_list: Vec<CrosspostParent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostMedia {
    #[serde(default)]
    pub reddit_video: Option<RedditVideo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrosspostParent {
    #[serde(default)]
    pub media: Option<PostMedia>,
}

/// The video record embedded in a post's media object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedditVideo {
    #[serde(default)]
    pub fallback_url: Option<String>,
    #[serde(default)]
    pub dash_url: Option<String>,
    #[serde(default)]
    pub hls_url: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
}

/// Fetches the raw post payload for a URL.
///
/// Prefers the authenticated info endpoint and falls back to the public
/// per-post JSON endpoint when that path fails for any reason.
pub struct PostResolver {
    http: RedditClient,
    auth: Arc<TokenManager>,
    api_base: String,
}

impl PostResolver {
    /// Create a new resolver sharing the given client and token cache
    pub fn new(http: RedditClient, auth: Arc<TokenManager>) -> Self {
        Self {
            http,
            auth,
            api_base: API_BASE.to_string(),
        }
    }

    /// Override the authenticated API host
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Resolve a post URL into its raw payload
    pub async fn resolve(&self, url: &str) -> Result<RawPost, RrdError> {
        let post_id = extract_post_id(url)?;
        debug!("Resolving post {}", post_id);

        match self.fetch_authenticated(&post_id).await {
            Ok(post) => Ok(post),
            Err(e) => {
                warn!(
                    "Authenticated post fetch failed ({}), falling back to public API",
                    e
                );
                self.fetch_public(url).await
            }
        }
    }

    async fn fetch_authenticated(&self, post_id: &str) -> Result<RawPost, RrdError> {
        let info_url = format!("{}/api/info?id=t3_{}", self.api_base, post_id);
        let request = self
            .http
            .create_api_request(reqwest::Method::GET, &info_url);
        let response = self.auth.apply(request).await.send().await?;

        if !response.status().is_success() {
            return Err(RrdError::Generic(format!(
                "Info endpoint returned {}",
                response.status()
            )));
        }

        let listing: Listing = response.json().await?;
        first_post(vec![listing])
            .ok_or_else(|| RrdError::Generic("Info endpoint returned an empty listing".to_string()))
    }

    async fn fetch_public(&self, url: &str) -> Result<RawPost, RrdError> {
        let json_url = public_json_endpoint(url);
        debug!("Fetching public payload from {}", json_url);

        let response = self
            .http
            .create_api_request(reqwest::Method::GET, &json_url)
            .send()
            .await
            .map_err(|e| {
                RrdError::UpstreamUnavailable(format!("Public post fetch failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(RrdError::UpstreamUnavailable(format!(
                "Public post fetch returned {}",
                response.status()
            )));
        }

        let listings: Vec<Listing> = response.json().await.map_err(|e| {
            RrdError::UpstreamUnavailable(format!("Malformed public payload: {}", e))
        })?;

        first_post(listings).ok_or_else(|| {
            RrdError::UpstreamUnavailable("Public payload contained no post".to_string())
        })
    }
}

fn first_post(listings: Vec<Listing>) -> Option<RawPost> {
    listings
        .into_iter()
        .next()?
        .data
        .children
        .into_iter()
        .next()
        .map(|thing| thing.data)
}
