//! URL utilities for extracting post IDs and deriving Reddit endpoints

use crate::error::RrdError;
use url::Url;

/// Extract the post ID from various Reddit URL formats.
///
/// Supports the canonical comments path and the short-link form:
/// - `https://www.reddit.com/r/<subreddit>/comments/<id>/<slug>/`
/// - `https://redd.it/<id>`
pub fn extract_post_id(url: &str) -> Result<String, RrdError> {
    let parsed = Url::parse(url)?;

    let host = parsed
        .host_str()
        .ok_or_else(|| RrdError::InvalidUrl("Missing host".to_string()))?;

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    if host == "redd.it" {
        // Short links carry the ID as the only path segment
        return segments
            .first()
            .map(|id| id.to_string())
            .ok_or_else(|| RrdError::InvalidUrl("Missing post ID in short link".to_string()));
    }

    // Canonical form: the ID follows the "comments" segment
    for window in segments.windows(2) {
        if window[0] == "comments" {
            return Ok(window[1].to_string());
        }
    }

    Err(RrdError::InvalidUrl(
        "Could not extract post ID from URL".to_string(),
    ))
}

/// Derive the public JSON endpoint for a post URL.
///
/// The query string is dropped first; the `.json` suffix placement depends on
/// whether the path already ends with a slash.
pub fn public_json_endpoint(url: &str) -> String {
    let base = url.split('?').next().unwrap_or(url);
    if base.ends_with('/') {
        format!("{}.json", base)
    } else {
        format!("{}/.json", base)
    }
}

/// Check if a URL points at Reddit at all (used by callers to route
/// non-Reddit URLs to generic extractors)
pub fn is_reddit_url(url: &str) -> bool {
    if let Ok(parsed) = Url::parse(url) {
        match parsed.host_str() {
            Some("redd.it") => true,
            Some(host) => host == "reddit.com" || host.ends_with(".reddit.com"),
            None => false,
        }
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_post_id_canonical() {
        assert_eq!(
            extract_post_id("https://www.reddit.com/r/videos/comments/abc123/some_title/").unwrap(),
            "abc123"
        );
        assert_eq!(
            extract_post_id("https://old.reddit.com/r/videos/comments/xyz9/t").unwrap(),
            "xyz9"
        );
        assert_eq!(
            extract_post_id("https://reddit.com/r/videos/comments/abc123").unwrap(),
            "abc123"
        );
    }

    #[test]
    fn test_extract_post_id_short_link() {
        assert_eq!(
            extract_post_id("https://redd.it/abc123").unwrap(),
            "abc123"
        );
        assert!(extract_post_id("https://redd.it/").is_err());
    }

    #[test]
    fn test_extract_post_id_with_query() {
        assert_eq!(
            extract_post_id(
                "https://www.reddit.com/r/videos/comments/abc123/title/?utm_source=share"
            )
            .unwrap(),
            "abc123"
        );
    }

    #[test]
    fn test_extract_post_id_errors() {
        assert!(extract_post_id("https://www.reddit.com/r/videos/").is_err());
        assert!(extract_post_id("https://www.reddit.com/r/videos/comments/").is_err());
        assert!(extract_post_id("not-a-url").is_err());
    }

    #[test]
    fn test_public_json_endpoint() {
        assert_eq!(
            public_json_endpoint("https://www.reddit.com/r/v/comments/abc/t"),
            "https://www.reddit.com/r/v/comments/abc/t/.json"
        );
        assert_eq!(
            public_json_endpoint("https://www.reddit.com/r/v/comments/abc/t/"),
            "https://www.reddit.com/r/v/comments/abc/t/.json"
        );
        assert_eq!(
            public_json_endpoint("https://www.reddit.com/r/v/comments/abc/t?share=1"),
            "https://www.reddit.com/r/v/comments/abc/t/.json"
        );
    }

    #[test]
    fn test_is_reddit_url() {
        assert!(is_reddit_url("https://www.reddit.com/r/videos/comments/a/b"));
        assert!(is_reddit_url("https://redd.it/abc123"));
        assert!(!is_reddit_url("https://example.com/watch?v=abc"));
        assert!(!is_reddit_url("not-a-url"));
    }
}
