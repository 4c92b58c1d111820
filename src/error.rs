//! Error types for rrd

use thiserror::Error;

/// Main error type for rrd operations
#[derive(Debug, Error)]
pub enum RrdError {
    #[error("Invalid post URL: {0}")]
    InvalidUrl(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("No video found in this post")]
    NoVideoFound,

    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Merge failed: {0}")]
    MergeFailed(String),

    #[error("Operation canceled")]
    Canceled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl RrdError {
    /// HTTP-style status classification for the transport layer.
    ///
    /// Client errors (bad input, nothing to download) map to 4xx, everything
    /// that went wrong on our side or upstream maps to 5xx.
    pub fn status_code(&self) -> u16 {
        match self {
            RrdError::InvalidUrl(_) => 400,
            RrdError::NoVideoFound => 404,
            RrdError::AuthFailure(_) => 401,
            RrdError::UpstreamUnavailable(_) => 502,
            _ => 500,
        }
    }

    /// Check whether this error is absorbed by the pipeline rather than
    /// surfaced to the caller (see the degrade policy in the orchestrator).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RrdError::AuthFailure(_) | RrdError::MergeFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(RrdError::InvalidUrl("x".into()).status_code(), 400);
        assert_eq!(RrdError::NoVideoFound.status_code(), 404);
        assert_eq!(
            RrdError::UpstreamUnavailable("down".into()).status_code(),
            502
        );
        assert_eq!(RrdError::DownloadFailed("disk".into()).status_code(), 500);
        assert_eq!(RrdError::MergeFailed("ffmpeg".into()).status_code(), 500);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(RrdError::AuthFailure("denied".into()).is_recoverable());
        assert!(RrdError::MergeFailed("exit 1".into()).is_recoverable());
        assert!(!RrdError::NoVideoFound.is_recoverable());
        assert!(!RrdError::DownloadFailed("403".into()).is_recoverable());
    }
}
