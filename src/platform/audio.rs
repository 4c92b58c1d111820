//! Probing for a working audio track

use crate::platform::auth::TokenManager;
use crate::platform::client::RedditClient;
use std::sync::Arc;
use tracing::{debug, info};

/// Audio URL naming conventions observed on the media host, tried after the
/// manifest-selected URL. Order matters: the standard name first.
const AUDIO_SUFFIXES: [&str; 5] = [
    "DASH_audio.mp4",
    "audio",
    "DASH_audio",
    "DASH_AUDIO_128.mp4",
    "DASH_AUDIO_64.mp4",
];

/// Derive heuristic audio URL candidates from the video's base URL
pub fn audio_url_variants(base_url: &str) -> Vec<String> {
    AUDIO_SUFFIXES
        .iter()
        .map(|suffix| format!("{}{}", base_url, suffix))
        .collect()
}

/// Finds the first audio candidate that actually exists.
///
/// Candidates are checked one at a time so the first success short-circuits
/// the rest; the media host rate-limits, so fewer requests beat lower
/// latency here.
pub struct AudioProbe {
    http: RedditClient,
    auth: Arc<TokenManager>,
}

impl AudioProbe {
    pub fn new(http: RedditClient, auth: Arc<TokenManager>) -> Self {
        Self { http, auth }
    }

    /// Return the first candidate URL that responds successfully to a HEAD
    /// check, or `None` when all fail. Exhausting the list is not an error:
    /// silent video posts have no audio track at all.
    pub async fn find_working_audio(
        &self,
        candidates: &[String],
        referer: &str,
    ) -> Option<String> {
        for url in candidates {
            debug!("Trying audio URL: {}", url);

            let request = self
                .http
                .create_media_request(reqwest::Method::HEAD, url, referer);
            let response = match self.auth.apply(request).await.send().await {
                Ok(response) => response,
                Err(e) => {
                    debug!("Audio URL failed: {} ({})", url, e);
                    continue;
                }
            };

            if response.status().is_success() {
                info!("Found working audio URL: {}", url);
                return Some(url.clone());
            }
            debug!("Audio URL failed: {} ({})", url, response.status());
        }

        info!("No audio track available");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe() -> AudioProbe {
        let http = RedditClient::new();
        let auth = Arc::new(TokenManager::new(http.clone(), None));
        AudioProbe::new(http, auth)
    }

    #[test]
    fn test_audio_url_variants_order() {
        let variants = audio_url_variants("https://v.redd.it/abc/");
        assert_eq!(variants[0], "https://v.redd.it/abc/DASH_audio.mp4");
        assert_eq!(variants[1], "https://v.redd.it/abc/audio");
        assert_eq!(variants.len(), 5);
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("HEAD", "/a1")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("HEAD", "/a2")
            .with_status(403)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("HEAD", "/a3")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        let later_a4 = server
            .mock("HEAD", "/a4")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;
        let later_a5 = server
            .mock("HEAD", "/a5")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let probe = probe();
        let candidates: Vec<String> = (1..=5).map(|i| format!("{}/a{}", server.url(), i)).collect();

        let found = probe
            .find_working_audio(&candidates, "https://r/")
            .await
            .unwrap();
        assert_eq!(found, format!("{}/a3", server.url()));

        later_a4.assert_async().await;
        later_a5.assert_async().await;
    }

    #[tokio::test]
    async fn test_all_failing_candidates_is_none() {
        let mut server = mockito::Server::new_async().await;
        for path in ["/b1", "/b2", "/b3"] {
            server
                .mock("HEAD", path)
                .with_status(404)
                .create_async()
                .await;
        }

        let probe = probe();
        let candidates: Vec<String> = ["b1", "b2", "b3"]
            .iter()
            .map(|p| format!("{}/{}", server.url(), p))
            .collect();

        assert!(probe
            .find_working_audio(&candidates, "https://r/")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let probe = probe();
        assert!(probe.find_working_audio(&[], "https://r/").await.is_none());
    }
}
