//! Streaming media downloads

use crate::error::RrdError;
use crate::platform::auth::TokenManager;
use crate::platform::client::RedditClient;
use futures_util::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Streams a media URL to a local file.
///
/// The body is written chunk by chunk rather than buffered; video tracks can
/// run to hundreds of megabytes.
pub struct StreamDownloader {
    http: RedditClient,
    auth: Arc<TokenManager>,
    cancel: CancellationToken,
}

impl StreamDownloader {
    pub fn new(http: RedditClient, auth: Arc<TokenManager>) -> Self {
        Self {
            http,
            auth,
            cancel: CancellationToken::new(),
        }
    }

    /// Tie downloads to an external cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Download `url` into `dest`, returning the number of bytes written.
    ///
    /// A partial file is removed on any failure so callers never see a
    /// truncated track at `dest`.
    pub async fn fetch(&self, url: &str, dest: &Path, referer: &str) -> Result<u64, RrdError> {
        info!("Downloading {}", url);

        let request = self
            .http
            .create_media_request(reqwest::Method::GET, url, referer);
        let response = self
            .auth
            .apply(request)
            .await
            .send()
            .await
            .map_err(|e| RrdError::DownloadFailed(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(RrdError::DownloadFailed(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        match self.write_stream(response, dest).await {
            Ok(written) => {
                debug!("Wrote {} bytes to {}", written, dest.display());
                Ok(written)
            }
            Err(e) => {
                warn!("Download of {} failed ({}), removing partial file", url, e);
                let _ = tokio::fs::remove_file(dest).await;
                Err(e)
            }
        }
    }

    async fn write_stream(
        &self,
        response: reqwest::Response,
        dest: &Path,
    ) -> Result<u64, RrdError> {
        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        loop {
            let chunk = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(RrdError::Canceled),
                chunk = stream.next() => chunk,
            };

            match chunk {
                Some(Ok(bytes)) => {
                    file.write_all(&bytes).await?;
                    written += bytes.len() as u64;
                }
                Some(Err(e)) => {
                    return Err(RrdError::DownloadFailed(format!("Stream error: {}", e)))
                }
                None => break,
            }
        }

        file.flush().await?;
        Ok(written)
    }
}
