//! The download pipeline orchestrator

use crate::core::session::DownloadSession;
use crate::core::video_info::VideoInfo;
use crate::download::fetch::StreamDownloader;
use crate::download::merge::TrackMerger;
use crate::error::RrdError;
use crate::platform::audio::{audio_url_variants, AudioProbe};
use crate::platform::auth::{OauthConfig, TokenManager};
use crate::platform::client::{HttpClientConfig, RedditClient};
use crate::platform::manifest::ManifestSelector;
use crate::platform::media::locate_video;
use crate::platform::post::PostResolver;
use crate::utils::filename::output_filename;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Configuration for a [`RedditDownloader`]
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Directory holding the `temp/` and `files/` subdirectories
    pub base_dir: PathBuf,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// How long a merge may run before it is killed
    pub merge_timeout: Duration,
    /// The ffmpeg binary to invoke
    pub ffmpeg_binary: String,
    /// OAuth credentials; anonymous access is used when absent
    pub oauth: Option<OauthConfig>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            request_timeout: Duration::from_secs(30),
            merge_timeout: Duration::from_secs(300),
            ffmpeg_binary: "ffmpeg".to_string(),
            oauth: None,
        }
    }
}

impl DownloadOptions {
    pub fn with_base_dir(mut self, base_dir: &Path) -> Self {
        self.base_dir = base_dir.to_path_buf();
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_merge_timeout(mut self, merge_timeout: Duration) -> Self {
        self.merge_timeout = merge_timeout;
        self
    }

    pub fn with_ffmpeg_binary(mut self, binary: &str) -> Self {
        self.ffmpeg_binary = binary.to_string();
        self
    }

    pub fn with_oauth(mut self, oauth: OauthConfig) -> Self {
        self.oauth = Some(oauth);
        self
    }
}

/// Resolves a Reddit post URL into a finished local video file.
///
/// The pipeline: resolve the post payload, locate the video record, pick the
/// best streams from the DASH manifest, probe for audio, download, and merge.
/// Audio problems degrade the result to video-only; only the video track is
/// load-bearing.
pub struct RedditDownloader {
    options: DownloadOptions,
    auth: Arc<TokenManager>,
    resolver: PostResolver,
    manifest: ManifestSelector,
    audio: AudioProbe,
    fetcher: StreamDownloader,
    merger: TrackMerger,
    cancel: CancellationToken,
}

impl RedditDownloader {
    pub fn new(options: DownloadOptions) -> Self {
        let http = RedditClient::with_config(HttpClientConfig {
            timeout: options.request_timeout,
            ..Default::default()
        });
        let auth = Arc::new(TokenManager::new(http.clone(), options.oauth.clone()));
        let cancel = CancellationToken::new();

        Self {
            resolver: PostResolver::new(http.clone(), Arc::clone(&auth)),
            manifest: ManifestSelector::new(http.clone(), Arc::clone(&auth)),
            audio: AudioProbe::new(http.clone(), Arc::clone(&auth)),
            fetcher: StreamDownloader::new(http.clone(), Arc::clone(&auth))
                .with_cancellation(cancel.clone()),
            merger: TrackMerger::new()
                .with_binary(&options.ffmpeg_binary)
                .with_timeout(options.merge_timeout)
                .with_cancellation(cancel.clone()),
            auth,
            cancel,
            options,
        }
    }

    /// Route API traffic to a different host (proxies, testing)
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.resolver = self.resolver.with_api_base(base);
        self
    }

    /// Token for aborting in-flight downloads and merges
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The shared token cache, for credential checks
    pub fn token_manager(&self) -> Arc<TokenManager> {
        Arc::clone(&self.auth)
    }

    fn temp_dir(&self) -> PathBuf {
        self.options.base_dir.join("temp")
    }

    fn files_dir(&self) -> PathBuf {
        self.options.base_dir.join("files")
    }

    /// Download the video behind `url` into the files directory.
    ///
    /// Temp files are session-scoped and removed whether the pipeline
    /// succeeds or fails.
    pub async fn download(&self, url: &str) -> Result<VideoInfo, RrdError> {
        tokio::fs::create_dir_all(self.temp_dir()).await?;
        tokio::fs::create_dir_all(self.files_dir()).await?;

        let session = DownloadSession::new(&self.temp_dir());
        debug!("Starting session {}", session.id());
        let result = self.run(url, &session).await;
        session.cleanup().await;
        result
    }

    async fn run(&self, url: &str, session: &DownloadSession) -> Result<VideoInfo, RrdError> {
        if self.cancel.is_cancelled() {
            return Err(RrdError::Canceled);
        }

        let post = self.resolver.resolve(url).await?;
        let descriptor = locate_video(&post)?;

        let selection = match descriptor.manifest_url() {
            Some(manifest_url) => self.manifest.select_streams(&manifest_url, url).await,
            None => Default::default(),
        };

        let video_url = selection
            .video
            .map(|variant| variant.url)
            .or_else(|| descriptor.fallback_url.clone())
            .ok_or(RrdError::NoVideoFound)?;
        info!("Selected video track: {}", video_url);

        let mut audio_candidates: Vec<String> = Vec::new();
        if let Some(variant) = selection.audio {
            audio_candidates.push(variant.url);
        }
        if let Some(base) = descriptor.audio_base_url() {
            audio_candidates.extend(audio_url_variants(&base));
        }
        let audio_url = self.audio.find_working_audio(&audio_candidates, url).await;

        let filename = output_filename(&post.title);
        let output_path = self.files_dir().join(&filename);

        // The video track is load-bearing; a failure here fails the download
        let temp_video = session.temp_video_path();
        self.fetcher.fetch(&video_url, &temp_video, url).await?;

        // Audio failures degrade to video-only from here on
        let temp_audio = match &audio_url {
            Some(audio_url) => {
                let temp_audio = session.temp_audio_path();
                match self.fetcher.fetch(audio_url, &temp_audio, url).await {
                    Ok(_) => Some(temp_audio),
                    Err(RrdError::Canceled) => return Err(RrdError::Canceled),
                    Err(e) => {
                        warn!("Audio download failed ({}), keeping video only", e);
                        None
                    }
                }
            }
            None => None,
        };

        let has_audio = match temp_audio {
            Some(temp_audio) => {
                match self.merger.merge(&temp_video, &temp_audio, &output_path).await {
                    Ok(()) => true,
                    Err(e) if e.is_recoverable() => {
                        warn!("Merge failed ({}), keeping video only", e);
                        tokio::fs::copy(&temp_video, &output_path).await?;
                        false
                    }
                    Err(e) => return Err(e),
                }
            }
            None => {
                tokio::fs::copy(&temp_video, &output_path).await?;
                false
            }
        };

        info!("Saved {}", output_path.display());
        Ok(VideoInfo {
            source_video_url: video_url.clone(),
            has_audio,
            title: post.title,
            is_mp4: video_url.split('?').next().unwrap_or("").ends_with(".mp4"),
            thumbnail_url: post.thumbnail.filter(|t| t.starts_with("http")),
            post_url: url.to_string(),
            duration: descriptor.duration,
            file_path: Some(format!("files/{}", filename)),
        })
    }
}
