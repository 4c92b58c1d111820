//! Per-download temp file lifecycle

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Temp files for one download, named under a fresh session ID so concurrent
/// downloads never collide.
#[derive(Debug, Clone)]
pub struct DownloadSession {
    id: String,
    temp_dir: PathBuf,
}

impl DownloadSession {
    pub fn new(temp_dir: &Path) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            temp_dir: temp_dir.to_path_buf(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where the video track is staged
    pub fn temp_video_path(&self) -> PathBuf {
        self.temp_dir.join(format!("video_{}.mp4", self.id))
    }

    /// Where the audio track is staged
    pub fn temp_audio_path(&self) -> PathBuf {
        self.temp_dir.join(format!("audio_{}.mp4", self.id))
    }

    /// Remove this session's temp files.
    ///
    /// Runs on both success and failure paths; removal errors are logged and
    /// swallowed since a leftover temp file must never mask the download's
    /// real outcome.
    pub async fn cleanup(&self) {
        for path in [self.temp_video_path(), self.temp_audio_path()] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!("Removed temp file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove temp file {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_get_unique_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = DownloadSession::new(dir.path());
        let b = DownloadSession::new(dir.path());
        assert_ne!(a.temp_video_path(), b.temp_video_path());
        assert_ne!(a.temp_video_path(), a.temp_audio_path());
    }

    #[tokio::test]
    async fn test_cleanup_removes_both_tracks() {
        let dir = tempfile::tempdir().unwrap();
        let session = DownloadSession::new(dir.path());
        std::fs::write(session.temp_video_path(), b"v").unwrap();
        std::fs::write(session.temp_audio_path(), b"a").unwrap();

        session.cleanup().await;

        assert!(!session.temp_video_path().exists());
        assert!(!session.temp_audio_path().exists());
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let session = DownloadSession::new(dir.path());
        session.cleanup().await;
    }
}
