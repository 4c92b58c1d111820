//! Merging video and audio tracks with ffmpeg

use crate::error::RrdError;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const DEFAULT_FFMPEG: &str = "ffmpeg";
const DEFAULT_MERGE_TIMEOUT: Duration = Duration::from_secs(300);

/// How many stderr bytes to keep in a merge error
const STDERR_SNIPPET_LEN: usize = 512;

/// Runs ffmpeg to mux a video track and an audio track into one file.
///
/// The video stream is copied as-is; only the audio is re-encoded to AAC so
/// the result plays everywhere.
pub struct TrackMerger {
    binary: String,
    merge_timeout: Duration,
    cancel: CancellationToken,
}

impl Default for TrackMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackMerger {
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_FFMPEG.to_string(),
            merge_timeout: DEFAULT_MERGE_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    /// Override the ffmpeg binary path
    pub fn with_binary(mut self, binary: &str) -> Self {
        self.binary = binary.to_string();
        self
    }

    /// Cap how long a merge may run
    pub fn with_timeout(mut self, merge_timeout: Duration) -> Self {
        self.merge_timeout = merge_timeout;
        self
    }

    /// Tie the merge to an external cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Merge `video` and `audio` into `output`, overwriting any existing file
    pub async fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), RrdError> {
        info!("Merging tracks into {}", output.display());

        let mut command = Command::new(&self.binary);
        command
            .kill_on_drop(true)
            .arg("-y")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .args(["-c:v", "copy"])
            .args(["-c:a", "aac"])
            .args(["-map", "0:v:0"])
            .args(["-map", "1:a:0"])
            .arg("-shortest")
            .arg(output);

        let run = timeout(self.merge_timeout, command.output());
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(RrdError::Canceled),
            result = run => result,
        };

        let output_data = match result {
            Ok(Ok(output_data)) => output_data,
            Ok(Err(e)) => {
                return Err(RrdError::MergeFailed(format!(
                    "Failed to run {}: {}",
                    self.binary, e
                )))
            }
            Err(_) => {
                return Err(RrdError::MergeFailed(format!(
                    "Merge timed out after {:?}",
                    self.merge_timeout
                )))
            }
        };

        if !output_data.status.success() {
            let stderr = String::from_utf8_lossy(&output_data.stderr);
            let snippet: String = stderr.chars().take(STDERR_SNIPPET_LEN).collect();
            return Err(RrdError::MergeFailed(format!(
                "ffmpeg exited with {}: {}",
                output_data.status,
                snippet.trim()
            )));
        }

        debug!("Merge complete");
        Ok(())
    }
}
