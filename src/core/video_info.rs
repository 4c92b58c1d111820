//! The result record describing a completed download

use serde::Serialize;

/// What the pipeline learned and produced for one post.
///
/// `file_path` is relative to the configured base directory so the record
/// stays valid if the base directory is moved or served from elsewhere.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VideoInfo {
    /// The source video track URL that was downloaded
    pub source_video_url: String,
    /// Whether an audio track was found and merged in
    pub has_audio: bool,
    /// The post title, as Reddit reported it
    pub title: String,
    /// Whether the source track was an mp4
    pub is_mp4: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// The post URL the download was requested with
    pub post_url: String,
    /// Duration in seconds, when the payload declared one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Relative path of the finished file, e.g. `files/my_video.mp4`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_without_absent_fields() {
        let info = VideoInfo {
            source_video_url: "https://v.redd.it/a/DASH_720.mp4".to_string(),
            has_audio: true,
            title: "a title".to_string(),
            is_mp4: true,
            post_url: "https://www.reddit.com/r/v/comments/abc/t/".to_string(),
            file_path: Some("files/a_title.mp4".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["file_path"], "files/a_title.mp4");
        assert!(json.get("duration").is_none());
        assert!(json.get("thumbnail_url").is_none());
    }
}
