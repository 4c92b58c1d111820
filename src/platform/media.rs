//! Locating the video record inside heterogeneous post payloads

use crate::error::RrdError;
use crate::platform::post::{RawPost, RedditVideo};

/// The URLs extracted from whichever payload location held the video record
#[derive(Debug, Clone, Default)]
pub struct VideoDescriptor {
    pub fallback_url: Option<String>,
    pub dash_url: Option<String>,
    pub hls_url: Option<String>,
    pub duration: Option<u32>,
}

impl VideoDescriptor {
    fn from_video(video: &RedditVideo) -> Self {
        Self {
            fallback_url: video.fallback_url.clone(),
            dash_url: video.dash_url.clone(),
            hls_url: video.hls_url.clone(),
            duration: video.duration,
        }
    }

    /// The DASH manifest URL, derived heuristically from the fallback URL's
    /// naming convention when the payload omits it
    /// (`…/DASH_720.mp4` → `…/DASHPlaylist.mpd`).
    pub fn manifest_url(&self) -> Option<String> {
        if let Some(dash_url) = &self.dash_url {
            return Some(dash_url.clone());
        }
        let fallback = self.fallback_url.as_deref()?;
        fallback
            .split_once("DASH_")
            .map(|(base, _)| format!("{}DASHPlaylist.mpd", base))
    }

    /// The base URL audio variants are derived from
    /// (`…/DASH_720.mp4` → `…/`)
    pub fn audio_base_url(&self) -> Option<String> {
        let fallback = self.fallback_url.as_deref()?;
        fallback
            .split_once("DASH_")
            .map(|(base, _)| base.to_string())
    }
}

/// One place a video record may live inside a post payload
type LocateStrategy = fn(&RawPost) -> Option<&RedditVideo>;

fn direct_media(post: &RawPost) -> Option<&RedditVideo> {
    post.media.as_ref()?.reddit_video.as_ref()
}

fn secure_media(post: &RawPost) -> Option<&RedditVideo> {
    post.secure_media.as_ref()?.reddit_video.as_ref()
}

fn crosspost_parent(post: &RawPost) -> Option<&RedditVideo> {
    post.crosspost_parent_list
        .first()?
        .media
        .as_ref()?
        .reddit_video
        .as_ref()
}

/// Checked in priority order; a crosspost defers to media present directly
/// on the post.
const STRATEGIES: [LocateStrategy; 3] = [direct_media, secure_media, crosspost_parent];

/// Find the video record in a post payload, checking the known locations in
/// priority order. The first match wins.
pub fn locate_video(post: &RawPost) -> Result<VideoDescriptor, RrdError> {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(post))
        .map(VideoDescriptor::from_video)
        .ok_or(RrdError::NoVideoFound)
}
