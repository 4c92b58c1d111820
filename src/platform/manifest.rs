//! DASH manifest parsing and best-quality stream selection

use crate::error::RrdError;
use crate::platform::auth::TokenManager;
use crate::platform::client::RedditClient;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Entries at or below this declared bandwidth are never classified as video.
///
/// Heuristic carried over for compatibility: together with the codec
/// substring check it can misclassify low-bitrate video or atypically coded
/// audio.
const VIDEO_BANDWIDTH_FLOOR: u64 = 100_000;

/// One selected representation out of the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamVariant {
    pub bandwidth: u64,
    pub url: String,
    pub resolution: Option<(u32, u32)>,
}

/// The best video and audio representations found in a manifest.
///
/// Either side may be absent; an entirely empty selection tells the caller
/// to fall back to the descriptor's plain fallback URL.
#[derive(Debug, Clone, Default)]
pub struct ManifestSelection {
    pub video: Option<StreamVariant>,
    pub audio: Option<StreamVariant>,
}

impl ManifestSelection {
    pub fn is_empty(&self) -> bool {
        self.video.is_none() && self.audio.is_none()
    }
}

/// One `Representation` element as parsed from the MPD
#[derive(Debug, Clone, Default)]
struct Representation {
    bandwidth: u64,
    codecs: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    base_url: Option<String>,
}

impl Representation {
    /// Bandwidth-plus-codec classification of video vs audio entries
    fn is_video(&self) -> bool {
        if self.bandwidth <= VIDEO_BANDWIDTH_FLOOR {
            return false;
        }
        match &self.codecs {
            Some(codecs) => codecs.contains("avc") || !codecs.contains("mp4a"),
            None => true,
        }
    }
}

/// Parse `Representation` elements out of a DASH MPD document
fn parse_representations(xml: &str) -> Result<Vec<Representation>, RrdError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut representations = Vec::new();
    let mut current: Option<Representation> = None;
    let mut in_base_url = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"Representation" => {
                let mut rep = Representation::default();
                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map_err(|e| RrdError::Generic(format!("Bad MPD attribute: {}", e)))?
                        .into_owned();
                    match attr.key.as_ref() {
                        b"bandwidth" => rep.bandwidth = value.parse().unwrap_or(0),
                        b"codecs" => rep.codecs = Some(value),
                        b"width" => rep.width = value.parse().ok(),
                        b"height" => rep.height = value.parse().ok(),
                        _ => {}
                    }
                }
                current = Some(rep);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"Representation" => {
                if let Some(rep) = current.take() {
                    representations.push(rep);
                }
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"Representation" => {
                // Self-closing representation, carries no BaseURL child
                let mut rep = Representation::default();
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"bandwidth" {
                        if let Ok(value) = attr.unescape_value() {
                            rep.bandwidth = value.parse().unwrap_or(0);
                        }
                    }
                }
                representations.push(rep);
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"BaseURL" => {
                in_base_url = current.is_some();
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"BaseURL" => {
                in_base_url = false;
            }
            Ok(Event::Text(t)) if in_base_url => {
                if let Some(rep) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| RrdError::Generic(format!("Bad MPD text: {}", e)))?;
                    rep.base_url = Some(text.into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(RrdError::Generic(format!("MPD parse error: {}", e))),
        }
    }

    Ok(representations)
}

/// Pick the maximum-bandwidth representation per class.
///
/// Strictly-greater comparison: ties keep the first-seen entry. Relative
/// URLs are resolved against the manifest's own fetch URL.
fn select_best(representations: Vec<Representation>, manifest_url: &str) -> ManifestSelection {
    let base = Url::parse(manifest_url).ok();
    let mut selection = ManifestSelection::default();

    for rep in representations {
        let Some(raw_url) = rep.base_url.as_deref() else {
            continue;
        };
        let resolved = resolve_url(base.as_ref(), raw_url);

        if rep.is_video() {
            if selection
                .video
                .as_ref()
                .map_or(true, |best| rep.bandwidth > best.bandwidth)
            {
                selection.video = Some(StreamVariant {
                    bandwidth: rep.bandwidth,
                    url: resolved,
                    resolution: rep.width.zip(rep.height),
                });
            }
        } else if selection
            .audio
            .as_ref()
            .map_or(true, |best| rep.bandwidth > best.bandwidth)
        {
            selection.audio = Some(StreamVariant {
                bandwidth: rep.bandwidth,
                url: resolved,
                resolution: None,
            });
        }
    }

    selection
}

fn resolve_url(base: Option<&Url>, raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return raw.to_string();
    }
    match base.and_then(|b| b.join(raw).ok()) {
        Some(joined) => joined.to_string(),
        None => raw.to_string(),
    }
}

/// Fetches a streaming manifest and selects the best representations.
///
/// Total by contract: any fetch or parse error yields an empty selection,
/// signaling the caller to fall back to the plain fallback URL.
pub struct ManifestSelector {
    http: RedditClient,
    auth: Arc<TokenManager>,
}

impl ManifestSelector {
    pub fn new(http: RedditClient, auth: Arc<TokenManager>) -> Self {
        Self { http, auth }
    }

    /// Fetch the manifest and return the best video/audio representations
    pub async fn select_streams(&self, manifest_url: &str, referer: &str) -> ManifestSelection {
        debug!("Analyzing DASH manifest at {}", manifest_url);

        let content = match self.fetch_manifest(manifest_url, referer).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Manifest fetch failed: {}", e);
                return ManifestSelection::default();
            }
        };

        match parse_representations(&content) {
            Ok(representations) => {
                let selection = select_best(representations, manifest_url);
                debug!(
                    "Manifest selection: video={:?} audio={:?}",
                    selection.video.as_ref().map(|v| v.bandwidth),
                    selection.audio.as_ref().map(|a| a.bandwidth)
                );
                selection
            }
            Err(e) => {
                warn!("Manifest parse failed: {}", e);
                ManifestSelection::default()
            }
        }
    }

    async fn fetch_manifest(&self, manifest_url: &str, referer: &str) -> Result<String, RrdError> {
        let request = self
            .http
            .create_media_request(reqwest::Method::GET, manifest_url, referer);
        let response = self.auth.apply(request).await.send().await?;

        if !response.status().is_success() {
            return Err(RrdError::Generic(format!(
                "Manifest fetch returned {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST_URL: &str = "https://v.redd.it/abc/DASHPlaylist.mpd";

    fn sample_mpd() -> &'static str {
        r#"<?xml version="1.0"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" type="static">
  <Period>
    <AdaptationSet contentType="video">
      <Representation id="v1" bandwidth="500000" codecs="avc1.4d401e" width="640" height="360">
        <BaseURL>DASH_360.mp4</BaseURL>
      </Representation>
      <Representation id="v2" bandwidth="1200000" codecs="avc1.4d401f" width="1280" height="720">
        <BaseURL>DASH_720.mp4</BaseURL>
      </Representation>
    </AdaptationSet>
    <AdaptationSet contentType="audio">
      <Representation id="a1" bandwidth="300000" codecs="mp4a.40.2">
        <BaseURL>DASH_AUDIO_64.mp4</BaseURL>
      </Representation>
      <Representation id="a2" bandwidth="900000" codecs="mp4a.40.2">
        <BaseURL>DASH_AUDIO_128.mp4</BaseURL>
      </Representation>
    </AdaptationSet>
  </Period>
</MPD>"#
    }

    #[test]
    fn test_selects_highest_bandwidth_per_class() {
        let reps = parse_representations(sample_mpd()).unwrap();
        assert_eq!(reps.len(), 4);

        let selection = select_best(reps, MANIFEST_URL);
        let video = selection.video.unwrap();
        let audio = selection.audio.unwrap();

        assert_eq!(video.bandwidth, 1_200_000);
        assert_eq!(video.url, "https://v.redd.it/abc/DASH_720.mp4");
        assert_eq!(video.resolution, Some((1280, 720)));
        assert_eq!(audio.bandwidth, 900_000);
        assert_eq!(audio.url, "https://v.redd.it/abc/DASH_AUDIO_128.mp4");
    }

    #[test]
    fn test_equal_bandwidth_keeps_first_seen() {
        let mpd = r#"<MPD><Period><AdaptationSet>
            <Representation bandwidth="800000" codecs="avc1"><BaseURL>first.mp4</BaseURL></Representation>
            <Representation bandwidth="800000" codecs="avc1"><BaseURL>second.mp4</BaseURL></Representation>
        </AdaptationSet></Period></MPD>"#;
        let selection = select_best(parse_representations(mpd).unwrap(), MANIFEST_URL);
        assert_eq!(
            selection.video.unwrap().url,
            "https://v.redd.it/abc/first.mp4"
        );
    }

    #[test]
    fn test_low_bandwidth_without_audio_codec_is_audio() {
        // No codec hint and low bandwidth: falls below the video floor
        let mpd = r#"<MPD><Period><AdaptationSet>
            <Representation bandwidth="64000"><BaseURL>audio</BaseURL></Representation>
        </AdaptationSet></Period></MPD>"#;
        let selection = select_best(parse_representations(mpd).unwrap(), MANIFEST_URL);
        assert!(selection.video.is_none());
        assert_eq!(selection.audio.unwrap().bandwidth, 64_000);
    }

    #[test]
    fn test_absolute_base_url_untouched() {
        let mpd = r#"<MPD><Period><AdaptationSet>
            <Representation bandwidth="900000" codecs="avc1"><BaseURL>https://cdn.example/clip.mp4</BaseURL></Representation>
        </AdaptationSet></Period></MPD>"#;
        let selection = select_best(parse_representations(mpd).unwrap(), MANIFEST_URL);
        assert_eq!(selection.video.unwrap().url, "https://cdn.example/clip.mp4");
    }

    #[test]
    fn test_representation_without_base_url_is_skipped() {
        let mpd = r#"<MPD><Period><AdaptationSet>
            <Representation bandwidth="900000" codecs="avc1"></Representation>
        </AdaptationSet></Period></MPD>"#;
        let selection = select_best(parse_representations(mpd).unwrap(), MANIFEST_URL);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_malformed_manifest_yields_empty_selection() {
        for input in ["<MPD><Period>", "not a manifest at all", ""] {
            let selection = parse_representations(input)
                .map(|reps| select_best(reps, MANIFEST_URL))
                .unwrap_or_default();
            assert!(selection.is_empty(), "input {:?}", input);
        }
    }

    #[tokio::test]
    async fn test_selector_never_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/broken.mpd")
            .with_status(200)
            .with_body("<MPD><Period>")
            .create_async()
            .await;
        server
            .mock("GET", "/missing.mpd")
            .with_status(404)
            .create_async()
            .await;

        let http = RedditClient::new();
        let auth = Arc::new(TokenManager::new(http.clone(), None));
        let selector = ManifestSelector::new(http, auth);

        let broken = selector
            .select_streams(&format!("{}/broken.mpd", server.url()), "https://r/")
            .await;
        assert!(broken.is_empty());

        let missing = selector
            .select_streams(&format!("{}/missing.mpd", server.url()), "https://r/")
            .await;
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_selector_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/DASHPlaylist.mpd")
            .with_status(200)
            .with_body(sample_mpd())
            .create_async()
            .await;

        let http = RedditClient::new();
        let auth = Arc::new(TokenManager::new(http.clone(), None));
        let selector = ManifestSelector::new(http, auth);

        let manifest_url = format!("{}/DASHPlaylist.mpd", server.url());
        let selection = selector.select_streams(&manifest_url, "https://r/").await;

        let video = selection.video.unwrap();
        assert_eq!(video.bandwidth, 1_200_000);
        assert_eq!(video.url, format!("{}/DASH_720.mp4", server.url()));
    }
}
