//! YouTube transcript provider.
//!
//! Talks to the same endpoints the YouTube web and Android clients use: the
//! watch page for the innertube API key, the innertube player endpoint for the
//! caption track list, and the timedtext endpoint for the captions.

use super::{describe_languages, parse_timedtext, Transcript, TranscriptProvider};
use crate::error::{Result, VidaskError};
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";
const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";

static API_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("Invalid regex")
});

static CONSENT_VALUE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name="v" value="(.*?)""#).expect("Invalid regex"));

/// Transcript provider backed by YouTube's caption tracks.
pub struct YoutubeTranscriptProvider {
    client: reqwest::Client,
}

impl YoutubeTranscriptProvider {
    /// Create a provider whose HTTP calls are each bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VidaskError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn get_text(&self, url: &str, cookie: Option<&str>) -> Result<String> {
        let mut request = self.client.get(url).header(ACCEPT_LANGUAGE, "en-US");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| VidaskError::TranscriptFetch(format!("request to YouTube failed: {}", e)))?;

        response
            .text()
            .await
            .map_err(|e| VidaskError::TranscriptFetch(format!("failed to read YouTube response: {}", e)))
    }

    /// Fetch the watch page, accepting the cookie-consent interstitial once if shown.
    async fn fetch_watch_html(&self, video_id: &str) -> Result<String> {
        let url = format!("{}{}", WATCH_URL, video_id);
        let html = self.get_text(&url, None).await?;

        let Some(cookie) = consent_cookie(&html)? else {
            return Ok(html);
        };

        debug!("Accepting YouTube cookie consent");
        let html = self.get_text(&url, Some(&cookie)).await?;
        if html.contains(CONSENT_FORM_MARKER) {
            return Err(consent_failed());
        }
        Ok(html)
    }

    async fn fetch_player(&self, video_id: &str, api_key: &str) -> Result<PlayerResponse> {
        let url = Url::parse_with_params(INNERTUBE_PLAYER_URL, &[("key", api_key)])
            .map_err(|e| VidaskError::TranscriptFetch(format!("invalid player URL: {}", e)))?;

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| VidaskError::TranscriptFetch(format!("request to YouTube failed: {}", e)))?;

        response
            .json::<PlayerResponse>()
            .await
            .map_err(|e| VidaskError::TranscriptFetch(format!("unexpected player response: {}", e)))
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptProvider {
    #[instrument(skip(self, languages))]
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Transcript> {
        let html = self.fetch_watch_html(video_id).await?;
        let api_key = extract_api_key(&html)?;

        let player = self.fetch_player(video_id, &api_key).await?;
        let track = choose_track(video_id, &player, languages)?;

        let url = strip_format_param(&track.base_url)?;
        let xml = self.get_text(url.as_str(), None).await?;
        let segments = parse_timedtext(&xml);

        info!(
            language = %track.language_code,
            generated = track.is_generated(),
            segments = segments.len(),
            "Fetched transcript"
        );

        Ok(Transcript::new(
            video_id,
            track.language_code.clone(),
            track.is_generated(),
            segments,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<CaptionTracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTracklist {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

fn extract_api_key(html: &str) -> Result<String> {
    if let Some(key) = API_KEY_REGEX.captures(html).and_then(|caps| caps.get(1)) {
        return Ok(key.as_str().to_string());
    }

    if html.contains(RECAPTCHA_MARKER) {
        Err(VidaskError::TranscriptFetch(
            "YouTube is blocking requests from this IP".to_string(),
        ))
    } else {
        Err(VidaskError::TranscriptFetch(
            "could not find the innertube API key on the watch page".to_string(),
        ))
    }
}

/// The cookie that accepts the consent interstitial, or `None` when the page has none.
fn consent_cookie(html: &str) -> Result<Option<String>> {
    if !html.contains(CONSENT_FORM_MARKER) {
        return Ok(None);
    }

    let value = CONSENT_VALUE_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or_else(consent_failed)?;
    Ok(Some(format!("CONSENT=YES+{}", value.as_str())))
}

fn consent_failed() -> VidaskError {
    VidaskError::TranscriptFetch("failed to automatically give consent to saving cookies".to_string())
}

/// Decide which caption track to download from a player response.
///
/// A playable video without caption tracks means transcripts are disabled.
/// Tracks that exist only in other languages are a fetch error listing them.
fn choose_track<'a>(
    video_id: &str,
    player: &'a PlayerResponse,
    languages: &[String],
) -> Result<&'a CaptionTrack> {
    check_playability(video_id, player.playability_status.as_ref())?;

    let tracks = player
        .captions
        .as_ref()
        .and_then(|c| c.tracklist.as_ref())
        .map(|t| t.caption_tracks.as_slice())
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(VidaskError::TranscriptsUnavailable {
            video_id: video_id.to_string(),
            languages: describe_languages(languages),
        });
    }

    let track = select_track(tracks, languages).ok_or_else(|| {
        let available: Vec<&str> = tracks.iter().map(|t| t.language_code.as_str()).collect();
        VidaskError::TranscriptFetch(format!(
            "no transcript found for languages {} (available: {})",
            describe_languages(languages),
            available.join(", ")
        ))
    })?;

    if track.base_url.contains("&exp=xpe") {
        return Err(VidaskError::TranscriptFetch(
            "this video's captions require a PO token and cannot be fetched".to_string(),
        ));
    }

    Ok(track)
}

fn check_playability(video_id: &str, status: Option<&PlayabilityStatus>) -> Result<()> {
    let Some(status) = status else {
        return Ok(());
    };
    let code = status.status.as_deref().unwrap_or("OK");
    if code == "OK" {
        return Ok(());
    }

    let reason = status.reason.clone().unwrap_or_default();
    let message = match code {
        "LOGIN_REQUIRED" if reason.contains("not a bot") => {
            "YouTube is blocking requests from this IP (bot check)".to_string()
        }
        "LOGIN_REQUIRED" if reason.contains("inappropriate") => {
            "the video is age restricted".to_string()
        }
        "ERROR" if reason == "This video is unavailable" => {
            if video_id.starts_with("http://") || video_id.starts_with("https://") {
                format!("invalid video id {:?}: pass the video id, not the URL", video_id)
            } else {
                "the video is no longer available".to_string()
            }
        }
        _ if reason.is_empty() => format!("the video is unplayable ({})", code),
        _ => format!("the video is unplayable: {}", reason),
    };

    Err(VidaskError::TranscriptFetch(message))
}

/// Pick the first preferred language with a track, manual tracks first.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let mut candidates = tracks.iter().filter(|t| &t.language_code == lang);
        let manual = candidates.clone().find(|t| !t.is_generated());
        manual.or_else(|| candidates.find(|t| t.is_generated()))
    })
}

fn strip_format_param(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| VidaskError::TranscriptFetch(format!("invalid caption track URL: {}", e)))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);

    Ok(url)
}
