//! Transcript acquisition for YouTube videos.
//!
//! A [`TranscriptProvider`] turns a video id and an ordered list of preferred
//! languages into timed [`TranscriptSegment`]s. The rest of the pipeline only
//! needs the flattened text.

mod timedtext;
mod youtube;

pub use timedtext::parse_timedtext;
pub use youtube::YoutubeTranscriptProvider;

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A single timed fragment of spoken text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Transcribed text content.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// A transcript in one language for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Language code of the selected track (e.g. "en").
    pub language_code: String,
    /// Whether the track was generated by automatic speech recognition.
    pub is_generated: bool,
    /// Segments in playback order.
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Create a new transcript from segments.
    pub fn new(
        video_id: impl Into<String>,
        language_code: impl Into<String>,
        is_generated: bool,
        segments: Vec<TranscriptSegment>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            language_code: language_code.into(),
            is_generated,
            segments,
        }
    }

    /// All segment texts joined by single spaces, in order. Timing is dropped.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Source of timed transcripts.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript for `video_id` in the first available language
    /// from `languages`.
    ///
    /// Fails with `TranscriptsUnavailable` when the video has no transcripts
    /// at all, and with `TranscriptFetch` for everything else.
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Transcript>;
}

static VIDEO_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?:https?://)?
        (?:www\.|m\.)?
        (?:
            youtube\.com/(?:watch\?(?:.*&)?v=|embed/|v/|shorts/|live/)
            |
            youtu\.be/
        )
        ([a-zA-Z0-9_-]{11})
        ",
    )
    .expect("Invalid regex")
});

/// Resolve the video id from user input.
///
/// YouTube URLs are reduced to their 11-character id. Anything else is an
/// opaque id and is returned trimmed but otherwise untouched.
pub fn extract_video_id(input: &str) -> String {
    let input = input.trim();
    VIDEO_URL_REGEX
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| input.to_string())
}

/// Join language names for user-facing messages ("English/Hindi").
///
/// Codes without a known name are shown as-is.
pub fn describe_languages(languages: &[String]) -> String {
    languages
        .iter()
        .map(|code| language_name(code).unwrap_or(code))
        .collect::<Vec<_>>()
        .join("/")
}

fn language_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "en" => "English",
        "hi" => "Hindi",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "pt" => "Portuguese",
        "ja" => "Japanese",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_text_joins_with_spaces() {
        let transcript = Transcript::new(
            "vid",
            "en",
            false,
            vec![
                TranscriptSegment::new("Hello world", 0.0, 1.5),
                TranscriptSegment::new("this is", 1.5, 1.0),
                TranscriptSegment::new("a test", 2.5, 2.0),
            ],
        );
        assert_eq!(transcript.full_text(), "Hello world this is a test");
    }

    #[test]
    fn test_full_text_empty() {
        let transcript = Transcript::new("vid", "en", true, Vec::new());
        assert_eq!(transcript.full_text(), "");
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42s"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(extract_video_id("youtube.com/embed/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(
            extract_video_id("https://m.youtube.com/shorts/dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(extract_video_id("  iv-5mZ_9CPY "), "iv-5mZ_9CPY");
        assert_eq!(extract_video_id("not a url"), "not a url");
    }

    #[test]
    fn test_describe_languages() {
        let langs = vec!["en".to_string(), "hi".to_string()];
        assert_eq!(describe_languages(&langs), "English/Hindi");

        let mixed = vec!["fr".to_string(), "xx".to_string()];
        assert_eq!(describe_languages(&mixed), "French/xx");
    }
}
