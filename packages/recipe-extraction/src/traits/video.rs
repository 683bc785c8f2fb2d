//! Video metadata lookup (yt-dlp and friends).

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ExtractResult;

/// Subset of the metadata mapping a video tool reports.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub uploader: Option<String>,
    pub creator: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,

    /// Compact `YYYYMMDD`.
    pub upload_date: Option<String>,

    /// Seconds.
    pub duration: Option<f64>,

    /// Manual caption tracks keyed by language.
    #[serde(default)]
    pub subtitles: HashMap<String, serde_json::Value>,

    /// Auto-generated caption tracks keyed by language.
    #[serde(default)]
    pub automatic_captions: HashMap<String, serde_json::Value>,
}

impl VideoMetadata {
    /// Whether any listed language has a non-empty caption track, manual or automatic.
    pub fn has_captions_for(&self, languages: &[&str]) -> bool {
        languages.iter().any(|lang| {
            self.subtitles
                .get(*lang)
                .or_else(|| self.automatic_captions.get(*lang))
                .is_some_and(|track| !is_empty_track(track))
        })
    }
}

fn is_empty_track(track: &serde_json::Value) -> bool {
    match track {
        serde_json::Value::Null => true,
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// What the caller wants the tool to look for besides the basic metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoLookup {
    /// Caption languages to discover. Empty skips caption discovery.
    pub caption_languages: Vec<String>,
}

/// A metadata tool that never downloads media.
#[async_trait]
pub trait VideoMetadataTool: Send + Sync {
    async fn fetch_metadata(&self, url: &str, lookup: &VideoLookup) -> ExtractResult<VideoMetadata>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ytdlp_dump() {
        let json = r#"{
            "id": "abc",
            "title": "Weeknight Ramen",
            "uploader": "Noodle Lab",
            "view_count": 1234567,
            "upload_date": "20240315",
            "duration": 312.0,
            "subtitles": {},
            "automatic_captions": {"en": [{"ext": "vtt"}]}
        }"#;

        let meta: VideoMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Weeknight Ramen"));
        assert_eq!(meta.view_count, Some(1_234_567));
        assert!(meta.has_captions_for(&["en", "en-US"]));
        assert!(!meta.has_captions_for(&["fr"]));
    }

    #[test]
    fn test_empty_track_is_not_captions() {
        let mut meta = VideoMetadata::default();
        meta.subtitles.insert("en".into(), serde_json::json!([]));
        assert!(!meta.has_captions_for(&["en"]));
    }
}
