//! Short-video extractors backed by a [`VideoMetadataTool`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::traits::extractor::{ExtractedText, Extractor};
use crate::traits::video::{VideoLookup, VideoMetadata, VideoMetadataTool};

/// English caption tracks worth mentioning to the judge.
const CAPTION_LANGUAGES: &[&str] = &["en", "en-US", "en-GB"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoPlatform {
    YouTube,
    TikTok,
}

impl VideoPlatform {
    pub fn label(&self) -> &'static str {
        match self {
            VideoPlatform::YouTube => "YouTube",
            VideoPlatform::TikTok => "TikTok",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            VideoPlatform::YouTube => "YouTube Video",
            VideoPlatform::TikTok => "TikTok Video",
        }
    }

    fn lookup(&self) -> VideoLookup {
        match self {
            VideoPlatform::YouTube => VideoLookup {
                caption_languages: CAPTION_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            },
            VideoPlatform::TikTok => VideoLookup::default(),
        }
    }
}

pub struct VideoExtractor {
    platform: VideoPlatform,
    tool: Arc<dyn VideoMetadataTool>,
}

impl VideoExtractor {
    pub fn new(platform: VideoPlatform, tool: Arc<dyn VideoMetadataTool>) -> Self {
        Self { platform, tool }
    }

    pub fn youtube(tool: Arc<dyn VideoMetadataTool>) -> Self {
        Self::new(VideoPlatform::YouTube, tool)
    }

    pub fn tiktok(tool: Arc<dyn VideoMetadataTool>) -> Self {
        Self::new(VideoPlatform::TikTok, tool)
    }

    fn failure(&self, message: impl std::fmt::Display) -> ExtractError {
        ExtractError::platform(
            self.platform.label(),
            format!("Failed to extract {} video info: {}", self.platform.label(), message),
        )
    }
}

#[async_trait]
impl Extractor for VideoExtractor {
    fn name(&self) -> &str {
        match self.platform {
            VideoPlatform::YouTube => "youtube",
            VideoPlatform::TikTok => "tiktok",
        }
    }

    async fn extract(&self, url: &str) -> ExtractResult<ExtractedText> {
        let metadata = self
            .tool
            .fetch_metadata(url, &self.platform.lookup())
            .await
            .map_err(|e| match e {
                ExtractError::MissingCapability { .. } | ExtractError::Timeout { .. } => e,
                other => self.failure(other),
            })?;

        let text = format_metadata(self.platform, &metadata);
        if text.is_empty() {
            return Err(self.failure("no text metadata returned"));
        }

        let title = metadata
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.platform.default_title().to_string());

        debug!(url = %url, platform = self.platform.label(), chars = text.len(), "Extracted video metadata");
        Ok(ExtractedText::new(text, title))
    }
}

/// Labeled text blob for the judge.
pub fn format_metadata(platform: VideoPlatform, meta: &VideoMetadata) -> String {
    let mut parts = Vec::new();
    let title = non_empty(&meta.title);

    if let Some(title) = title {
        parts.push(format!("Title: {}", title));
    }

    match platform {
        VideoPlatform::YouTube => {
            if let Some(description) = non_empty(&meta.description) {
                parts.push(format!("Description: {}", description));
            }
            if let Some(channel) = non_empty(&meta.uploader) {
                parts.push(format!("Channel: {}", channel));
            }
            if meta.has_captions_for(CAPTION_LANGUAGES) {
                parts.push("Captions: English captions available (not downloaded)".to_string());
            }
        }
        VideoPlatform::TikTok => {
            // TikTok titles are often the caption itself
            if let Some(description) = non_empty(&meta.description).filter(|d| Some(*d) != title) {
                parts.push(format!("Description: {}", description));
            }
            if let Some(creator) = non_empty(&meta.uploader).or_else(|| non_empty(&meta.creator)) {
                parts.push(format!("Creator: @{}", creator));
            }
        }
    }

    if let Some(views) = meta.view_count.filter(|v| *v > 0) {
        parts.push(format!("Views: {}", format_count(views)));
    }
    if let Some(likes) = meta.like_count.filter(|l| *l > 0) {
        parts.push(format!("Likes: {}", format_count(likes)));
    }
    if let Some(date) = non_empty(&meta.upload_date) {
        parts.push(format!("Uploaded: {}", reformat_upload_date(date)));
    }
    if let Some(duration) = meta.duration.filter(|d| *d > 0.0) {
        parts.push(format!("Duration: {} seconds", duration.round() as u64));
    }

    parts.join("\n\n")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `1234567` → `"1,234,567"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `"20240315"` → `"2024-03-15"`; anything unparseable is returned unchanged.
pub fn reformat_upload_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
