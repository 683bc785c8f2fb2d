use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A single post, reel or IGTV video resolved by shortcode.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub shortcode: String,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub owner_username: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub likes: Option<i64>,
    pub views: Option<i64>,
}

impl Post {
    /// Title shown to callers; IGTV posts carry one, regular posts do not.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Instagram Post")
    }

    /// Labeled multi-line text blob of everything textual about the post.
    pub fn to_text(&self) -> String {
        let mut parts = Vec::new();

        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            parts.push(format!("Title: {}", title));
        }
        if let Some(caption) = self.caption.as_deref().filter(|c| !c.trim().is_empty()) {
            parts.push(format!("Caption: {}", caption));
        }
        if let Some(owner) = &self.owner_username {
            parts.push(format!("Posted by: @{}", owner));
        }
        if let Some(taken_at) = self.taken_at {
            parts.push(format!("Date: {}", taken_at.format("%Y-%m-%d %H:%M:%S")));
        }
        if let Some(likes) = self.likes.filter(|l| *l > 0) {
            parts.push(format!("Likes: {}", likes));
        }
        if let Some(views) = self.views.filter(|v| *v > 0) {
            parts.push(format!("Views: {}", views));
        }

        parts.join("\n\n")
    }

    /// Whether the post has any text worth judging.
    pub fn has_text(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
            || self.caption.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

/// Web login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: bool,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub two_factor_required: bool,
    pub checkpoint_url: Option<String>,
}

/// Wrapper for GraphQL query responses.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub status: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortcodeMediaData {
    pub xdt_shortcode_media: Option<RawMedia>,
}

/// Media node as returned by the shortcode lookup query.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMedia {
    pub shortcode: String,
    pub title: Option<String>,
    #[serde(default)]
    pub edge_media_to_caption: EdgeList<CaptionNode>,
    pub owner: Option<Owner>,
    pub taken_at_timestamp: Option<i64>,
    pub edge_media_preview_like: Option<EdgeCount>,
    pub video_view_count: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeList<T> {
    pub edges: Vec<Edge<T>>,
}

impl<T> Default for EdgeList<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionNode {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeCount {
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub username: Option<String>,
    pub full_name: Option<String>,
}

impl From<RawMedia> for Post {
    fn from(media: RawMedia) -> Self {
        let caption = media
            .edge_media_to_caption
            .edges
            .into_iter()
            .next()
            .map(|edge| edge.node.text);

        Self {
            shortcode: media.shortcode,
            title: media.title,
            caption,
            owner_username: media.owner.and_then(|o| o.username),
            taken_at: media
                .taken_at_timestamp
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            likes: media.edge_media_preview_like.map(|l| l.count),
            views: media.video_view_count,
        }
    }
}
