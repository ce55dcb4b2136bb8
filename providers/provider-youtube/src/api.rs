//! Wire types for the YouTube Data API v3 responses this crate consumes.
//!
//! Every field the API may omit is optional or defaulted; counts arrive as
//! strings and are coerced to zero when missing or malformed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::YouTubeError;

// ============================================================================
// Envelopes
// ============================================================================

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct YouTubeResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// Build an [`YouTubeError::ApiError`] from a non-success response body.
///
/// Reason codes are collected from both the legacy `errors[]` list and the
/// newer `details[]` list so the disabled-API signature is found in either.
pub(crate) fn api_error(status: u16, body: &str) -> YouTubeError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let reasons = envelope
                .error
                .errors
                .iter()
                .chain(envelope.error.details.iter())
                .filter_map(|detail| detail.reason.clone())
                .collect();
            YouTubeError::ApiError {
                status,
                reasons,
                message: envelope.error.message,
            }
        }
        Err(_) => YouTubeError::ApiError {
            status,
            reasons: vec![],
            message: body.chars().take(200).collect(),
        },
    }
}

// ============================================================================
// Shared
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

/// Get the best thumbnail URL, or an empty string when there is none.
pub(crate) fn thumbnail_url(thumbnails: &Option<Thumbnails>) -> String {
    thumbnails
        .as_ref()
        .and_then(|t| {
            t.high
                .as_ref()
                .or(t.medium.as_ref())
                .or(t.default.as_ref())
                .map(|thumb| thumb.url.clone())
        })
        .unwrap_or_default()
}

/// Parse RFC 3339 timestamp to DateTime<Utc>.
pub(crate) fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Accept `"123"`, `123`, `null` or a missing field; anything unparseable is zero.
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    })
}

// ============================================================================
// search
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    pub id: Option<SearchResultId>,
    pub snippet: Option<SearchSnippet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResultId {
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchSnippet {
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
}

impl SearchResult {
    pub fn channel_id(&self) -> Option<&str> {
        self.id
            .as_ref()
            .and_then(|id| id.channel_id.as_deref())
            .or_else(|| {
                self.snippet
                    .as_ref()
                    .and_then(|s| s.channel_id.as_deref())
            })
    }
}

// ============================================================================
// channels
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct YouTubeChannel {
    pub id: String,
    pub snippet: Option<ChannelSnippet>,
    pub statistics: Option<ChannelStatistics>,
    #[serde(rename = "brandingSettings")]
    pub branding_settings: Option<BrandingSettings>,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChannelSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "customUrl")]
    pub custom_url: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub thumbnails: Option<Thumbnails>,
    pub country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChannelStatistics {
    #[serde(rename = "viewCount", default, deserialize_with = "count")]
    pub view_count: u64,
    #[serde(rename = "subscriberCount", default, deserialize_with = "count")]
    pub subscriber_count: u64,
    #[serde(rename = "videoCount", default, deserialize_with = "count")]
    pub video_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BrandingSettings {
    pub channel: Option<BrandingChannel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BrandingChannel {
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelContentDetails {
    #[serde(rename = "relatedPlaylists")]
    pub related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelatedPlaylists {
    pub uploads: Option<String>,
}

// ============================================================================
// playlistItems
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistItem {
    pub snippet: Option<PlaylistItemSnippet>,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistItemSnippet {
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub title: String,
    pub thumbnails: Option<Thumbnails>,
    #[serde(rename = "resourceId")]
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistItemContentDetails {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    #[serde(rename = "videoPublishedAt")]
    pub video_published_at: Option<String>,
}

impl PlaylistItem {
    pub fn video_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|cd| cd.video_id.as_deref())
            .or_else(|| {
                self.snippet
                    .as_ref()
                    .and_then(|s| s.resource_id.as_ref())
                    .and_then(|r| r.video_id.as_deref())
            })
    }

    /// Video publish time, falling back to the time it was added to the playlist.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.content_details
            .as_ref()
            .and_then(|cd| cd.video_published_at.as_deref())
            .and_then(parse_timestamp)
            .or_else(|| {
                self.snippet
                    .as_ref()
                    .and_then(|s| s.published_at.as_deref())
                    .and_then(parse_timestamp)
            })
    }
}

// ============================================================================
// videos
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct YouTubeVideo {
    pub id: String,
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct VideoStatistics {
    #[serde(rename = "viewCount", default, deserialize_with = "count")]
    pub view_count: u64,
    #[serde(rename = "likeCount", default, deserialize_with = "count")]
    pub like_count: u64,
    #[serde(rename = "commentCount", default, deserialize_with = "count")]
    pub comment_count: u64,
}
