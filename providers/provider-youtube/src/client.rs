//! Typed calls against the YouTube Data API.

use channel_metrics_core::{
    clean_identifier, is_canonical_id, is_verified, ChannelId, ChannelRecord, MonthlyBucket,
    VideoRecord,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::api::{
    parse_timestamp, thumbnail_url, PlaylistItem, SearchResult, VideoStatistics, YouTubeChannel,
    YouTubeResponse, YouTubeVideo,
};
use crate::monthly::{aggregate_monthly, window_start};
use crate::transport::{HttpTransport, Transport};
use crate::{YouTubeConfig, YouTubeError};

/// Client for the handful of endpoints the acquisition layer needs.
pub struct YouTubeClient {
    transport: Arc<dyn Transport>,
    config: YouTubeConfig,
}

impl YouTubeClient {
    /// Create a client over an explicit transport.
    pub fn new(transport: Arc<dyn Transport>, config: YouTubeConfig) -> Self {
        Self { transport, config }
    }

    /// Create a client that talks to the real API over HTTP.
    pub fn from_config(config: YouTubeConfig) -> Result<Self, YouTubeError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn config(&self) -> &YouTubeConfig {
        &self.config
    }

    async fn api_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, YouTubeError> {
        let value = self.transport.get(endpoint, params).await?;
        serde_json::from_value(value).map_err(|e| YouTubeError::ParseError(e.to_string()))
    }

    /// Cheap availability check: list the ID of one well-known channel.
    pub async fn probe(&self) -> Result<(), YouTubeError> {
        let _: YouTubeResponse<serde_json::Value> = self
            .api_get(
                &self.config.endpoints.channels,
                &[("part", "id"), ("id", &self.config.probe_channel_id)],
            )
            .await?;
        Ok(())
    }

    /// Resolve a raw identifier (ID, handle, name or URL) to a canonical channel ID.
    ///
    /// Canonical IDs, bare or inside a `/channel/` URL, are returned without a
    /// network call. Anything else goes through a channel-scoped search and
    /// the first hit wins.
    pub async fn resolve_channel_id(&self, raw: &str) -> Result<ChannelId, YouTubeError> {
        if is_canonical_id(raw.trim()) {
            return Ok(ChannelId::new(raw.trim()));
        }

        let cleaned = clean_identifier(raw);
        if is_canonical_id(&cleaned) {
            return Ok(ChannelId::new(cleaned));
        }
        if cleaned.is_empty() {
            return Err(YouTubeError::NotFound(raw.to_string()));
        }

        let response: YouTubeResponse<SearchResult> = self
            .api_get(
                &self.config.endpoints.search,
                &[
                    ("part", "snippet"),
                    ("type", "channel"),
                    ("q", &cleaned),
                    ("maxResults", "1"),
                ],
            )
            .await?;

        let channel_id = response
            .items
            .iter()
            .find_map(|item| item.channel_id())
            .ok_or_else(|| YouTubeError::NotFound(cleaned.clone()))?;

        debug!("Resolved {:?} to {}", raw, channel_id);
        Ok(ChannelId::new(channel_id))
    }

    /// Fetch snippet, statistics and branding data for a channel.
    ///
    /// The returned record has empty `recent_videos` and `monthly_performance`;
    /// those come from [`fetch_recent_videos`](Self::fetch_recent_videos) and
    /// [`fetch_monthly_performance`](Self::fetch_monthly_performance).
    pub async fn fetch_statistics(&self, channel_id: &ChannelId) -> Result<ChannelRecord, YouTubeError> {
        let response: YouTubeResponse<YouTubeChannel> = self
            .api_get(
                &self.config.endpoints.channels,
                &[
                    ("part", "snippet,statistics,brandingSettings"),
                    ("id", channel_id.as_str()),
                ],
            )
            .await?;

        let channel = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| YouTubeError::NotFound(channel_id.to_string()))?;

        Ok(Self::channel_to_record(channel))
    }

    fn channel_to_record(channel: YouTubeChannel) -> ChannelRecord {
        let snippet = channel.snippet.unwrap_or_default();
        let statistics = channel.statistics.unwrap_or_default();
        let branding_country = channel
            .branding_settings
            .and_then(|b| b.channel)
            .and_then(|c| c.country);

        ChannelRecord {
            id: ChannelId::new(channel.id),
            thumbnail_url: thumbnail_url(&snippet.thumbnails),
            created_at: snippet.published_at.as_deref().and_then(parse_timestamp),
            country: snippet.country.or(branding_country).unwrap_or_default(),
            custom_url: snippet.custom_url.unwrap_or_default(),
            title: snippet.title,
            description: snippet.description,
            subscriber_count: statistics.subscriber_count,
            view_count: statistics.view_count,
            video_count: statistics.video_count,
            verified: is_verified(statistics.subscriber_count),
            recent_videos: vec![],
            monthly_performance: vec![],
        }
    }

    /// Most recent uploads, newest first, at most `count` (capped at one page).
    pub async fn fetch_recent_videos(
        &self,
        channel_id: &ChannelId,
        count: u32,
    ) -> Result<Vec<VideoRecord>, YouTubeError> {
        let count = count.clamp(1, YouTubeConfig::MAX_PAGE_SIZE);
        self.fetch_uploads(channel_id, count).await
    }

    /// Monthly upload/view series built from one full page of recent uploads.
    ///
    /// Channels with more uploads in the window than fit on one page get an
    /// incomplete tail for their oldest months.
    pub async fn fetch_monthly_performance(
        &self,
        channel_id: &ChannelId,
    ) -> Result<Vec<MonthlyBucket>, YouTubeError> {
        let videos = self
            .fetch_uploads(channel_id, YouTubeConfig::MAX_PAGE_SIZE)
            .await?;
        let start = window_start(&Utc::now(), self.config.monthly_window_months);
        Ok(aggregate_monthly(&videos, start.as_deref()))
    }

    /// Recent uploads and the monthly series from a single page of uploads.
    ///
    /// The newest `count` uploads are a prefix of the full page, so one
    /// playlist lookup, one page and one statistics call serve both.
    pub async fn fetch_activity(
        &self,
        channel_id: &ChannelId,
        count: u32,
    ) -> Result<(Vec<VideoRecord>, Vec<MonthlyBucket>), YouTubeError> {
        let videos = self
            .fetch_uploads(channel_id, YouTubeConfig::MAX_PAGE_SIZE)
            .await?;
        let start = window_start(&Utc::now(), self.config.monthly_window_months);
        let monthly = aggregate_monthly(&videos, start.as_deref());

        let count = count.clamp(1, YouTubeConfig::MAX_PAGE_SIZE) as usize;
        let recent = videos.into_iter().take(count).collect();
        Ok((recent, monthly))
    }

    /// The ID of the channel's uploads playlist.
    async fn uploads_playlist_id(&self, channel_id: &ChannelId) -> Result<String, YouTubeError> {
        let response: YouTubeResponse<YouTubeChannel> = self
            .api_get(
                &self.config.endpoints.channels,
                &[("part", "contentDetails"), ("id", channel_id.as_str())],
            )
            .await?;

        response
            .items
            .into_iter()
            .next()
            .and_then(|c| c.content_details)
            .and_then(|cd| cd.related_playlists)
            .and_then(|rp| rp.uploads)
            .ok_or_else(|| YouTubeError::NotFound(format!("uploads playlist of {}", channel_id)))
    }

    /// List uploads and join them with their statistics.
    async fn fetch_uploads(
        &self,
        channel_id: &ChannelId,
        count: u32,
    ) -> Result<Vec<VideoRecord>, YouTubeError> {
        let playlist_id = self.uploads_playlist_id(channel_id).await?;
        let limit = count.to_string();

        let response: YouTubeResponse<PlaylistItem> = self
            .api_get(
                &self.config.endpoints.playlist_items,
                &[
                    ("part", "snippet,contentDetails"),
                    ("playlistId", &playlist_id),
                    ("maxResults", &limit),
                ],
            )
            .await?;

        let items: Vec<PlaylistItem> = response
            .items
            .into_iter()
            .take(count as usize)
            .collect();

        let video_ids: Vec<&str> = items.iter().filter_map(|item| item.video_id()).collect();
        let statistics = self.fetch_video_statistics(&video_ids).await?;

        let videos: Vec<VideoRecord> = items
            .iter()
            .filter_map(|item| {
                let id = item.video_id()?;
                let Some(published_at) = item.published_at() else {
                    debug!("Skipping upload {} without a publish date", id);
                    return None;
                };
                let stats = statistics.get(id).copied().unwrap_or_default();
                let snippet = item.snippet.as_ref();

                Some(VideoRecord {
                    id: id.to_string(),
                    title: snippet.map(|s| s.title.clone()).unwrap_or_default(),
                    published_at,
                    thumbnail_url: snippet.map(|s| thumbnail_url(&s.thumbnails)).unwrap_or_default(),
                    view_count: stats.view_count,
                    like_count: stats.like_count,
                    comment_count: stats.comment_count,
                })
            })
            .collect();

        debug!("Fetched {} uploads for {}", videos.len(), channel_id);
        Ok(videos)
    }

    /// Statistics for a set of videos in one batched call.
    async fn fetch_video_statistics(
        &self,
        video_ids: &[&str],
    ) -> Result<HashMap<String, VideoStatistics>, YouTubeError> {
        if video_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids = video_ids.join(",");
        let response: YouTubeResponse<YouTubeVideo> = self
            .api_get(
                &self.config.endpoints.videos,
                &[("part", "statistics"), ("id", &ids)],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .map(|video| (video.id, video.statistics.unwrap_or_default()))
            .collect())
    }
}
