use async_trait::async_trait;
use chrono::{DateTime, Utc};
use youtube_client::{
    ApiTransport, ChannelResource, QuotaClient, QuotaStatus, Result as ApiResult,
};

use crate::types::ChannelId;

/// A video reference with its uploading channel, when the service included
/// one. Graph expansion walks from the video to the uploader and on to the
/// commenters.
#[derive(Debug, Clone)]
pub struct VideoHit {
    pub video_id: String,
    pub channel_id: Option<ChannelId>,
}

/// Domain-level view of the YouTube Data API, to allow mocking in tests.
///
/// Every method already extracts the channel ids the engine cares about;
/// strategies never see raw API resources except for the full channel
/// lookup used by validation.
#[async_trait]
pub trait ChannelApi: Send + Sync {
    /// search.list type=channel. Returns uploader channel ids.
    async fn search_channels(
        &self,
        query: &str,
        region: &str,
        max_results: u32,
    ) -> ApiResult<Vec<ChannelId>>;

    /// search.list type=video, optionally restricted to a recency window.
    async fn search_videos(
        &self,
        query: &str,
        region: &str,
        published_after: Option<DateTime<Utc>>,
        max_results: u32,
    ) -> ApiResult<Vec<VideoHit>>;

    /// videos.list chart=mostPopular for a region.
    async fn most_popular_videos(&self, region: &str, max_results: u32)
        -> ApiResult<Vec<VideoHit>>;

    /// search.list scoped to one channel, newest first.
    async fn channel_recent_videos(
        &self,
        channel: &ChannelId,
        max_results: u32,
    ) -> ApiResult<Vec<VideoHit>>;

    /// channels.list bulk lookup; full resources for validation.
    async fn lookup_channels(&self, ids: &[ChannelId]) -> ApiResult<Vec<ChannelResource>>;

    /// playlists.list: playlist ids owned by a channel.
    async fn channel_playlists(
        &self,
        channel: &ChannelId,
        max_results: u32,
    ) -> ApiResult<Vec<String>>;

    /// playlistItems.list: owner channel of each item in a playlist.
    async fn playlist_item_owners(
        &self,
        playlist_id: &str,
        max_results: u32,
    ) -> ApiResult<Vec<ChannelId>>;

    /// commentThreads.list: author channel of each top-level comment.
    async fn comment_authors(
        &self,
        video_id: &str,
        max_results: u32,
    ) -> ApiResult<Vec<ChannelId>>;

    /// Consumption snapshot for session reporting.
    fn quota_status(&self) -> QuotaStatus;
}

#[async_trait]
impl<T: ApiTransport> ChannelApi for QuotaClient<T> {
    async fn search_channels(
        &self,
        query: &str,
        region: &str,
        max_results: u32,
    ) -> ApiResult<Vec<ChannelId>> {
        let items = QuotaClient::search_channels(self, query, region, max_results).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| {
                item.id
                    .channel_id
                    .or(item.snippet.and_then(|s| s.channel_id))
            })
            .map(ChannelId::from)
            .collect())
    }

    async fn search_videos(
        &self,
        query: &str,
        region: &str,
        published_after: Option<DateTime<Utc>>,
        max_results: u32,
    ) -> ApiResult<Vec<VideoHit>> {
        let items =
            QuotaClient::search_videos(self, query, region, published_after, max_results).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                let channel_id = item
                    .snippet
                    .and_then(|s| s.channel_id)
                    .map(ChannelId::from);
                Some(VideoHit { video_id, channel_id })
            })
            .collect())
    }

    async fn most_popular_videos(
        &self,
        region: &str,
        max_results: u32,
    ) -> ApiResult<Vec<VideoHit>> {
        let videos = QuotaClient::most_popular_videos(self, region, max_results).await?;
        Ok(videos
            .into_iter()
            .map(|video| VideoHit {
                video_id: video.id,
                channel_id: video.snippet.channel_id.map(ChannelId::from),
            })
            .collect())
    }

    async fn channel_recent_videos(
        &self,
        channel: &ChannelId,
        max_results: u32,
    ) -> ApiResult<Vec<VideoHit>> {
        let items =
            QuotaClient::channel_recent_videos(self, channel.as_str(), max_results).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                let channel_id = item
                    .snippet
                    .and_then(|s| s.channel_id)
                    .map(ChannelId::from);
                Some(VideoHit { video_id, channel_id })
            })
            .collect())
    }

    async fn lookup_channels(&self, ids: &[ChannelId]) -> ApiResult<Vec<ChannelResource>> {
        let raw: Vec<String> = ids.iter().map(|id| id.0.clone()).collect();
        QuotaClient::list_channels(self, &raw).await
    }

    async fn channel_playlists(
        &self,
        channel: &ChannelId,
        max_results: u32,
    ) -> ApiResult<Vec<String>> {
        let playlists =
            QuotaClient::channel_playlists(self, channel.as_str(), max_results).await?;
        Ok(playlists.into_iter().map(|p| p.id).collect())
    }

    async fn playlist_item_owners(
        &self,
        playlist_id: &str,
        max_results: u32,
    ) -> ApiResult<Vec<ChannelId>> {
        let items = QuotaClient::playlist_items(self, playlist_id, max_results).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| item.snippet.video_owner_channel_id)
            .map(ChannelId::from)
            .collect())
    }

    async fn comment_authors(
        &self,
        video_id: &str,
        max_results: u32,
    ) -> ApiResult<Vec<ChannelId>> {
        let threads = QuotaClient::video_comment_threads(self, video_id, max_results).await?;
        Ok(threads
            .into_iter()
            .filter_map(|thread| thread.snippet.top_level_comment)
            .filter_map(|comment| comment.snippet.author_channel_id)
            .map(|author| ChannelId::from(author.value))
            .collect())
    }

    fn quota_status(&self) -> QuotaStatus {
        QuotaClient::quota_status(self)
    }
}
