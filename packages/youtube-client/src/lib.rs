//! YouTube Data API v3 REST client with multi-key quota rotation.
//!
//! The client owns an ordered pool of API keys. When the active key is
//! rejected for quota, it is marked exhausted for the rest of the process
//! lifetime, the next non-exhausted key takes over and the same logical
//! call is retried. Once every key is exhausted the client fails with
//! [`ApiError::AllKeysExhausted`], the one terminal condition callers treat
//! as "stop this run and resume after the quota window resets".
//!
//! # Example
//!
//! ```rust,ignore
//! use youtube_client::YouTubeClient;
//!
//! let client = YouTubeClient::new(keys)?;
//! let hits = client.search_channels("sri lanka", "LK", 50).await?;
//! ```

pub mod error;
pub mod transport;
pub mod types;

pub use error::{ApiError, CallError, Result};
pub use transport::{ApiRequest, ApiTransport, HttpTransport};
pub use types::{
    ChannelResource, CommentThreadResource, ListResponse, PlaylistItemResource,
    PlaylistResource, SearchItem, VideoResource,
};

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Unit cost of a search.list call.
pub const SEARCH_COST: u64 = 100;
/// Unit cost of plain list/lookup calls.
pub const LOOKUP_COST: u64 = 1;

/// Same-key retry bound for transient failures.
const MAX_TRANSIENT_ATTEMPTS: u32 = 3;

/// Per-call IDs accepted by channels.list.
pub const MAX_LOOKUP_BATCH: usize = 50;

/// Point-in-time consumption snapshot, for observability only. The client
/// never enforces a local cap; it reacts to the service's rejections.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaStatus {
    pub total_units: u64,
    pub keys: Vec<KeyUsage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyUsage {
    pub index: usize,
    pub units: u64,
    pub exhausted: bool,
}

impl QuotaStatus {
    pub fn available_keys(&self) -> usize {
        self.keys.iter().filter(|k| !k.exhausted).count()
    }
}

struct RotationState {
    current: usize,
    exhausted: HashSet<usize>,
    total_units: u64,
    per_key_units: Vec<u64>,
}

/// Quota-aware client, generic over the transport so policy tests can run
/// against a scripted transport.
pub struct QuotaClient<T> {
    transport: T,
    keys: Vec<String>,
    retry_base: Duration,
    state: Mutex<RotationState>,
}

/// The production client.
pub type YouTubeClient = QuotaClient<HttpTransport>;

impl YouTubeClient {
    pub fn new(keys: Vec<String>) -> Result<Self> {
        Self::with_transport(HttpTransport::new(), keys)
    }
}

impl<T: ApiTransport> QuotaClient<T> {
    pub fn with_transport(transport: T, keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(ApiError::NoKeys);
        }
        let key_count = keys.len();
        tracing::info!(key_count, "initialized YouTube API client");
        Ok(Self {
            transport,
            keys,
            retry_base: Duration::from_secs(2),
            state: Mutex::new(RotationState {
                current: 0,
                exhausted: HashSet::new(),
                total_units: 0,
                per_key_units: vec![0; key_count],
            }),
        })
    }

    /// Override the transient-retry base delay (tests use a tiny value).
    pub fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    pub fn quota_status(&self) -> QuotaStatus {
        let state = self.state.lock().unwrap();
        QuotaStatus {
            total_units: state.total_units,
            keys: state
                .per_key_units
                .iter()
                .enumerate()
                .map(|(index, &units)| KeyUsage {
                    index,
                    units,
                    exhausted: state.exhausted.contains(&index),
                })
                .collect(),
        }
    }

    /// Select the active key, advancing past exhausted ones.
    fn active_key(&self) -> Result<(usize, String)> {
        let mut state = self.state.lock().unwrap();
        let n = self.keys.len();
        for offset in 0..n {
            let idx = (state.current + offset) % n;
            if !state.exhausted.contains(&idx) {
                state.current = idx;
                return Ok((idx, self.keys[idx].clone()));
            }
        }
        Err(ApiError::AllKeysExhausted)
    }

    fn mark_exhausted(&self, idx: usize) {
        let mut state = self.state.lock().unwrap();
        state.exhausted.insert(idx);
        state.current = (idx + 1) % self.keys.len();
        let remaining = self.keys.len() - state.exhausted.len();
        tracing::warn!(key = idx + 1, remaining, "API key quota exhausted");
    }

    fn record_units(&self, idx: usize, cost: u64) {
        let mut state = self.state.lock().unwrap();
        state.total_units += cost;
        state.per_key_units[idx] += cost;
        tracing::debug!(
            key = idx + 1,
            cost,
            total_units = state.total_units,
            "API call succeeded"
        );
    }

    /// Execute one logical call under the rotation and retry policy.
    pub async fn call(&self, request: &ApiRequest) -> Result<serde_json::Value> {
        let mut transient_attempts: u32 = 0;
        loop {
            let (idx, key) = self.active_key()?;
            match self.transport.execute(&key, request).await {
                Ok(value) => {
                    self.record_units(idx, request.unit_cost);
                    return Ok(value);
                }
                Err(CallError::QuotaExceeded) => {
                    self.mark_exhausted(idx);
                    // Fresh key, fresh transient budget.
                    transient_attempts = 0;
                }
                Err(err @ (CallError::ServerError { .. } | CallError::Network(_))) => {
                    transient_attempts += 1;
                    if transient_attempts >= MAX_TRANSIENT_ATTEMPTS {
                        return Err(ApiError::Transient {
                            attempts: transient_attempts,
                            message: err.message(),
                        });
                    }
                    let delay = self.retry_base * 2u32.pow(transient_attempts - 1);
                    tracing::warn!(
                        endpoint = request.endpoint,
                        attempt = transient_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err.message(),
                        "transient API failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(CallError::Rejected { status, message }) => {
                    return Err(ApiError::Request { status, message });
                }
            }
        }
    }

    async fn call_list<R: DeserializeOwned>(&self, request: &ApiRequest) -> Result<Vec<R>> {
        let value = self.call(request).await?;
        let resp: ListResponse<R> = serde_json::from_value(value)?;
        Ok(resp.items)
    }

    /// search.list type=channel. Costs [`SEARCH_COST`] units.
    pub async fn search_channels(
        &self,
        query: &str,
        region: &str,
        max_results: u32,
    ) -> Result<Vec<SearchItem>> {
        let request = ApiRequest::new("search", SEARCH_COST)
            .param("part", "snippet")
            .param("q", query)
            .param("type", "channel")
            .param("regionCode", region)
            .param("maxResults", max_results.to_string())
            .param("order", "relevance");
        self.call_list(&request).await
    }

    /// search.list type=video, optionally restricted to a recency window.
    /// Costs [`SEARCH_COST`] units.
    pub async fn search_videos(
        &self,
        query: &str,
        region: &str,
        published_after: Option<DateTime<Utc>>,
        max_results: u32,
    ) -> Result<Vec<SearchItem>> {
        let mut request = ApiRequest::new("search", SEARCH_COST)
            .param("part", "snippet")
            .param("q", query)
            .param("type", "video")
            .param("regionCode", region)
            .param("maxResults", max_results.to_string())
            .param("order", "relevance");
        if let Some(after) = published_after {
            request = request.param(
                "publishedAfter",
                after.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
        self.call_list(&request).await
    }

    /// search.list scoped to one channel, newest first. Costs
    /// [`SEARCH_COST`] units.
    pub async fn channel_recent_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<SearchItem>> {
        let request = ApiRequest::new("search", SEARCH_COST)
            .param("part", "snippet")
            .param("channelId", channel_id)
            .param("type", "video")
            .param("order", "date")
            .param("maxResults", max_results.to_string());
        self.call_list(&request).await
    }

    /// channels.list bulk lookup, at most [`MAX_LOOKUP_BATCH`] ids.
    pub async fn list_channels(&self, ids: &[String]) -> Result<Vec<ChannelResource>> {
        let request = ApiRequest::new("channels", LOOKUP_COST)
            .param("part", "snippet,statistics,brandingSettings")
            .param("id", ids.join(","))
            .param("maxResults", MAX_LOOKUP_BATCH.to_string());
        self.call_list(&request).await
    }

    /// videos.list chart=mostPopular for a region. Cheapest discovery call.
    pub async fn most_popular_videos(
        &self,
        region: &str,
        max_results: u32,
    ) -> Result<Vec<VideoResource>> {
        let request = ApiRequest::new("videos", LOOKUP_COST)
            .param("part", "snippet")
            .param("chart", "mostPopular")
            .param("regionCode", region)
            .param("maxResults", max_results.to_string());
        self.call_list(&request).await
    }

    /// playlists.list for a channel.
    pub async fn channel_playlists(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<PlaylistResource>> {
        let request = ApiRequest::new("playlists", LOOKUP_COST)
            .param("part", "snippet")
            .param("channelId", channel_id)
            .param("maxResults", max_results.to_string());
        self.call_list(&request).await
    }

    /// playlistItems.list for a playlist.
    pub async fn playlist_items(
        &self,
        playlist_id: &str,
        max_results: u32,
    ) -> Result<Vec<PlaylistItemResource>> {
        let request = ApiRequest::new("playlistItems", LOOKUP_COST)
            .param("part", "snippet")
            .param("playlistId", playlist_id)
            .param("maxResults", max_results.to_string());
        self.call_list(&request).await
    }

    /// commentThreads.list for a video. Videos with comments disabled come
    /// back as a per-call [`ApiError::Request`].
    pub async fn video_comment_threads(
        &self,
        video_id: &str,
        max_results: u32,
    ) -> Result<Vec<CommentThreadResource>> {
        let request = ApiRequest::new("commentThreads", LOOKUP_COST)
            .param("part", "snippet")
            .param("videoId", video_id)
            .param("maxResults", max_results.to_string())
            .param("order", "relevance");
        self.call_list(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;

    struct ScriptedTransport {
        script: Mutex<VecDeque<std::result::Result<serde_json::Value, CallError>>>,
        keys_seen: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(
            script: Vec<std::result::Result<serde_json::Value, CallError>>,
        ) -> Self {
            Self {
                script: Mutex::new(script.into()),
                keys_seen: Mutex::new(Vec::new()),
            }
        }

        fn keys_seen(&self) -> Vec<String> {
            self.keys_seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ApiTransport for ScriptedTransport {
        async fn execute(
            &self,
            key: &str,
            _request: &ApiRequest,
        ) -> std::result::Result<serde_json::Value, CallError> {
            self.keys_seen.lock().unwrap().push(key.to_string());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(json!({ "items": [] })))
        }
    }

    fn keys(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("key-{i}")).collect()
    }

    fn search_request() -> ApiRequest {
        ApiRequest::new("search", SEARCH_COST).param("q", "lanka")
    }

    #[test]
    fn empty_key_pool_is_a_config_error() {
        let transport = ScriptedTransport::new(vec![]);
        assert!(matches!(
            QuotaClient::with_transport(transport, vec![]),
            Err(ApiError::NoKeys)
        ));
    }

    #[tokio::test]
    async fn exhausting_every_key_is_terminal_and_never_reuses_a_key() {
        let transport = ScriptedTransport::new(vec![
            Err(CallError::QuotaExceeded),
            Err(CallError::QuotaExceeded),
            Err(CallError::QuotaExceeded),
        ]);
        let client = QuotaClient::with_transport(transport, keys(3)).unwrap();

        let err = client.call(&search_request()).await.unwrap_err();
        assert!(matches!(err, ApiError::AllKeysExhausted));

        // Exactly one attempt per key, in order, no reuse.
        assert_eq!(
            client.transport.keys_seen(),
            vec!["key-1", "key-2", "key-3"]
        );

        // A later call in the same process fails immediately.
        let err = client.call(&search_request()).await.unwrap_err();
        assert!(matches!(err, ApiError::AllKeysExhausted));
        assert_eq!(client.transport.keys_seen().len(), 3);
    }

    #[tokio::test]
    async fn quota_rejection_rotates_and_retries_the_same_call() {
        let transport = ScriptedTransport::new(vec![
            Err(CallError::QuotaExceeded),
            Ok(json!({ "items": [] })),
        ]);
        let client = QuotaClient::with_transport(transport, keys(2)).unwrap();

        client.call(&search_request()).await.unwrap();
        assert_eq!(client.transport.keys_seen(), vec!["key-1", "key-2"]);

        let status = client.quota_status();
        assert_eq!(status.available_keys(), 1);
        assert_eq!(status.keys[0].units, 0);
        assert_eq!(status.keys[1].units, SEARCH_COST);
        assert!(status.keys[0].exhausted);
    }

    #[tokio::test]
    async fn transient_failures_retry_then_propagate() {
        let transport = ScriptedTransport::new(vec![
            Err(CallError::ServerError {
                status: 503,
                message: "unavailable".into(),
            }),
            Err(CallError::ServerError {
                status: 503,
                message: "unavailable".into(),
            }),
            Err(CallError::ServerError {
                status: 503,
                message: "unavailable".into(),
            }),
        ]);
        let client = QuotaClient::with_transport(transport, keys(1))
            .unwrap()
            .with_retry_base(Duration::from_millis(1));

        let err = client.call(&search_request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transient { attempts: 3, .. }));
        // Same key throughout; transient failures never rotate.
        assert_eq!(
            client.transport.keys_seen(),
            vec!["key-1", "key-1", "key-1"]
        );
        assert_eq!(client.quota_status().available_keys(), 1);
    }

    #[tokio::test]
    async fn transient_failure_recovers_within_the_retry_budget() {
        let transport = ScriptedTransport::new(vec![
            Err(CallError::Network("connection reset".into())),
            Ok(json!({ "items": [] })),
        ]);
        let client = QuotaClient::with_transport(transport, keys(1))
            .unwrap()
            .with_retry_base(Duration::from_millis(1));

        client.call(&search_request()).await.unwrap();
        assert_eq!(client.quota_status().total_units, SEARCH_COST);
    }

    #[tokio::test]
    async fn rejected_call_is_fatal_for_the_call_but_not_the_key() {
        let transport = ScriptedTransport::new(vec![
            Err(CallError::Rejected {
                status: 400,
                message: "invalid filter".into(),
            }),
            Ok(json!({ "items": [] })),
        ]);
        let client = QuotaClient::with_transport(transport, keys(2)).unwrap();

        let err = client.call(&search_request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Request { status: 400, .. }));

        // The same key serves the next call; no rotation happened.
        client.call(&search_request()).await.unwrap();
        assert_eq!(client.transport.keys_seen(), vec!["key-1", "key-1"]);
    }

    #[tokio::test]
    async fn successful_calls_accumulate_declared_unit_costs() {
        let transport = ScriptedTransport::new(vec![
            Ok(json!({ "items": [] })),
            Ok(json!({ "items": [] })),
        ]);
        let client = QuotaClient::with_transport(transport, keys(1)).unwrap();

        client.call(&search_request()).await.unwrap();
        client
            .call(&ApiRequest::new("channels", LOOKUP_COST))
            .await
            .unwrap();

        let status = client.quota_status();
        assert_eq!(status.total_units, SEARCH_COST + LOOKUP_COST);
        assert_eq!(status.keys[0].units, SEARCH_COST + LOOKUP_COST);
    }
}
