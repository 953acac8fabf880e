use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use youtube_client::{ChannelResource, QuotaStatus};

use crate::category::{Category, CategoryClassifier};
use crate::scorer::RelevanceProfile;

/// Opaque identifier of an external channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChannelId {
    fn from(raw: String) -> Self {
        Self(raw.trim().to_string())
    }
}

/// The discovery techniques the engine rotates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    KeywordSearch,
    LongTailKeywords,
    TrendingTags,
    GraphExpansion,
    PopularSampling,
    RecencyWindows,
}

impl StrategyKind {
    /// Registration order; also the tie-break order in the scheduler.
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::KeywordSearch,
        StrategyKind::LongTailKeywords,
        StrategyKind::TrendingTags,
        StrategyKind::GraphExpansion,
        StrategyKind::PopularSampling,
        StrategyKind::RecencyWindows,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::KeywordSearch => "keyword_search",
            StrategyKind::LongTailKeywords => "long_tail_keywords",
            StrategyKind::TrendingTags => "trending_tags",
            StrategyKind::GraphExpansion => "graph_expansion",
            StrategyKind::PopularSampling => "popular_sampling",
            StrategyKind::RecencyWindows => "recency_windows",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A channel that passed bulk lookup and the relevance gate.
///
/// Only [`ValidatedChannel::from_resource`] builds these; a record existing
/// implies its score met the acceptance threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedChannel {
    pub channel_id: ChannelId,
    pub title: String,
    pub description: String,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
    pub published_at: Option<DateTime<Utc>>,
    pub country: Option<String>,
    pub custom_url: Option<String>,
    pub default_language: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub relevance_score: f64,
    pub category: Category,
    pub discovered_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub discovered_via: Option<StrategyKind>,
}

impl ValidatedChannel {
    /// Score a looked-up channel resource and build the record if it clears
    /// the acceptance threshold. Below-threshold channels are dropped (they
    /// stay in the dedup index, so they are never re-scored).
    pub fn from_resource(
        resource: &ChannelResource,
        profile: &RelevanceProfile,
        classifier: &CategoryClassifier,
        discovered_via: Option<StrategyKind>,
        discovered_at: DateTime<Utc>,
    ) -> Option<Self> {
        let snippet = &resource.snippet;
        let keywords = resource.branding_settings.channel.keyword_list();

        let relevance_score = profile.score(
            &snippet.title,
            &snippet.description,
            &keywords,
            snippet.country.as_deref(),
            snippet.default_language.as_deref(),
        );
        if relevance_score < profile.threshold {
            return None;
        }

        let category = classifier.classify(&snippet.title, &snippet.description, &keywords);

        Some(Self {
            channel_id: ChannelId::from(resource.id.clone()),
            title: snippet.title.clone(),
            description: snippet.description.clone(),
            subscriber_count: resource.statistics.subscribers(),
            video_count: resource.statistics.videos(),
            view_count: resource.statistics.views(),
            published_at: snippet
                .published_at
                .as_deref()
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            country: snippet.country.clone(),
            custom_url: snippet.custom_url.clone(),
            default_language: snippet.default_language.clone(),
            keywords,
            thumbnail_url: snippet.thumbnails.best_url().map(str::to_string),
            relevance_score,
            category,
            discovered_at,
            discovered_via,
        })
    }
}

/// Durable, monotonically updated orchestration progress. One instance per
/// output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryProgress {
    pub session_id: String,
    #[serde(default)]
    pub total_discovered: usize,
    #[serde(default)]
    pub total_validated: usize,
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default)]
    pub strategies_used: Vec<StrategyKind>,
    #[serde(default)]
    pub last_strategy: Option<StrategyKind>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub quota_exhausted_count: u32,
    #[serde(default)]
    pub quota_exhausted: bool,
}

impl DiscoveryProgress {
    pub fn fresh(session_id: String, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            total_discovered: 0,
            total_validated: 0,
            total_sessions: 0,
            strategies_used: Vec::new(),
            last_strategy: None,
            last_updated: now,
            quota_exhausted_count: 0,
            quota_exhausted: false,
        }
    }
}

/// Rolling per-technique performance record, created lazily on first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyStats {
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}

fn default_weight() -> f64 {
    1.0
}

impl Default for StrategyStats {
    fn default() -> Self {
        Self {
            success_rate: 0.0,
            weight: default_weight(),
            last_used: None,
        }
    }
}

impl StrategyStats {
    /// Fold in one run of the technique: validated yield per request spent.
    pub fn record_run(&mut self, validated_found: usize, api_calls: u32, now: DateTime<Utc>) {
        self.success_rate = validated_found as f64 / u32::max(api_calls, 1) as f64;
        self.weight = (self.success_rate * 2.0).clamp(0.1, 2.0);
        self.last_used = Some(now);
    }
}

/// Why a discovery session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The validated-channel target was met.
    TargetReached,
    /// Every API key hit its daily quota. Expected; re-run later.
    QuotaExhausted,
    /// Strategies stopped yielding new candidates and the backlog is empty.
    Drained,
}

/// End-of-session summary handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub discovered_this_session: usize,
    pub validated_this_session: usize,
    pub total_discovered: usize,
    pub total_validated: usize,
    pub api_calls: u32,
    /// Unit consumption and per-key usage at session end.
    pub quota: QuotaStatus,
    pub strategies_attempted: Vec<StrategyKind>,
    pub termination: TerminationReason,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryClassifier;
    use crate::scorer::RelevanceProfile;
    use youtube_client::ChannelResource;

    fn resource(id: &str, title: &str, country: Option<&str>) -> ChannelResource {
        let json = serde_json::json!({
            "id": id,
            "snippet": {
                "title": title,
                "description": "",
                "country": country,
                "publishedAt": "2020-05-01T10:00:00Z"
            },
            "statistics": {
                "subscriberCount": "1000",
                "videoCount": "20",
                "viewCount": "50000"
            }
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn factory_builds_record_at_or_above_threshold() {
        let profile = RelevanceProfile::test_profile();
        let classifier = CategoryClassifier::empty();
        let channel = ValidatedChannel::from_resource(
            &resource("UC1", "Sri Lanka Daily News", Some("LK")),
            &profile,
            &classifier,
            Some(StrategyKind::KeywordSearch),
            Utc::now(),
        )
        .expect("should validate");

        assert_eq!(channel.channel_id.as_str(), "UC1");
        assert_eq!(channel.subscriber_count, 1000);
        assert!(channel.relevance_score >= profile.threshold);
        assert!(channel.published_at.is_some());
    }

    #[test]
    fn factory_drops_below_threshold() {
        let profile = RelevanceProfile::test_profile();
        let classifier = CategoryClassifier::empty();
        let dropped = ValidatedChannel::from_resource(
            &resource("UC2", "Generic Gaming Clips", None),
            &profile,
            &classifier,
            None,
            Utc::now(),
        );
        assert!(dropped.is_none());
    }

    #[test]
    fn strategy_stats_weight_is_clamped() {
        let now = Utc::now();
        let mut stats = StrategyStats::default();

        stats.record_run(50, 10, now);
        assert_eq!(stats.weight, 2.0);

        stats.record_run(0, 10, now);
        assert_eq!(stats.weight, 0.1);
    }
}
