use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::category::CategoryKeywords;
use crate::scorer::RelevanceProfile;

/// Engine tuning knobs, passed explicitly into the orchestrator.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Stop once this many channels are validated in total.
    pub target_total: usize,
    /// Validate once this many discovered-but-unvalidated ids accumulate.
    pub batch_threshold: usize,
    /// Ids per bulk lookup call (the API caps this at 50).
    pub lookup_batch: usize,
    /// Region code for search and chart calls.
    pub region: String,
    /// Per-strategy new-candidate budgets for one pass.
    pub keyword_search_budget: usize,
    pub long_tail_budget: usize,
    pub trending_budget: usize,
    pub graph_budget: usize,
    pub recency_budget: usize,
    /// Long-tail keyword pool is sampled down to this many queries.
    pub long_tail_keyword_cap: usize,
    /// Graph expansion seed and fan-out bounds.
    pub graph_seed_cap: usize,
    pub graph_videos_per_seed: u32,
    pub graph_playlists_per_seed: u32,
    /// Randomized courtesy delay between successive external calls.
    pub jitter_min_ms: u64,
    pub jitter_max_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            target_total: 10_000,
            batch_threshold: 100,
            lookup_batch: youtube_client::MAX_LOOKUP_BATCH,
            region: "LK".to_string(),
            keyword_search_budget: 500,
            long_tail_budget: 300,
            trending_budget: 200,
            graph_budget: 200,
            recency_budget: 200,
            long_tail_keyword_cap: 50,
            graph_seed_cap: 10,
            graph_videos_per_seed: 5,
            graph_playlists_per_seed: 10,
            jitter_min_ms: 300,
            jitter_max_ms: 700,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_target(mut self, target: usize) -> Self {
        self.target_total = target;
        self
    }

    pub fn with_jitter_ms(mut self, min: u64, max: u64) -> Self {
        self.jitter_min_ms = min;
        self.jitter_max_ms = max;
        self
    }
}

/// Versioned seed-list resource: every piece of domain data the engine
/// needs, injected as one JSON document. The engine itself hardcodes none
/// of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResource {
    pub version: u32,
    /// Plain search keywords.
    pub keywords: Vec<String>,
    /// Long-tail combination term sets.
    pub long_tail: LongTailTerms,
    /// Curated trending tags for recent-video search.
    pub trending_tags: Vec<String>,
    /// Recency-oriented search terms for the time-windowed strategy.
    pub recency_terms: Vec<String>,
    /// Relevance-scoring profile.
    pub relevance: RelevanceProfile,
    /// Category keyword table for the classifier.
    pub categories: Vec<CategoryKeywords>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongTailTerms {
    pub base_terms: Vec<String>,
    pub locations: Vec<String>,
    pub topics: Vec<String>,
    pub modifiers: Vec<String>,
}

impl SeedResource {
    pub fn from_json(raw: &str) -> Result<Self> {
        let resource: SeedResource =
            serde_json::from_str(raw).context("failed to parse seed resource")?;
        if resource.keywords.is_empty() {
            anyhow::bail!("seed resource has no search keywords");
        }
        Ok(resource)
    }
}

#[cfg(test)]
impl SeedResource {
    pub fn test_seeds() -> Self {
        Self {
            version: 1,
            keywords: vec!["lanka".to_string()],
            long_tail: LongTailTerms {
                base_terms: vec!["sri lanka".to_string(), "lanka".to_string()],
                locations: vec!["colombo".to_string(), "kandy".to_string()],
                topics: vec!["vlog".to_string(), "news".to_string()],
                modifiers: vec!["latest".to_string()],
            },
            trending_tags: vec!["#SriLanka".to_string()],
            recency_terms: vec!["sri lanka latest".to_string()],
            relevance: crate::scorer::RelevanceProfile::test_profile(),
            categories: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_resource_parses_from_json() {
        let raw = r##"{
            "version": 3,
            "keywords": ["sri lanka", "colombo vlog"],
            "long_tail": {
                "base_terms": ["sri lanka"],
                "locations": ["colombo"],
                "topics": ["food"],
                "modifiers": ["latest"]
            },
            "trending_tags": ["#SriLanka2025"],
            "recency_terms": ["sri lanka today"],
            "relevance": {
                "high_value": ["sri lanka"],
                "medium_value": ["colombo"],
                "cultural": ["machang"],
                "target_country": "LK",
                "accepted_languages": ["si", "ta"],
                "threshold": 1.0
            },
            "categories": [
                { "category": "music", "terms": ["song"] }
            ]
        }"##;
        let seeds = SeedResource::from_json(raw).unwrap();
        assert_eq!(seeds.version, 3);
        assert_eq!(seeds.keywords.len(), 2);
        assert_eq!(seeds.relevance.threshold, 1.0);
    }

    #[test]
    fn empty_keywords_rejected() {
        let raw = r#"{
            "version": 1,
            "keywords": [],
            "long_tail": { "base_terms": [], "locations": [], "topics": [], "modifiers": [] },
            "trending_tags": [],
            "recency_terms": [],
            "relevance": {
                "high_value": [], "medium_value": [], "cultural": [],
                "target_country": "LK", "accepted_languages": [], "threshold": 1.0
            },
            "categories": []
        }"#;
        assert!(SeedResource::from_json(raw).is_err());
    }
}
