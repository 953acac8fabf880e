//! The discovery techniques the scheduler rotates between.
//!
//! Each technique is a self-contained async function over the
//! [`ChannelApi`] seam: it issues its own calls, keeps only ids the dedup
//! index has never seen, stops early once its candidate budget is met, and
//! absorbs key-pool exhaustion by returning whatever it accumulated so far.

pub mod graph;
pub mod keyword;
pub mod long_tail;
pub mod popular;
pub mod recency;
pub mod trending;

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use youtube_client::ApiError;

use crate::config::{DiscoveryConfig, SeedResource};
use crate::dedup::DedupIndex;
use crate::traits::ChannelApi;
use crate::types::{ChannelId, StrategyKind};

/// What one strategy pass produced.
#[derive(Debug, Default)]
pub struct StrategyOutcome {
    pub new_ids: HashSet<ChannelId>,
    pub api_calls: u32,
    /// The key pool died mid-pass; the orchestrator must wind down.
    pub quota_exhausted: bool,
}

/// Everything a strategy pass needs, borrowed from the orchestrator.
pub struct StrategyContext<'a> {
    pub api: &'a dyn ChannelApi,
    pub seeds: &'a SeedResource,
    pub config: &'a DiscoveryConfig,
    pub dedup: &'a DedupIndex,
    /// Most recently discovered channels, used as graph-expansion seeds.
    pub graph_seeds: &'a [ChannelId],
}

/// Dispatch one pass of the named technique.
pub async fn run_strategy(kind: StrategyKind, ctx: &StrategyContext<'_>) -> StrategyOutcome {
    tracing::info!(strategy = %kind, "running discovery strategy");
    let outcome = match kind {
        StrategyKind::KeywordSearch => keyword::run(ctx).await,
        StrategyKind::LongTailKeywords => long_tail::run(ctx).await,
        StrategyKind::TrendingTags => trending::run(ctx).await,
        StrategyKind::GraphExpansion => graph::run(ctx).await,
        StrategyKind::PopularSampling => popular::run(ctx).await,
        StrategyKind::RecencyWindows => recency::run(ctx).await,
    };
    tracing::info!(
        strategy = %kind,
        new = outcome.new_ids.len(),
        calls = outcome.api_calls,
        exhausted = outcome.quota_exhausted,
        "strategy pass finished"
    );
    outcome
}

/// Shared accumulator: budget enforcement, dedup filtering and the
/// exhaustion short-circuit live here so every strategy behaves the same.
pub(crate) struct Collector<'a> {
    dedup: &'a DedupIndex,
    budget: usize,
    outcome: StrategyOutcome,
}

impl<'a> Collector<'a> {
    pub(crate) fn new(dedup: &'a DedupIndex, budget: usize) -> Self {
        Self {
            dedup,
            budget,
            outcome: StrategyOutcome::default(),
        }
    }

    /// Record a call that yields no channel ids of its own.
    pub(crate) fn note_call(&mut self) {
        self.outcome.api_calls += 1;
    }

    /// Record one issued call and keep the unseen ids from its result.
    pub(crate) fn absorb(&mut self, ids: impl IntoIterator<Item = ChannelId>) {
        self.outcome.api_calls += 1;
        for id in ids {
            if self.full() {
                break;
            }
            if !self.dedup.is_known(&id) {
                self.outcome.new_ids.insert(id);
            }
        }
    }

    /// Record a failed call. Returns `true` when the strategy must stop
    /// because the whole key pool is spent; any other failure only costs
    /// this one call.
    pub(crate) fn absorb_error(&mut self, err: &ApiError) -> bool {
        if matches!(err, ApiError::AllKeysExhausted) {
            self.outcome.quota_exhausted = true;
            return true;
        }
        self.outcome.api_calls += 1;
        tracing::debug!(%err, "discovery call failed, skipping");
        false
    }

    pub(crate) fn full(&self) -> bool {
        self.outcome.new_ids.len() >= self.budget
    }

    pub(crate) fn finish(self) -> StrategyOutcome {
        self.outcome
    }
}

/// Randomized courtesy delay between successive external calls.
pub(crate) async fn jitter(config: &DiscoveryConfig) {
    if config.jitter_max_ms == 0 {
        return;
    }
    let ms = rand::thread_rng().gen_range(config.jitter_min_ms..=config.jitter_max_ms);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
