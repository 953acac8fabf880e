use std::collections::HashSet;

use anyhow::Result;
use chrono::Utc;
use youtube_client::ApiError;

use crate::category::CategoryClassifier;
use crate::config::{DiscoveryConfig, SeedResource};
use crate::dedup::DedupIndex;
use crate::scheduler::StrategyScheduler;
use crate::store::StateStore;
use crate::strategies::{self, StrategyContext};
use crate::traits::ChannelApi;
use crate::types::{
    ChannelId, SessionReport, StrategyKind, TerminationReason, ValidatedChannel,
};

/// Top-level control loop: pick a strategy, run it, persist its yield,
/// batch-validate the backlog, repeat until the target is met or the key
/// pool is spent.
///
/// After every iteration the durable state is a safe resume point, so the
/// process can be killed at any step boundary and re-invoked later.
pub struct Orchestrator<'a> {
    api: &'a dyn ChannelApi,
    seeds: &'a SeedResource,
    config: DiscoveryConfig,
    scheduler: StrategyScheduler,
    classifier: CategoryClassifier,
    store: StateStore,
    dedup: DedupIndex,
    /// Ids already looked up this session, including ones that scored
    /// below threshold. Keeps one session from re-fetching its own
    /// rejects; across sessions the backlog is recomputed from disk.
    checked: HashSet<ChannelId>,
    api_calls: u32,
    session_discovered: usize,
    session_validated: usize,
    strategies_attempted: Vec<StrategyKind>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        api: &'a dyn ChannelApi,
        seeds: &'a SeedResource,
        config: DiscoveryConfig,
        store: StateStore,
    ) -> Self {
        let dedup = DedupIndex::new(store.known_ids());
        let classifier = CategoryClassifier::new(seeds.categories.clone());
        Self {
            api,
            seeds,
            config,
            scheduler: StrategyScheduler::default(),
            classifier,
            store,
            dedup,
            checked: HashSet::new(),
            api_calls: 0,
            session_discovered: 0,
            session_validated: 0,
            strategies_attempted: Vec::new(),
        }
    }

    /// Run one session to completion.
    ///
    /// Quota exhaustion is an expected termination, not an error: whatever
    /// was accumulated is already persisted and the next invocation picks
    /// up from it. `Err` only surfaces unrecoverable local failures such
    /// as an unwritable output directory.
    pub async fn run(mut self) -> Result<SessionReport> {
        tracing::info!(
            session = self.store.session_id(),
            target = self.config.target_total,
            discovered = self.store.discovered_count(),
            validated = self.store.validated_count(),
            "starting discovery session"
        );

        // A resumed session inherits its predecessor's unvalidated ids;
        // work that backlog off before spending quota on new discovery.
        if self.pending_backlog().len() >= self.config.batch_threshold {
            let (validated, exhausted) = self.validate_backlog().await?;
            self.session_validated += validated;
            if exhausted {
                return self.finish(TerminationReason::QuotaExhausted);
            }
        }

        let mut idle_rounds = 0usize;
        let reason = loop {
            if self.store.validated_count() >= self.config.target_total {
                break TerminationReason::TargetReached;
            }

            let strategy = self
                .scheduler
                .next_strategy(self.store.strategy_stats(), Utc::now());
            if !self.strategies_attempted.contains(&strategy) {
                self.strategies_attempted.push(strategy);
            }

            let graph_seeds = self.store.recent_discovered(self.config.graph_seed_cap);
            let outcome = {
                let ctx = StrategyContext {
                    api: self.api,
                    seeds: self.seeds,
                    config: &self.config,
                    dedup: &self.dedup,
                    graph_seeds: &graph_seeds,
                };
                strategies::run_strategy(strategy, &ctx).await
            };
            self.api_calls += outcome.api_calls;

            // Persist discovered ids before validation, so even a pass
            // that never reaches validation is not rediscovered next run.
            self.dedup.mark_all(outcome.new_ids.iter().cloned());
            let added = self.store.save_discovered(&outcome.new_ids, strategy)?;
            self.session_discovered += added;

            let mut validated_this_pass = 0;
            let mut exhausted = outcome.quota_exhausted;
            if !exhausted && self.pending_backlog().len() >= self.config.batch_threshold {
                let (validated, hit_wall) = self.validate_backlog().await?;
                validated_this_pass = validated;
                exhausted = hit_wall;
            }
            self.session_validated += validated_this_pass;
            self.store.record_strategy_run(
                strategy,
                validated_this_pass,
                outcome.api_calls,
                Utc::now(),
            )?;

            if exhausted {
                break TerminationReason::QuotaExhausted;
            }
            if added == 0 && validated_this_pass == 0 {
                idle_rounds += 1;
            } else {
                idle_rounds = 0;
            }
            if idle_rounds >= self.scheduler.registered().len() {
                break TerminationReason::Drained;
            }
        };

        // Drained runs flush the sub-threshold remainder instead of
        // leaving it for a session that may never come.
        let reason = if reason == TerminationReason::Drained {
            let (validated, exhausted) = self.validate_backlog().await?;
            self.session_validated += validated;
            if exhausted {
                TerminationReason::QuotaExhausted
            } else {
                reason
            }
        } else {
            reason
        };

        self.finish(reason)
    }

    /// Discovered-but-unvalidated ids not yet looked up this session.
    fn pending_backlog(&self) -> Vec<ChannelId> {
        self.store
            .unvalidated_ids()
            .into_iter()
            .filter(|id| !self.checked.contains(id))
            .collect()
    }

    /// Bulk-look-up the backlog in API-sized chunks, score each resource
    /// and persist every chunk's survivors immediately. Returns the number
    /// validated and whether the key pool died mid-backlog.
    async fn validate_backlog(&mut self) -> Result<(usize, bool)> {
        let backlog = self.pending_backlog();
        if backlog.is_empty() {
            return Ok((0, false));
        }
        tracing::info!(pending = backlog.len(), "validating channel backlog");

        let mut validated_total = 0;
        for chunk in backlog.chunks(self.config.lookup_batch) {
            let resources = match self.api.lookup_channels(chunk).await {
                Ok(resources) => {
                    self.api_calls += 1;
                    resources
                }
                Err(ApiError::AllKeysExhausted) => {
                    return Ok((validated_total, true));
                }
                Err(err) => {
                    self.api_calls += 1;
                    tracing::warn!(%err, size = chunk.len(), "lookup batch failed, skipping");
                    self.checked.extend(chunk.iter().cloned());
                    continue;
                }
            };

            let now = Utc::now();
            let batch: Vec<ValidatedChannel> = resources
                .iter()
                .filter_map(|resource| {
                    let id = ChannelId::from(resource.id.clone());
                    ValidatedChannel::from_resource(
                        resource,
                        &self.seeds.relevance,
                        &self.classifier,
                        self.store.source_of(&id),
                        now,
                    )
                })
                .collect();
            let kept = batch.len();
            let added = self.store.save_validated(batch)?;
            validated_total += added;
            self.checked.extend(chunk.iter().cloned());
            tracing::info!(looked_up = chunk.len(), kept, added, "validated channel batch");
            strategies::jitter(&self.config).await;
        }
        Ok((validated_total, false))
    }

    fn finish(mut self, reason: TerminationReason) -> Result<SessionReport> {
        if reason == TerminationReason::QuotaExhausted {
            self.store.mark_quota_exhausted()?;
        }

        let quota = self.api.quota_status();
        tracing::info!(
            units_spent = quota.total_units,
            available_keys = quota.available_keys(),
            reason = ?reason,
            discovered = self.session_discovered,
            validated = self.session_validated,
            total_validated = self.store.validated_count(),
            api_calls = self.api_calls,
            "discovery session finished"
        );

        Ok(SessionReport {
            session_id: self.store.session_id().to_string(),
            discovered_this_session: self.session_discovered,
            validated_this_session: self.session_validated,
            total_discovered: self.store.discovered_count(),
            total_validated: self.store.validated_count(),
            api_calls: self.api_calls,
            quota,
            strategies_attempted: self.strategies_attempted,
            termination: reason,
        })
    }
}
