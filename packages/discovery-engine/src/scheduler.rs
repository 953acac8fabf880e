use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::types::{StrategyKind, StrategyStats};

/// Deterministic strategy rotation over the performance records.
///
/// A technique that has never run is always selected first, in
/// registration order. Otherwise the highest
/// `weight * (1 + recency_bonus)` wins, where the bonus grows linearly
/// from 0 to 1.0 over 24 hours since last use, so a technique idle for a
/// day gets preferential reselection even when historically weaker. Ties
/// break by registration order. No randomness here; jitter and keyword
/// sampling live inside the strategies themselves.
#[derive(Debug, Clone)]
pub struct StrategyScheduler {
    order: Vec<StrategyKind>,
}

impl Default for StrategyScheduler {
    fn default() -> Self {
        Self {
            order: StrategyKind::ALL.to_vec(),
        }
    }
}

impl StrategyScheduler {
    pub fn new(order: Vec<StrategyKind>) -> Self {
        Self { order }
    }

    pub fn registered(&self) -> &[StrategyKind] {
        &self.order
    }

    pub fn next_strategy(
        &self,
        stats: &BTreeMap<StrategyKind, StrategyStats>,
        now: DateTime<Utc>,
    ) -> StrategyKind {
        // Never-used techniques take absolute precedence.
        for kind in &self.order {
            let used = stats.get(kind).and_then(|s| s.last_used).is_some();
            if !used {
                return *kind;
            }
        }

        let mut best = self.order[0];
        let mut best_score = f64::MIN;
        for kind in &self.order {
            let record = stats.get(kind).cloned().unwrap_or_default();
            let recency_bonus = match record.last_used {
                Some(last) => {
                    let hours = (now - last).num_seconds() as f64 / 3600.0;
                    (hours / 24.0).clamp(0.0, 1.0)
                }
                None => 1.0,
            };
            let score = record.weight.clamp(0.1, 2.0) * (1.0 + recency_bonus);
            if score > best_score {
                best_score = score;
                best = *kind;
            }
        }
        tracing::debug!(strategy = %best, score = best_score, "selected next strategy");
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn stats_for(
        entries: &[(StrategyKind, f64, Option<DateTime<Utc>>)],
    ) -> BTreeMap<StrategyKind, StrategyStats> {
        entries
            .iter()
            .map(|(kind, weight, last_used)| {
                (
                    *kind,
                    StrategyStats {
                        success_rate: weight / 2.0,
                        weight: *weight,
                        last_used: *last_used,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn never_used_strategy_wins_over_recently_used() {
        let scheduler = StrategyScheduler::new(vec![
            StrategyKind::KeywordSearch,
            StrategyKind::TrendingTags,
        ]);
        let now = Utc::now();
        // TrendingTags is strong and used an hour ago; KeywordSearch has
        // never run and must still be chosen.
        let stats = stats_for(&[(
            StrategyKind::TrendingTags,
            0.8,
            Some(now - Duration::hours(1)),
        )]);

        assert_eq!(
            scheduler.next_strategy(&stats, now),
            StrategyKind::KeywordSearch
        );
    }

    #[test]
    fn idle_strategy_overtakes_stronger_recent_one() {
        let scheduler = StrategyScheduler::new(vec![
            StrategyKind::KeywordSearch,
            StrategyKind::TrendingTags,
        ]);
        let now = Utc::now();
        let stats = stats_for(&[
            // Weak but idle for over a day: 0.5 * 2.0 = 1.0.
            (
                StrategyKind::KeywordSearch,
                0.5,
                Some(now - Duration::hours(30)),
            ),
            // Strong but just used: 0.9 * 1.0 = 0.9.
            (StrategyKind::TrendingTags, 0.9, Some(now)),
        ]);

        assert_eq!(
            scheduler.next_strategy(&stats, now),
            StrategyKind::KeywordSearch
        );
    }

    #[test]
    fn selection_is_deterministic_for_equal_snapshots() {
        let scheduler = StrategyScheduler::default();
        let now = Utc::now();
        let stats = stats_for(
            &StrategyKind::ALL
                .iter()
                .map(|k| (*k, 1.0, Some(now - Duration::hours(2))))
                .collect::<Vec<_>>(),
        );

        let first = scheduler.next_strategy(&stats, now);
        for _ in 0..5 {
            assert_eq!(scheduler.next_strategy(&stats, now), first);
        }
        // All equal: registration order breaks the tie.
        assert_eq!(first, StrategyKind::KeywordSearch);
    }

    #[test]
    fn weight_is_clamped_into_range() {
        let scheduler = StrategyScheduler::new(vec![
            StrategyKind::KeywordSearch,
            StrategyKind::PopularSampling,
        ]);
        let now = Utc::now();
        let stats = stats_for(&[
            // Absurd weight clamps down to 2.0.
            (StrategyKind::KeywordSearch, 50.0, Some(now)),
            // Gets the full recency bonus: 2.0 * 2.0 beats 2.0 * 1.0.
            (
                StrategyKind::PopularSampling,
                50.0,
                Some(now - Duration::hours(48)),
            ),
        ]);

        assert_eq!(
            scheduler.next_strategy(&stats, now),
            StrategyKind::PopularSampling
        );
    }
}
