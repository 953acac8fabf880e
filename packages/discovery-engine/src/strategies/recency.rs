use chrono::{Duration, Utc};

use super::{jitter, Collector, StrategyContext, StrategyOutcome};

/// Time-windowed recency search: the same seed terms replayed against
/// explicit 24h/7d/30d windows. Relevance-ranked search buries newly
/// active channels; restricting the publish window surfaces them.
pub async fn run(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let windows = [
        Duration::hours(24),
        Duration::days(7),
        Duration::days(30),
    ];
    let now = Utc::now();
    let mut collector = Collector::new(ctx.dedup, ctx.config.recency_budget);

    'windows: for window in windows {
        let window_start = now - window;
        for term in &ctx.seeds.recency_terms {
            if collector.full() {
                break 'windows;
            }
            match ctx
                .api
                .search_videos(term, &ctx.config.region, Some(window_start), 25)
                .await
            {
                Ok(hits) => {
                    collector.absorb(hits.into_iter().filter_map(|hit| hit.channel_id))
                }
                Err(err) => {
                    if collector.absorb_error(&err) {
                        break 'windows;
                    }
                }
            }
            jitter(ctx.config).await;
        }
    }
    collector.finish()
}
