use chrono::{Duration, Utc};

use super::{jitter, Collector, StrategyContext, StrategyOutcome};

/// Trending-tag search: recent videos (last 30 days) matching curated
/// tags, keeping the uploading channel rather than the video itself.
pub async fn run(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let window_start = Utc::now() - Duration::days(30);
    let mut collector = Collector::new(ctx.dedup, ctx.config.trending_budget);
    for tag in &ctx.seeds.trending_tags {
        if collector.full() {
            break;
        }
        match ctx
            .api
            .search_videos(tag, &ctx.config.region, Some(window_start), 50)
            .await
        {
            Ok(hits) => collector.absorb(hits.into_iter().filter_map(|hit| hit.channel_id)),
            Err(err) => {
                if collector.absorb_error(&err) {
                    break;
                }
            }
        }
        jitter(ctx.config).await;
    }
    collector.finish()
}
