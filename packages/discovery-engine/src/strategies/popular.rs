use super::{Collector, StrategyContext, StrategyOutcome};

/// Popularity-chart sampling: one cheap chart call for the region. Never
/// a big yield, but at one unit per pass it is effectively free, so the
/// scheduler keeps it in rotation as a trickle source.
pub async fn run(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let mut collector = Collector::new(ctx.dedup, 50);
    match ctx.api.most_popular_videos(&ctx.config.region, 50).await {
        Ok(hits) => collector.absorb(hits.into_iter().filter_map(|hit| hit.channel_id)),
        Err(err) => {
            collector.absorb_error(&err);
        }
    }
    collector.finish()
}
