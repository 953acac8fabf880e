use super::{jitter, Collector, StrategyContext, StrategyOutcome};

/// Plain keyword search: one channel-type search call per seed keyword.
pub async fn run(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let mut collector = Collector::new(ctx.dedup, ctx.config.keyword_search_budget);
    for keyword in &ctx.seeds.keywords {
        if collector.full() {
            break;
        }
        match ctx
            .api
            .search_channels(keyword, &ctx.config.region, 50)
            .await
        {
            Ok(ids) => collector.absorb(ids),
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
