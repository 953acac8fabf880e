use rand::seq::SliceRandom;

use super::{jitter, Collector, StrategyContext, StrategyOutcome};
use crate::config::LongTailTerms;

/// Long-tail combination search: cartesian-product the seed term sets into
/// a large query pool, then randomly sample it down before spending quota.
/// The sampling is the only randomness; everything downstream is ordinary
/// keyword search.
pub async fn run(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let mut pool = keyword_pool(&ctx.seeds.long_tail);
    pool.shuffle(&mut rand::thread_rng());
    pool.truncate(ctx.config.long_tail_keyword_cap);
    tracing::debug!(queries = pool.len(), "sampled long-tail query pool");

    let mut collector = Collector::new(ctx.dedup, ctx.config.long_tail_budget);
    for query in &pool {
        if collector.full() {
            break;
        }
        match ctx.api.search_channels(query, &ctx.config.region, 50).await {
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

fn keyword_pool(terms: &LongTailTerms) -> Vec<String> {
    let mut pool = Vec::new();
    for base in &terms.base_terms {
        for location in &terms.locations {
            pool.push(format!("{base} {location}"));
        }
        for topic in &terms.topics {
            pool.push(format!("{base} {topic}"));
            for modifier in &terms.modifiers {
                pool.push(format!("{base} {topic} {modifier}"));
            }
        }
    }
    pool
}
