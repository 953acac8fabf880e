use super::{jitter, Collector, StrategyContext, StrategyOutcome};

/// Graph expansion: walk out from recently discovered channels to the
/// people around them. For each seed channel we sample its newest uploads,
/// collect the authors commenting on those uploads, and collect the owner
/// channels of items in the seed's playlists. Depth is fixed at two hops
/// (seed → content → second-order channel) so fan-out stays bounded.
///
/// Comment mining routinely hits videos with comments disabled; that comes
/// back as a per-call rejection and only costs the one call.
pub async fn run(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let seeds = &ctx.graph_seeds[..ctx.graph_seeds.len().min(ctx.config.graph_seed_cap)];
    let mut collector = Collector::new(ctx.dedup, ctx.config.graph_budget);
    if seeds.is_empty() {
        tracing::debug!("no graph seeds yet, skipping expansion");
        return collector.finish();
    }

    'seeds: for seed in seeds {
        if collector.full() {
            break;
        }

        let videos = match ctx
            .api
            .channel_recent_videos(seed, ctx.config.graph_videos_per_seed)
            .await
        {
            Ok(videos) => videos,
            Err(err) => {
                if collector.absorb_error(&err) {
                    break;
                }
                continue;
            }
        };
        collector.absorb(videos.iter().filter_map(|hit| hit.channel_id.clone()));
        jitter(ctx.config).await;

        for video in &videos {
            if collector.full() {
                break 'seeds;
            }
            match ctx.api.comment_authors(&video.video_id, 50).await {
                Ok(authors) => collector.absorb(authors),
                Err(err) => {
                    if collector.absorb_error(&err) {
                        break 'seeds;
                    }
                }
            }
            jitter(ctx.config).await;
        }

        let playlists = match ctx
            .api
            .channel_playlists(seed, ctx.config.graph_playlists_per_seed)
            .await
        {
            Ok(playlists) => playlists,
            Err(err) => {
                if collector.absorb_error(&err) {
                    break;
                }
                continue;
            }
        };
        collector.note_call();
        jitter(ctx.config).await;

        for playlist_id in &playlists {
            if collector.full() {
                break 'seeds;
            }
            match ctx.api.playlist_item_owners(playlist_id, 50).await {
                Ok(owners) => collector.absorb(owners),
                Err(err) => {
                    if collector.absorb_error(&err) {
                        break 'seeds;
                    }
                }
            }
            jitter(ctx.config).await;
        }
    }
    collector.finish()
}

#[cfg(test)]
mod tests {
    use super::super::testing::FakeApi;
    use super::*;
    use crate::config::{DiscoveryConfig, SeedResource};
    use crate::dedup::DedupIndex;
    use crate::types::ChannelId;

    #[tokio::test]
    async fn no_seeds_means_no_calls() {
        let api = FakeApi::returning(vec!["UCa"]);
        let seeds = SeedResource::test_seeds();
        let config = DiscoveryConfig::default().with_jitter_ms(0, 0);
        let dedup = DedupIndex::new([]);
        let ctx = StrategyContext {
            api: &api,
            seeds: &seeds,
            config: &config,
            dedup: &dedup,
            graph_seeds: &[],
        };

        let outcome = run(&ctx).await;
        assert_eq!(outcome.api_calls, 0);
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn expands_seed_channels_to_second_order_ids() {
        let api = FakeApi::returning(vec!["UCcommenter", "UCowner"]);
        let seeds = SeedResource::test_seeds();
        let config = DiscoveryConfig::default().with_jitter_ms(0, 0);
        let dedup = DedupIndex::new([]);
        let graph_seeds = vec![ChannelId("UCseed".to_string())];
        let ctx = StrategyContext {
            api: &api,
            seeds: &seeds,
            config: &config,
            dedup: &dedup,
            graph_seeds: &graph_seeds,
        };

        let outcome = run(&ctx).await;
        assert!(outcome
            .new_ids
            .contains(&ChannelId("UCcommenter".to_string())));
        assert!(!outcome.quota_exhausted);
        assert!(outcome.api_calls > 1);
    }
}
