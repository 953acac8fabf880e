//! Quota-aware, resumable channel discovery engine.
//!
//! Six independent discovery techniques feed candidate channel ids into a
//! dedup index; a deterministic scheduler decides which technique runs
//! next based on historical yield and time since last use; candidates are
//! bulk-looked-up in batches, relevance-scored, categorized and persisted
//! through a progressive JSON state store. Every state-store write is a
//! safe resume point, so a run killed by quota exhaustion continues from
//! exactly where it stopped on the next invocation.
//!
//! The engine talks to the service only through the [`ChannelApi`] trait,
//! backed in production by `youtube_client::YouTubeClient`.

pub mod category;
pub mod config;
pub mod dedup;
pub mod orchestrator;
pub mod scheduler;
pub mod scorer;
pub mod store;
pub mod strategies;
pub mod traits;
pub mod types;

pub use category::{Category, CategoryClassifier, CategoryKeywords};
pub use config::{DiscoveryConfig, LongTailTerms, SeedResource};
pub use dedup::DedupIndex;
pub use orchestrator::Orchestrator;
pub use scheduler::StrategyScheduler;
pub use scorer::RelevanceProfile;
pub use store::StateStore;
pub use traits::{ChannelApi, VideoHit};
pub use types::{
    ChannelId, DiscoveryProgress, SessionReport, StrategyKind, StrategyStats,
    TerminationReason, ValidatedChannel,
};
