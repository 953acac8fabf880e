use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{
    ChannelId, DiscoveryProgress, StrategyKind, StrategyStats, ValidatedChannel,
};

const DISCOVERED_FILE: &str = "discovered_ids.json";
const VALIDATED_FILE: &str = "validated_channels.json";
const PROGRESS_FILE: &str = "discovery_progress.json";
const STATS_FILE: &str = "strategy_stats.json";
const CATEGORY_FILE: &str = "channels_by_category.json";

/// Durable document behind `discovered_ids.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DiscoveredDoc {
    #[serde(default)]
    channel_ids: Vec<ChannelId>,
    /// Which technique first surfaced each id.
    #[serde(default)]
    sources: BTreeMap<ChannelId, StrategyKind>,
    #[serde(default)]
    total_count: usize,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    last_strategy: Option<StrategyKind>,
    #[serde(default)]
    session_id: String,
}

/// Durable document behind `validated_channels.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ValidatedDoc {
    #[serde(default)]
    channels: Vec<ValidatedChannel>,
    #[serde(default)]
    total_count: usize,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    session_id: String,
}

/// Category label → { channel title → channel id }. The only interface the
/// downstream ETL and dashboard read.
type CategoryIndex = BTreeMap<String, BTreeMap<String, String>>;

/// Progressive state store: exclusive owner of all durable discovery state
/// under one output directory.
///
/// Every save is a full rewrite of the affected document through a temp
/// file plus atomic rename; in-memory state only advances once the rename
/// lands, so durable and reported counts never diverge. Unreadable or
/// legacy-format files degrade to a fresh empty document instead of
/// crashing.
pub struct StateStore {
    dir: PathBuf,
    session_id: String,
    discovered: Vec<ChannelId>,
    discovered_set: HashSet<ChannelId>,
    sources: BTreeMap<ChannelId, StrategyKind>,
    validated: Vec<ValidatedChannel>,
    validated_ids: HashSet<ChannelId>,
    progress: DiscoveryProgress,
    stats: BTreeMap<StrategyKind, StrategyStats>,
    categories: CategoryIndex,
}

impl StateStore {
    /// Open (or initialize) the store for an output directory and begin a
    /// new session.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;

        let now = Utc::now();
        let session_id = now.format("%Y%m%d_%H%M%S").to_string();

        let discovered_doc: DiscoveredDoc = load_or_default(&dir.join(DISCOVERED_FILE));
        let validated_doc: ValidatedDoc = load_or_default(&dir.join(VALIDATED_FILE));
        let stats: BTreeMap<StrategyKind, StrategyStats> =
            load_or_default(&dir.join(STATS_FILE));
        let categories: CategoryIndex = load_or_default(&dir.join(CATEGORY_FILE));
        let mut progress = match load_optional::<DiscoveryProgress>(&dir.join(PROGRESS_FILE)) {
            Some(progress) => progress,
            None => DiscoveryProgress::fresh(session_id.clone(), now),
        };

        let discovered_set: HashSet<ChannelId> =
            discovered_doc.channel_ids.iter().cloned().collect();
        let validated_ids: HashSet<ChannelId> = validated_doc
            .channels
            .iter()
            .map(|c| c.channel_id.clone())
            .collect();

        progress.session_id = session_id.clone();
        progress.total_sessions += 1;
        progress.quota_exhausted = false;
        progress.total_discovered = discovered_set.len();
        progress.total_validated = validated_ids.len();
        progress.last_updated = now;

        let mut store = Self {
            dir: dir.to_path_buf(),
            session_id,
            discovered: discovered_doc.channel_ids,
            discovered_set,
            sources: discovered_doc.sources,
            validated: validated_doc.channels,
            validated_ids,
            progress,
            stats,
            categories,
        };
        store.save_progress()?;

        tracing::info!(
            dir = %store.dir.display(),
            discovered = store.discovered.len(),
            validated = store.validated.len(),
            session = store.progress.total_sessions,
            "opened state store"
        );
        Ok(store)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    pub fn validated_count(&self) -> usize {
        self.validated.len()
    }

    pub fn progress(&self) -> &DiscoveryProgress {
        &self.progress
    }

    pub fn strategy_stats(&self) -> &BTreeMap<StrategyKind, StrategyStats> {
        &self.stats
    }

    /// Which technique first surfaced this id, if recorded.
    pub fn source_of(&self, id: &ChannelId) -> Option<StrategyKind> {
        self.sources.get(id).copied()
    }

    /// Every id the engine has ever seen, across all durable documents.
    /// Seeds the dedup index at startup.
    pub fn known_ids(&self) -> HashSet<ChannelId> {
        let mut known = self.discovered_set.clone();
        known.extend(self.validated_ids.iter().cloned());
        for channels in self.categories.values() {
            known.extend(channels.values().map(|id| ChannelId(id.clone())));
        }
        known
    }

    /// Discovered ids not yet validated, in discovery order. The exact
    /// backlog a resumed run must continue from.
    pub fn unvalidated_ids(&self) -> Vec<ChannelId> {
        self.discovered
            .iter()
            .filter(|id| !self.validated_ids.contains(id))
            .cloned()
            .collect()
    }

    /// Most recently discovered ids, used as graph-expansion seeds.
    pub fn recent_discovered(&self, n: usize) -> Vec<ChannelId> {
        let start = self.discovered.len().saturating_sub(n);
        self.discovered[start..].to_vec()
    }

    /// Persist newly discovered ids. Returns how many were actually new.
    pub fn save_discovered(
        &mut self,
        new_ids: &HashSet<ChannelId>,
        strategy: StrategyKind,
    ) -> Result<usize> {
        let fresh: Vec<ChannelId> = new_ids
            .iter()
            .filter(|id| !self.discovered_set.contains(*id))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        // Stage the full rewrite; commit memory only after the rename.
        let mut staged_ids = self.discovered.clone();
        staged_ids.extend(fresh.iter().cloned());
        let mut staged_sources = self.sources.clone();
        for id in &fresh {
            staged_sources.insert(id.clone(), strategy);
        }

        let doc = DiscoveredDoc {
            total_count: staged_ids.len(),
            channel_ids: staged_ids,
            sources: staged_sources,
            last_updated: Some(Utc::now()),
            last_strategy: Some(strategy),
            session_id: self.session_id.clone(),
        };
        self.write_json(DISCOVERED_FILE, &doc)?;

        self.discovered = doc.channel_ids;
        self.sources = doc.sources;
        self.discovered_set
            .extend(fresh.iter().cloned());

        self.progress.total_discovered = self.discovered.len();
        self.progress.last_strategy = Some(strategy);
        if !self.progress.strategies_used.contains(&strategy) {
            self.progress.strategies_used.push(strategy);
        }
        self.save_progress()?;

        tracing::info!(
            new = fresh.len(),
            total = self.discovered.len(),
            strategy = %strategy,
            "saved discovered ids"
        );
        Ok(fresh.len())
    }

    /// Persist a batch of validated channels and merge the category index.
    /// Ids already validated are skipped, so an identifier can never appear
    /// twice in the validated document. Returns how many were added.
    pub fn save_validated(&mut self, batch: Vec<ValidatedChannel>) -> Result<usize> {
        let mut fresh: Vec<ValidatedChannel> = Vec::new();
        let mut seen_in_batch: HashSet<ChannelId> = HashSet::new();
        for channel in batch {
            if self.validated_ids.contains(&channel.channel_id)
                || !seen_in_batch.insert(channel.channel_id.clone())
            {
                continue;
            }
            fresh.push(channel);
        }
        if fresh.is_empty() {
            return Ok(0);
        }

        let mut staged = self.validated.clone();
        staged.extend(fresh.iter().cloned());
        let doc = ValidatedDoc {
            total_count: staged.len(),
            channels: staged,
            last_updated: Some(Utc::now()),
            session_id: self.session_id.clone(),
        };
        self.write_json(VALIDATED_FILE, &doc)?;

        let mut staged_categories = self.categories.clone();
        for channel in &fresh {
            staged_categories
                .entry(channel.category.label().to_string())
                .or_default()
                .insert(channel.title.clone(), channel.channel_id.0.clone());
        }
        self.write_json(CATEGORY_FILE, &staged_categories)?;

        self.validated = doc.channels;
        self.validated_ids
            .extend(fresh.iter().map(|c| c.channel_id.clone()));
        self.categories = staged_categories;

        self.progress.total_validated = self.validated.len();
        self.save_progress()?;

        tracing::info!(
            new = fresh.len(),
            total = self.validated.len(),
            "saved validated channels"
        );
        Ok(fresh.len())
    }

    /// Fold one strategy run into its performance record and mark the
    /// technique as having completed a pass. A pass counts even when it
    /// yielded nothing.
    pub fn record_strategy_run(
        &mut self,
        strategy: StrategyKind,
        validated_found: usize,
        api_calls: u32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut staged = self.stats.clone();
        staged
            .entry(strategy)
            .or_default()
            .record_run(validated_found, api_calls, now);
        self.write_json(STATS_FILE, &staged)?;
        self.stats = staged;

        self.progress.last_strategy = Some(strategy);
        if !self.progress.strategies_used.contains(&strategy) {
            self.progress.strategies_used.push(strategy);
        }
        self.save_progress()
    }

    /// Record that this run ended on quota exhaustion. Expected, not an
    /// error; the next run resumes from the persisted state.
    pub fn mark_quota_exhausted(&mut self) -> Result<()> {
        self.progress.quota_exhausted = true;
        self.progress.quota_exhausted_count += 1;
        self.save_progress()
    }

    fn save_progress(&mut self) -> Result<()> {
        self.progress.last_updated = Utc::now();
        let staged = self.progress.clone();
        self.write_json(PROGRESS_FILE, &staged)
    }

    /// Full rewrite through a temp file and atomic rename.
    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!("{name}.tmp"));
        let bytes =
            serde_json::to_vec_pretty(value).with_context(|| format!("serializing {name}"))?;
        fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}

fn load_optional<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        return None;
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "unreadable state file, starting fresh");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                %err,
                "legacy or corrupt state file, starting fresh"
            );
            None
        }
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    load_optional(path).unwrap_or_default()
}
