use std::collections::HashSet;

use crate::types::ChannelId;

/// In-memory set of every channel identifier the engine has ever seen,
/// validated or merely discovered. Loaded fully from the state store at
/// startup; consulted before any candidate enters a result set so that no
/// validation lookup is ever spent twice on the same channel.
///
/// Single-threaded orchestration; no locking.
#[derive(Debug, Default)]
pub struct DedupIndex {
    known: HashSet<ChannelId>,
}

impl DedupIndex {
    pub fn new(known: impl IntoIterator<Item = ChannelId>) -> Self {
        Self {
            known: known.into_iter().collect(),
        }
    }

    pub fn is_known(&self, id: &ChannelId) -> bool {
        self.known.contains(id)
    }

    /// Returns true if the id was not previously known.
    pub fn mark_known(&mut self, id: ChannelId) -> bool {
        self.known.insert(id)
    }

    pub fn mark_all(&mut self, ids: impl IntoIterator<Item = ChannelId>) {
        self.known.extend(ids);
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ChannelId {
        ChannelId(raw.to_string())
    }

    #[test]
    fn filters_already_known_candidates() {
        // Three raw candidates, one already known: exactly two survive.
        let index = DedupIndex::new([id("UCknown")]);
        let raw = [id("UCnew1"), id("UCknown"), id("UCnew2")];

        let fresh: Vec<_> = raw.iter().filter(|c| !index.is_known(c)).collect();
        assert_eq!(fresh.len(), 2);
        assert!(fresh.iter().all(|c| c.as_str() != "UCknown"));
    }

    #[test]
    fn mark_known_reports_novelty() {
        let mut index = DedupIndex::default();
        assert!(index.mark_known(id("UC1")));
        assert!(!index.mark_known(id("UC1")));
        assert_eq!(index.len(), 1);
    }
}
