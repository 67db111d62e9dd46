use crate::error::Result;
use crate::models::{Folder, RecentEntry};
use crate::store::KeyValueStore;
use std::collections::HashSet;
use tracing::warn;

pub const RECENT_LIMIT: usize = 8;
const RECENT_KEY: &str = "recent";

/// Bounded MRU list of move destinations, persisted after every
/// successful move.
pub struct RecencyTracker<K> {
    kv: K,
    capacity: usize,
}

impl<K: KeyValueStore> RecencyTracker<K> {
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            capacity: RECENT_LIMIT,
        }
    }

    /// Newest first, filtered against the live folder-id set so entries
    /// for deleted folders drop out. The persisted copy is untouched;
    /// it is rewritten on the next `record`.
    pub fn load(&self, live_ids: &HashSet<String>) -> Vec<RecentEntry> {
        self.read()
            .into_iter()
            .filter(|entry| live_ids.contains(&entry.id))
            .collect()
    }

    pub fn record(&self, folder: &Folder) -> Result<()> {
        let mut entries = self.read();
        entries.retain(|entry| entry.id != folder.id);
        entries.insert(0, RecentEntry::from(folder));
        entries.truncate(self.capacity);
        self.kv.set(RECENT_KEY, &serde_json::to_string(&entries)?)
    }

    fn read(&self) -> Vec<RecentEntry> {
        let raw = match self.kv.get(RECENT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(%err, "Recency list unreadable");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(%err, "Recency list malformed, starting empty");
                Vec::new()
            }
        }
    }
}
