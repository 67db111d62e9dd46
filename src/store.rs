use crate::error::Result;
use crate::models::{Folder, FolderCache, FolderRecord};
use crate::rest::MailService;
use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);
pub const PATH_SEPARATOR: &str = " / ";
const CACHE_KEY: &str = "folders";

/// Persistent key-value storage for the folder cache and recency list.
/// Values are opaque strings; serialization belongs to the caller.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One file per key under the state directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::config::Config::state_dir()?))
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o700))?;
        }

        fs::write(self.key_path(key), value)?;
        Ok(())
    }
}

/// Time-boxed cache over the remote folder hierarchy. Folder sets are
/// replaced wholesale; a snapshot is never partially mutated.
pub struct FolderStore<K> {
    kv: K,
    ttl: Duration,
}

impl<K: KeyValueStore> FolderStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv, ttl: CACHE_TTL }
    }

    /// Returns the cached snapshot when fresh, otherwise fetches the
    /// full tree, derives paths, and replaces the cache.
    #[instrument(skip(self, service))]
    pub async fn load(&self, service: &impl MailService, force: bool) -> Result<Vec<Folder>> {
        if !force
            && let Some(cache) = self.read_cache()
            && cache.is_valid(Utc::now().timestamp_millis(), self.ttl)
        {
            debug!(count = cache.folders.len(), "Using cached folder list");
            return Ok(cache.folders);
        }

        let records = fetch_folder_tree(service).await?;
        let folders = build_folder_paths(records);
        debug!(count = folders.len(), "Fetched folder tree");

        let cache = FolderCache {
            folders,
            timestamp: Utc::now().timestamp_millis(),
        };
        match serde_json::to_string(&cache) {
            Ok(raw) => {
                if let Err(err) = self.kv.set(CACHE_KEY, &raw) {
                    warn!(%err, "Failed to persist folder cache");
                }
            }
            Err(err) => warn!(%err, "Failed to serialize folder cache"),
        }

        Ok(cache.folders)
    }

    fn read_cache(&self) -> Option<FolderCache> {
        let raw = match self.kv.get(CACHE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(%err, "Folder cache unreadable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(cache) => Some(cache),
            Err(err) => {
                warn!(%err, "Folder cache malformed, refetching");
                None
            }
        }
    }
}

/// Accumulates the whole hierarchy breadth-first. A failed child fetch
/// drops that branch, not the load.
async fn fetch_folder_tree(service: &impl MailService) -> Result<Vec<FolderRecord>> {
    let mut all = service.list_root_folders().await?;
    let mut queue: VecDeque<String> = all.iter().map(|r| r.id.clone()).collect();

    while let Some(parent_id) = queue.pop_front() {
        let children = match service.list_child_folders(&parent_id).await {
            Ok(children) => children,
            Err(err) => {
                warn!(%parent_id, %err, "Child folder fetch failed, skipping branch");
                Vec::new()
            }
        };
        queue.extend(children.iter().map(|c| c.id.clone()));
        all.extend(children);
    }

    Ok(all)
}

fn build_folder_paths(records: Vec<FolderRecord>) -> Vec<Folder> {
    let index: HashMap<String, FolderRecord> =
        records.iter().map(|r| (r.id.clone(), r.clone())).collect();

    let mut folders: Vec<Folder> = records
        .into_iter()
        .map(|record| {
            let path = folder_path(&record, &index);
            Folder::new(record, path)
        })
        .collect();

    folders.sort_by_cached_key(|f| f.path.to_lowercase());
    folders
}

/// Walks parent links up to a root, outermost name first. The hierarchy
/// is a tree by contract; the visited set caps a revisited folder at
/// its bare display name so a bad snapshot cannot loop.
fn folder_path(record: &FolderRecord, index: &HashMap<String, FolderRecord>) -> String {
    let mut names = vec![record.display_name.clone()];
    let mut visited: HashSet<&str> = HashSet::from([record.id.as_str()]);
    let mut current = record;

    while let Some(parent_id) = current.parent_folder_id.as_deref() {
        let Some(parent) = index.get(parent_id) else {
            break;
        };
        names.push(parent.display_name.clone());
        if !visited.insert(parent.id.as_str()) {
            break;
        }
        current = parent;
    }

    names.reverse();
    names.join(PATH_SEPARATOR)
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::KeyValueStore;
    use crate::error::Result;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct MemoryStore {
        map: Mutex<HashMap<String, String>>,
    }

    impl MemoryStore {
        pub(crate) fn seeded(key: &str, value: &str) -> Self {
            let store = Self::default();
            store
                .map
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            store
        }

        pub(crate) fn raw(&self, key: &str) -> Option<String> {
            self.map.lock().unwrap().get(key).cloned()
        }
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.map.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.map
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::MemoryStore;
    use super::*;
    use crate::rest::testutil::FakeService;

    fn record(id: &str, name: &str, parent: Option<&str>) -> FolderRecord {
        FolderRecord {
            id: id.to_string(),
            display_name: name.to_string(),
            parent_folder_id: parent.map(String::from),
        }
    }

    #[test]
    fn test_paths_follow_parent_chain() {
        let folders = build_folder_paths(vec![
            record("1", "Inbox", None),
            record("2", "Work", Some("1")),
            record("3", "Projects", Some("2")),
        ]);
        let paths: Vec<&str> = folders.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["Inbox", "Inbox / Work", "Inbox / Work / Projects"]);
    }

    #[test]
    fn test_missing_parent_is_own_root() {
        let folders = build_folder_paths(vec![record("2", "Orphan", Some("gone"))]);
        assert_eq!(folders[0].path, "Orphan");
    }

    #[test]
    fn test_paths_sorted_case_insensitively() {
        let folders = build_folder_paths(vec![
            record("1", "zebra", None),
            record("2", "Apple", None),
            record("3", "mango", None),
        ]);
        let paths: Vec<&str> = folders.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["Apple", "mango", "zebra"]);
    }

    #[test]
    fn test_cycle_guard_terminates() {
        let folders = build_folder_paths(vec![
            record("a", "A", Some("b")),
            record("b", "B", Some("a")),
        ]);
        let a = folders.iter().find(|f| f.id == "a").unwrap();
        let b = folders.iter().find(|f| f.id == "b").unwrap();
        assert_eq!(a.path, "A / B / A");
        assert_eq!(b.path, "B / A / B");
    }

    #[tokio::test]
    async fn test_load_fetches_and_caches() {
        let service = FakeService::with_tree(vec![
            record("1", "Inbox", None),
            record("2", "Work", Some("1")),
        ]);
        let store = FolderStore::new(MemoryStore::default());

        let folders = store.load(&service, false).await.unwrap();
        let paths: Vec<&str> = folders.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["Inbox", "Inbox / Work"]);
        assert_eq!(service.root_calls(), 1);

        // Second load is served from the cache without a network call.
        let again = store.load(&service, false).await.unwrap();
        assert_eq!(again.len(), 2);
        assert_eq!(service.root_calls(), 1);
    }

    #[tokio::test]
    async fn test_force_bypasses_cache() {
        let service = FakeService::with_tree(vec![record("1", "Inbox", None)]);
        let store = FolderStore::new(MemoryStore::default());

        store.load(&service, false).await.unwrap();
        store.load(&service, true).await.unwrap();
        assert_eq!(service.root_calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_cache_refetched() {
        let stale = serde_json::to_string(&FolderCache {
            folders: vec![Folder::new(record("old", "Old", None), "Old".into())],
            timestamp: 0,
        })
        .unwrap();
        let store = FolderStore::new(MemoryStore::seeded(CACHE_KEY, &stale));
        let service = FakeService::with_tree(vec![record("1", "Inbox", None)]);

        let folders = store.load(&service, false).await.unwrap();
        assert_eq!(folders[0].id, "1");
        assert_eq!(service.root_calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_cache_degrades_to_miss() {
        let store = FolderStore::new(MemoryStore::seeded(CACHE_KEY, "not json"));
        let service = FakeService::with_tree(vec![record("1", "Inbox", None)]);

        let folders = store.load(&service, false).await.unwrap();
        assert_eq!(folders.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_branch_keeps_rest_of_tree() {
        let mut service = FakeService::with_tree(vec![
            record("1", "Inbox", None),
            record("2", "Work", Some("1")),
            record("3", "Archive", None),
        ]);
        service.fail_children_of("3");
        let store = FolderStore::new(MemoryStore::default());

        let folders = store.load(&service, false).await.unwrap();
        let ids: Vec<&str> = folders.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }
}
