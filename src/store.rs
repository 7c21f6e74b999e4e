//! Cache state persistence
//!
//! One pretty-printed JSON file per source under `<state_dir>/caches/`.
//! Writes go to a temporary file first and are renamed into place, so a
//! crash mid-write leaves the previous state intact.

use crate::config::ConfigManager;
use crate::dedup::{CacheState, DedupCache};
use crate::error::{FreewatchError, FreewatchResult};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// File-backed store for dedup cache state
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Create a store rooted in the caches directory of a state directory
    pub fn new(state_dir: &Path) -> Self {
        Self {
            dir: ConfigManager::caches_dir(state_dir),
        }
    }

    /// Create a store writing directly into `dir`
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the state file path for a source
    pub fn file_path(&self, service: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(service)))
    }

    /// Read raw persisted state for a source
    ///
    /// A file that does not parse into a complete state record is reported
    /// as `InvalidState`.
    pub async fn read_state(&self, service: &str) -> FreewatchResult<Option<CacheState>> {
        let path = self.file_path(service);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            FreewatchError::io(format!("reading cache file {}", path.display()), e)
        })?;

        let state: CacheState = serde_json::from_str(&content)
            .map_err(|e| FreewatchError::invalid_state(service, e.to_string()))?;

        if state.service != service {
            return Err(FreewatchError::invalid_state(
                service,
                format!("file belongs to {:?}", state.service),
            ));
        }

        Ok(Some(state))
    }

    /// Restore a source's cache, or `None` if nothing was persisted
    pub async fn load(
        &self,
        service: &str,
        capacity: NonZeroUsize,
    ) -> FreewatchResult<Option<DedupCache>> {
        match self.read_state(service).await? {
            Some(state) => {
                let cache = DedupCache::from_state(capacity, state)?;
                debug!(
                    "Restored {} cache with {} entries (count {})",
                    service,
                    cache.len(),
                    cache.inserted_count()
                );
                Ok(Some(cache))
            }
            None => Ok(None),
        }
    }

    /// Persist a source's cache
    pub async fn save(&self, service: &str, cache: &DedupCache) -> FreewatchResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| FreewatchError::io("creating caches directory", e))?;

        let path = self.file_path(service);
        if let Some(owner) = self.owner(&path).await {
            if owner != service {
                return Err(FreewatchError::invalid_state(
                    service,
                    format!("{} already holds the cache for {:?}", path.display(), owner),
                ));
            }
        }

        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(&cache.to_state(service))?;

        fs::write(&tmp, content)
            .await
            .map_err(|e| FreewatchError::io(format!("writing cache file {}", tmp.display()), e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| FreewatchError::io(format!("replacing cache file {}", path.display()), e))?;

        debug!("Saved {} cache to {}", service, path.display());
        Ok(())
    }

    /// Service recorded in an existing, parseable state file
    async fn owner(&self, path: &Path) -> Option<String> {
        let content = fs::read_to_string(path).await.ok()?;
        serde_json::from_str::<CacheState>(&content)
            .ok()
            .map(|state| state.service)
    }

    /// Delete a source's persisted state, returning whether a file existed
    pub async fn remove(&self, service: &str) -> FreewatchResult<bool> {
        let path = self.file_path(service);
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path).await.map_err(|e| {
            FreewatchError::io(format!("removing cache file {}", path.display()), e)
        })?;
        Ok(true)
    }

    /// List every readable persisted state, sorted by service name
    pub async fn list(&self) -> FreewatchResult<Vec<CacheState>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }

        let mut states = vec![];
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| FreewatchError::io("reading caches directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FreewatchError::io("reading cache entry", e))?
        {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            let Ok(content) = fs::read_to_string(&path).await else {
                continue;
            };
            match serde_json::from_str::<CacheState>(&content) {
                Ok(state) => states.push(state),
                Err(e) => warn!("Skipping unreadable cache file {}: {}", path.display(), e),
            }
        }

        states.sort_by(|a, b| a.service.cmp(&b.service));
        Ok(states)
    }
}

/// Filesystem-safe stem for a source name
///
/// Distinct names may share a stem (`Denver` and `denver`); configuration
/// validation rejects such pairs.
pub fn file_stem(service: &str) -> String {
    let mut stem = String::with_capacity(service.len());
    for c in service.trim().chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('-') {
            stem.push('-');
        }
    }

    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "source".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (CacheStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path());
        (store, temp)
    }

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn file_stem_sanitizes_names() {
        assert_eq!(file_stem("Denver"), "denver");
        assert_eq!(file_stem("Fort Collins / North"), "fort-collins-north");
        assert_eq!(file_stem("../.."), "source");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let (store, _temp) = test_store();

        let mut cache = DedupCache::new(cap(3));
        for id in ["a", "b", "c", "d"] {
            cache.try_insert(id).unwrap();
        }
        store.save("Denver", &cache).await.unwrap();

        let mut restored = store.load("Denver", cap(3)).await.unwrap().unwrap();
        assert_eq!(restored.to_state("Denver"), cache.to_state("Denver"));

        for id in ["a", "b", "e", "c"] {
            assert_eq!(cache.try_insert(id).unwrap(), restored.try_insert(id).unwrap());
        }
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let (store, _temp) = test_store();
        assert!(store.load("Boulder", cap(3)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_rejects_corrupt_file() {
        let (store, _temp) = test_store();
        fs::create_dir_all(store.dir()).await.unwrap();
        fs::write(
            store.file_path("Denver"),
            r#"{"service": "Denver", "max": 3, "count": 1}"#,
        )
        .await
        .unwrap();

        let err = store.load("Denver", cap(3)).await.unwrap_err();
        assert!(matches!(err, FreewatchError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn load_rejects_capacity_change() {
        let (store, _temp) = test_store();
        let mut cache = DedupCache::new(cap(3));
        cache.try_insert("a").unwrap();
        store.save("Denver", &cache).await.unwrap();

        let err = store.load("Denver", cap(5)).await.unwrap_err();
        assert!(err.to_string().contains("capacity mismatch"));
    }

    #[tokio::test]
    async fn load_rejects_foreign_service() {
        let (store, _temp) = test_store();
        let cache = DedupCache::new(cap(3));
        store.save("Denver", &cache).await.unwrap();
        fs::rename(store.file_path("Denver"), store.file_path("Boulder"))
            .await
            .unwrap();

        assert!(store.load("Boulder", cap(3)).await.is_err());
    }

    #[tokio::test]
    async fn save_refuses_to_overwrite_another_source() {
        let (store, _temp) = test_store();
        assert_eq!(store.file_path("Denver"), store.file_path("denver"));

        let mut denver = DedupCache::new(cap(3));
        denver.try_insert("a").unwrap();
        store.save("Denver", &denver).await.unwrap();

        let mut other = DedupCache::new(cap(3));
        other.try_insert("b").unwrap();
        let err = store.save("denver", &other).await.unwrap_err();
        assert!(matches!(err, FreewatchError::InvalidState { .. }));

        let restored = store.load("Denver", cap(3)).await.unwrap().unwrap();
        assert!(restored.contains("a"));
        assert!(!restored.contains("b"));
    }

    #[tokio::test]
    async fn save_replaces_unreadable_file() {
        let (store, _temp) = test_store();
        fs::create_dir_all(store.dir()).await.unwrap();
        fs::write(store.file_path("Denver"), "not json").await.unwrap();

        store.save("Denver", &DedupCache::new(cap(2))).await.unwrap();
        assert!(store.load("Denver", cap(2)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_and_remove() {
        let (store, _temp) = test_store();
        let cache = DedupCache::new(cap(2));
        store.save("Denver", &cache).await.unwrap();
        store.save("Boulder", &cache).await.unwrap();
        fs::write(store.dir().join("garbage.json"), "not json")
            .await
            .unwrap();

        let services: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.service)
            .collect();
        assert_eq!(services, vec!["Boulder", "Denver"]);

        assert!(store.remove("Denver").await.unwrap());
        assert!(!store.remove("Denver").await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::with_dir(temp.path().join("absent"));
        assert!(store.list().await.unwrap().is_empty());
    }
}
