use super::{expires_at, Clock, Entry, ExpiryUnit, KeyValueStore, SystemClock};
use crate::error::StoreError;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{trace, warn};

/// Default tree name for [`SledStore::open`].
pub const DEFAULT_BUCKET: &str = "cached";

/// Durable key/value store on top of `sled`.
///
/// Each bucket is a separate sled tree, so stores opened on different buckets
/// of the same database never see each other's keys. Entries are stored as
/// JSON envelopes holding the value and its expiration instant.
///
/// Storage failures never reach the caller: reads degrade to a miss and
/// writes are dropped, both with a warning.
pub struct SledStore {
    db: sled::Db,
    tree: sled::Tree,
    unit: ExpiryUnit,
    clock: Arc<dyn Clock>,
}

impl SledStore {
    /// Open (or create) the database at `path` using the default bucket.
    /// Creates the parent directory if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_bucket(path, DEFAULT_BUCKET)
    }

    /// Open (or create) the database at `path` using `bucket`.
    pub fn open_bucket(path: impl AsRef<Path>, bucket: &str) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Writes flush explicitly, so the background flusher is off.
        let db = sled::Config::new()
            .path(path)
            .flush_every_ms(None)
            .open()
            .map_err(|source| StoreError::Open {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_db(db, bucket, path)
    }

    /// Open a throwaway database that is deleted on drop.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|source| StoreError::Open {
                path: "<temporary>".to_string(),
                source,
            })?;
        Self::from_db(db, DEFAULT_BUCKET, Path::new("<temporary>"))
    }

    fn from_db(db: sled::Db, bucket: &str, path: &Path) -> Result<Self, StoreError> {
        let tree = db.open_tree(bucket).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self {
            db,
            tree,
            unit: ExpiryUnit::global(),
            clock: Arc::new(SystemClock),
        })
    }

    /// Read expirations through `unit` instead of the process-wide cell.
    pub fn with_unit(mut self, unit: ExpiryUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Use `clock` for expiration checks.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The expiry unit cell this store reads.
    pub fn expiry_unit(&self) -> &ExpiryUnit {
        &self.unit
    }

    /// Number of entries in this bucket, live or not yet collected.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    fn now_units(&self) -> u64 {
        self.unit.units_at(self.clock.now_ms())
    }

    fn read_entry(&self, key: &str) -> Option<(sled::IVec, Entry)> {
        let bytes = match self.tree.get(key) {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(key, error = %e, "failed to read cache entry");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some((bytes, entry)),
            Err(e) => {
                warn!(key, error = %e, "discarding undecodable cache entry");
                self.remove_if_unchanged(key, &bytes);
                None
            }
        }
    }

    /// Remove `key` only if it still holds `seen`. A concurrent rewrite wins.
    fn remove_if_unchanged(&self, key: &str, seen: &[u8]) -> bool {
        match self.tree.compare_and_swap(key, Some(seen), None::<&[u8]>) {
            Ok(Ok(())) => {
                self.persist();
                true
            }
            Ok(Err(_)) => {
                trace!(key, "entry rewritten before removal");
                false
            }
            Err(e) => {
                warn!(key, error = %e, "failed to remove cache entry");
                false
            }
        }
    }

    fn persist(&self) {
        if let Err(e) = self.db.flush() {
            warn!(error = %e, "failed to flush cache database");
        }
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Option<Value> {
        let (bytes, entry) = self.read_entry(key)?;
        if entry.is_expired(self.now_units()) {
            trace!(key, "dropping expired entry");
            self.remove_if_unchanged(key, &bytes);
            return None;
        }
        Some(entry.value)
    }

    fn set(&self, key: &str, value: Value, ttl: Option<f64>) {
        let entry = Entry::new(value, expires_at(self.now_units(), ttl));
        let bytes = match serde_json::to_vec(&entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.tree.insert(key, bytes) {
            warn!(key, error = %e, "failed to write cache entry");
            return;
        }
        self.persist();
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.tree.remove(key) {
            warn!(key, error = %e, "failed to remove cache entry");
            return;
        }
        self.persist();
    }

    fn set_expiry_unit(&self, unit_ms: u64) {
        self.unit.set(unit_ms);
    }

    fn flush(&self) {
        if let Err(e) = self.tree.clear() {
            warn!(error = %e, "failed to clear cache bucket");
            return;
        }
        self.persist();
    }

    fn flush_expired(&self) -> usize {
        let now = self.now_units();
        let mut expired = Vec::new();

        for item in self.tree.iter() {
            let (key, bytes) = match item {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "failed to scan cache bucket");
                    break;
                }
            };
            let dead = serde_json::from_slice::<Entry>(&bytes)
                .map(|entry| entry.is_expired(now))
                .unwrap_or(true);
            if dead {
                expired.push((key, bytes));
            }
        }

        let mut removed = 0;
        for (key, bytes) in expired {
            match self.tree.compare_and_swap(&key, Some(&bytes), None::<&[u8]>) {
                Ok(Ok(())) => removed += 1,
                Ok(Err(_)) => {}
                Err(e) => warn!(error = %e, "failed to remove expired entry"),
            }
        }
        if removed > 0 {
            self.persist();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ManualClock;
    use serde_json::json;

    #[test]
    fn survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("cache.sled");

        {
            let store = SledStore::open(&db_path).unwrap().with_unit(ExpiryUnit::new());
            store.set("profile", json!({ "name": "ada" }), None);
        }

        let store = SledStore::open(&db_path).unwrap().with_unit(ExpiryUnit::new());
        assert_eq!(store.get("profile"), Some(json!({ "name": "ada" })));
    }

    #[test]
    fn buckets_are_separate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("cache.sled");

        let db = sled::open(&db_path).unwrap();
        let a = SledStore::from_db(db.clone(), "a", &db_path).unwrap();
        let b = SledStore::from_db(db, "b", &db_path).unwrap();

        a.set("k", json!(1), None);
        assert_eq!(b.get("k"), None);

        b.flush();
        assert_eq!(a.get("k"), Some(json!(1)));
    }

    #[test]
    fn expired_entries_are_removed() {
        let clock = ManualClock::new(0);
        let store = SledStore::temporary()
            .unwrap()
            .with_unit(ExpiryUnit::new())
            .with_clock(clock.clone());
        store.set_expiry_unit(10);

        store.set("gone", json!(1), Some(1.0));
        store.set("kept", json!(2), Some(50.0));
        clock.advance(100);

        assert_eq!(store.flush_expired(), 1);
        assert_eq!(store.get("gone"), None);
        assert_eq!(store.get("kept"), Some(json!(2)));
    }

    #[test]
    fn rewrite_after_expiry_check_survives() {
        let clock = ManualClock::new(0);
        let store = SledStore::temporary()
            .unwrap()
            .with_unit(ExpiryUnit::new())
            .with_clock(clock.clone());
        store.set_expiry_unit(10);

        store.set("k", json!("old"), Some(1.0));
        clock.advance(10);
        let (seen, entry) = store.read_entry("k").unwrap();
        assert!(entry.is_expired(store.now_units()));

        // Another writer lands between the expired read and the removal.
        store.set("k", json!("fresh"), None);
        assert!(!store.remove_if_unchanged("k", &seen));
        assert_eq!(store.get("k"), Some(json!("fresh")));
    }

    #[test]
    fn corrupt_entry_reads_as_miss() {
        let store = SledStore::temporary().unwrap();
        store.tree.insert("k", b"not json".to_vec()).unwrap();

        assert_eq!(store.get("k"), None);
        assert!(store.is_empty());
    }
}
