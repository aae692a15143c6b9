use super::{expires_at, Clock, Entry, ExpiryUnit, KeyValueStore, SystemClock};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// In-process key/value store with lazy expiration.
///
/// Expired entries are dropped when read, or in bulk by
/// [`flush_expired`](KeyValueStore::flush_expired).
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tincache::store::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::isolated();
/// store.set("greeting", json!("hi"), None);
/// assert_eq!(store.get("greeting"), Some(json!("hi")));
///
/// store.remove("greeting");
/// assert_eq!(store.get("greeting"), None);
/// ```
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    unit: ExpiryUnit,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create a store on the process-wide expiry unit and the system clock.
    pub fn new() -> Self {
        Self::with_unit(ExpiryUnit::global())
    }

    /// Create a store with its own expiry unit, unaffected by other stores.
    pub fn isolated() -> Self {
        Self::with_unit(ExpiryUnit::new())
    }

    /// Create a store sharing `unit`.
    pub fn with_unit(unit: ExpiryUnit) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            unit,
            clock: Arc::new(SystemClock),
        }
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

    /// Number of stored entries, live or not yet collected.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn now_units(&self) -> u64 {
        self.unit.units_at(self.clock.now_ms())
    }

    /// Remove `key` only if it is still expired at `now`.
    ///
    /// The entry may have been rewritten between the read that saw it expire
    /// and this write lock.
    fn remove_expired(&self, key: &str, now: u64) -> bool {
        let mut entries = self.entries.write();
        if !entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            return false;
        }
        trace!(key, "dropping expired entry");
        entries.remove(key);
        true
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let now = self.now_units();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        self.remove_expired(key, now);
        None
    }

    fn set(&self, key: &str, value: Value, ttl: Option<f64>) {
        let entry = Entry::new(value, expires_at(self.now_units(), ttl));
        self.entries.write().insert(key.to_string(), entry);
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn set_expiry_unit(&self, unit_ms: u64) {
        self.unit.set(unit_ms);
    }

    fn flush(&self) {
        self.entries.write().clear();
    }

    fn flush_expired(&self) -> usize {
        let now = self.now_units();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}
