//! Key/value stores that back cached hooks.
//!
//! The decorator only needs four operations from a store: `get`, `set`,
//! `remove` and `set_expiry_unit`. Two implementations ship with the crate:
//! - [`MemoryStore`] - a process-local map, handy for tests and short-lived apps
//! - [`SledStore`] - a durable store on top of `sled`
//!
//! Expiration is measured in whole *expiry units* (one minute by default).
//! The unit lives in a shared [`ExpiryUnit`] cell; changing it changes how
//! every store holding that cell interprets both new and existing expirations.

mod durable;
mod entry;
mod expiry;
mod memory;

pub use durable::{SledStore, DEFAULT_BUCKET};
pub use entry::Entry;
pub use expiry::{Clock, ExpiryUnit, ManualClock, SystemClock};
pub use memory::MemoryStore;

use serde_json::Value;

/// Storage capability consumed by [`Cached`](crate::Cached).
///
/// Implementations handle their own failures: a value that cannot be read is
/// reported as absent, and a write that cannot be applied is logged and
/// dropped.
pub trait KeyValueStore: Send + Sync {
    /// Read a live value. Expired entries are removed and reported as absent.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write `value` under `key`.
    ///
    /// A positive `ttl` expires the entry `ttl` units from now (fractions are
    /// truncated). `None` or `0` clears any previous expiration.
    fn set(&self, key: &str, value: Value, ttl: Option<f64>);

    /// Remove `key` if present.
    fn remove(&self, key: &str);

    /// Set the process-wide expiry unit, in milliseconds.
    fn set_expiry_unit(&self, unit_ms: u64);

    /// Remove every entry.
    fn flush(&self);

    /// Remove expired entries and return how many were dropped.
    fn flush_expired(&self) -> usize;
}

/// Expiration instant for a write made at `now_units`, if any.
pub(crate) fn expires_at(now_units: u64, ttl: Option<f64>) -> Option<u64> {
    match ttl {
        Some(ttl) if ttl > 0.0 => Some(now_units.saturating_add(ttl.trunc() as u64)),
        _ => None,
    }
}
