//! # Tincache
//!
//! Cache-backed state hooks for Rust.
//!
//! Tincache wraps component state primitives so their values survive
//! remounts: state is hydrated from a key/value store when the hook is
//! invoked and written back after every committed change, with optional
//! time-based expiration.
//!
//! ## Hooks (host primitives)
//!
//! A small component runtime with a render/commit cycle:
//! - `use_state` - a value plus a setter
//! - `use_reducer` - a value driven by a reducer
//! - `use_effect` - side effects that run after commit when dependencies change
//!
//! ## Cached hooks
//!
//! - `Cached` - a validated configuration (key, ttl) bound to a store
//! - `CachedHook` - a wrapped primitive returning `(state, mutator, invalidate)`
//!
//! ## Stores
//!
//! - `MemoryStore` - process-local, lazy expiration
//! - `SledStore` - durable, backed by `sled`

pub mod cached;
pub mod config;
pub mod error;
pub mod hooks;
pub mod runtime;
pub mod store;

// Re-export main types for convenience
pub use cached::{cached, Cached, CachedHook, Hook, HookArgs, Invalidate, Mutator};
pub use config::{CacheConfig, DEFAULT_TTL_UNIT_MS};
pub use error::{CacheError, Result, StoreError};
pub use hooks::{use_effect, use_reducer, use_state};
pub use runtime::Component;
pub use store::{KeyValueStore, MemoryStore, SledStore};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = Arc::new(MemoryStore::isolated());
        let hook = cached(store, CacheConfig::new("smoke")).unwrap().wrap(Hook::State);

        let component = Component::new();
        let (value, set_value, _) = component.render(|| hook.use_state(0)).unwrap();
        assert_eq!(value, 0);
        set_value.set(42);

        let (value, _, _) = component.render(|| hook.use_state(0)).unwrap();
        assert_eq!(value, 42);
    }
}
