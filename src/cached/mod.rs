//! Cache-backed state hooks.
//!
//! [`Cached`] is a configured decorator. Wrapping a state primitive with it
//! yields a [`CachedHook`] that behaves like the primitive, except that:
//!
//! - on every invocation the store is read first; a cached value replaces the
//!   caller's initial value (the caller's reducer is always kept)
//! - after each commit where the state, key, or ttl changed, the state is
//!   written back to the store
//! - an extra [`Invalidate`] action removes the stored copy
//!
//! ```
//! use std::sync::Arc;
//! use tincache::{CacheConfig, Cached, Hook};
//! use tincache::runtime::Component;
//! use tincache::store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::isolated());
//! let counter = Cached::configure(store, CacheConfig::new("counter")).unwrap().wrap(Hook::State);
//!
//! let component = Component::new();
//! let (count, set_count, _) = component.render(|| counter.use_state(0)).unwrap();
//! assert_eq!(count, 0);
//! set_count.set(3);
//! component.render(|| counter.use_state(0)).unwrap();
//!
//! // A fresh mount resumes from the store.
//! let remount = Component::new();
//! let (count, _, _) = remount.render(|| counter.use_state(0)).unwrap();
//! assert_eq!(count, 3);
//! ```

mod hook;

pub use hook::{Hook, HookArgs, Invalidate, Mutator};

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::hooks::{use_effect, use_shared_reducer, use_state, Dispatch, Reducer, SetState};
use crate::store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A validated cache configuration bound to a store.
#[derive(Clone)]
pub struct Cached {
    key: Arc<str>,
    ttl: Option<f64>,
    store: Arc<dyn KeyValueStore>,
}

impl Cached {
    /// Validate `config` and bind it to `store`.
    ///
    /// A unit override in the config is applied to the store before this
    /// returns. The unit is shared by every user of the store's unit cell,
    /// and the last decorator to set it wins.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`](crate::CacheError::InvalidArgument) for
    /// an empty key, a negative or non-finite ttl, or a zero unit.
    pub fn configure(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Result<Self> {
        config.validate()?;

        if let Some(unit_ms) = config.ttl_unit_ms {
            debug!(key = %config.key, unit_ms, "overriding expiry unit");
            store.set_expiry_unit(unit_ms);
        }
        debug!(key = %config.key, ttl = ?config.ttl, "configured cached hook");

        Ok(Self {
            key: Arc::from(config.key),
            ttl: config.ttl,
            store,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Option<f64> {
        self.ttl
    }

    /// Wrap a state primitive.
    pub fn wrap(&self, hook: Hook) -> CachedHook {
        CachedHook {
            cached: self.clone(),
            hook: Some(hook),
        }
    }

    /// Wrap a state primitive identified by its declared name.
    ///
    /// Unknown names are accepted here and rejected with
    /// [`CacheError::UnsupportedHook`](crate::CacheError::UnsupportedHook)
    /// on every invocation.
    pub fn wrap_named(&self, name: &str) -> CachedHook {
        let hook = Hook::from_name(name).ok();
        if hook.is_none() {
            debug!(key = %self.key, name, "wrapping unsupported hook");
        }
        CachedHook {
            cached: self.clone(),
            hook,
        }
    }

    /// Remove the stored value now. In-memory state is untouched.
    pub fn invalidate(&self) {
        debug!(key = %self.key, "invalidating cached state");
        self.store.remove(&self.key);
    }

    fn invalidator(&self) -> Invalidate {
        let cached = self.clone();
        Arc::new(move || cached.invalidate())
    }

    /// The stored value, if present and decodable as `T`.
    fn hydrate<T: DeserializeOwned>(&self) -> Option<T> {
        let value = match self.store.get(&self.key) {
            None | Some(Value::Null) => {
                trace!(key = %self.key, "cache miss");
                return None;
            }
            Some(value) => value,
        };

        match serde_json::from_value(value) {
            Ok(state) => {
                trace!(key = %self.key, "cache hit");
                Some(state)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "cached value does not fit state type; using initial value");
                None
            }
        }
    }

    /// Write `state` after commit whenever it, the key, or the ttl changed.
    fn persist_on_change<T>(&self, state: &T)
    where
        T: Clone + PartialEq + Serialize + Send + 'static,
    {
        let deps = (state.clone(), Arc::clone(&self.key), self.ttl);
        let state = state.clone();
        let key = Arc::clone(&self.key);
        let ttl = self.ttl;
        let store = Arc::clone(&self.store);

        use_effect(deps, move || match serde_json::to_value(&state) {
            Ok(value) => {
                trace!(key = %key, "persisting state");
                store.set(&key, value, ttl);
            }
            Err(e) => warn!(key = %key, error = %e, "failed to encode state; not persisted"),
        });
    }
}

/// Configure a cached hook. Shorthand for [`Cached::configure`].
pub fn cached(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Result<Cached> {
    Cached::configure(store, config)
}

/// A state primitive wrapped with a cache.
///
/// Invoke it inside a render, like the primitive it wraps.
#[derive(Clone)]
pub struct CachedHook {
    cached: Cached,
    // None when wrapped by an unrecognized name
    hook: Option<Hook>,
}

impl CachedHook {
    /// The wrapped primitive, if supported.
    pub fn hook(&self) -> Option<Hook> {
        self.hook
    }

    pub fn config(&self) -> &Cached {
        &self.cached
    }

    /// Invoke the wrapped primitive with `args`.
    ///
    /// # Errors
    ///
    /// [`CacheError::UnsupportedHook`](crate::CacheError::UnsupportedHook) if
    /// the wrapped primitive is unsupported or does not match `args`.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a render.
    pub fn call<T, A>(&self, args: HookArgs<T, A>) -> Result<(T, Mutator<T, A>, Invalidate)>
    where
        T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
        A: 'static,
    {
        match args {
            HookArgs::State { initial } => self
                .use_state(initial)
                .map(|(state, set, invalidate)| (state, Mutator::Set(set), invalidate)),
            HookArgs::Reducer { reducer, initial } => self
                .mount_reducer(reducer, initial)
                .map(|(state, dispatch, invalidate)| (state, Mutator::Dispatch(dispatch), invalidate)),
        }
    }

    /// Invoke a wrapped `use_state`.
    pub fn use_state<T>(&self, initial: T) -> Result<(T, SetState<T>, Invalidate)>
    where
        T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.require(Hook::State)?;

        let initial = self.cached.hydrate().unwrap_or(initial);
        let (state, set) = use_state(initial);
        self.cached.persist_on_change(&state);

        Ok((state, set, self.cached.invalidator()))
    }

    /// Invoke a wrapped `use_reducer`.
    pub fn use_reducer<T, A, R>(&self, reducer: R, initial: T) -> Result<(T, Dispatch<T, A>, Invalidate)>
    where
        T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
        A: 'static,
        R: Fn(&T, A) -> T + Send + Sync + 'static,
    {
        self.mount_reducer(Arc::new(reducer), initial)
    }

    fn mount_reducer<T, A>(&self, reducer: Reducer<T, A>, initial: T) -> Result<(T, Dispatch<T, A>, Invalidate)>
    where
        T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
        A: 'static,
    {
        self.require(Hook::Reducer)?;

        // Cached value replaces the initial state; the caller's reducer stays.
        let initial = self.cached.hydrate().unwrap_or(initial);
        let (state, dispatch) = use_shared_reducer(reducer, initial);
        self.cached.persist_on_change(&state);

        Ok((state, dispatch, self.cached.invalidator()))
    }

    fn require(&self, wanted: Hook) -> Result<()> {
        match self.hook {
            Some(hook) if hook == wanted => Ok(()),
            Some(hook) => Err(CacheError::UnsupportedHook(format!(
                "{hook} cannot be invoked as {wanted}."
            ))),
            None => Err(hook::unsupported()),
        }
    }
}
