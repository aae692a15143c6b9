//! Decorator configuration.
//!
//! A [`CacheConfig`] names the cache slot and its expiration. It can be built
//! two ways, both converging on the same struct:
//!
//! - the structured builder, [`CacheConfig::new`] plus `with_*` setters
//!   (or [`CacheConfig::from_value`] for loosely-typed JSON input)
//! - the deprecated positional constructor, [`CacheConfig::positional`]
//!
//! Construction never validates. Validation happens once, when the config is
//! handed to [`Cached::configure`](crate::Cached::configure).

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Milliseconds per expiry unit when nothing overrides it (one minute).
pub const DEFAULT_TTL_UNIT_MS: u64 = 60_000;

/// Configuration for one cached hook.
///
/// # Examples
///
/// ```
/// use tincache::CacheConfig;
///
/// let config = CacheConfig::new("profile").with_ttl(5.0);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.ttl, Some(5.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache slot name. Must be non-empty.
    pub key: String,
    /// Expiration in expiry units. `None` never expires.
    #[serde(default)]
    pub ttl: Option<f64>,
    /// Overrides the store's expiry unit. This is process-wide for every
    /// store sharing the same [`ExpiryUnit`](crate::store::ExpiryUnit) cell.
    #[serde(default, alias = "ttlMS", alias = "ttlUnitMs")]
    pub ttl_unit_ms: Option<u64>,
}

impl CacheConfig {
    /// Start a configuration for `key` with no expiration.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ttl: None,
            ttl_unit_ms: None,
        }
    }

    /// Expire the slot `ttl` units after each write.
    pub fn with_ttl(mut self, ttl: f64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Change the store's expiry unit when this config is applied.
    pub fn with_ttl_unit_ms(mut self, ttl_unit_ms: u64) -> Self {
        self.ttl_unit_ms = Some(ttl_unit_ms);
        self
    }

    /// Positional form kept for callers written against the old
    /// `(key, ttl, ttl_unit_ms)` calling convention.
    #[deprecated(
        since = "0.1.0",
        note = "use `CacheConfig::new(key).with_ttl(..)`; the positional form will be removed in 1.0"
    )]
    pub fn positional(key: impl Into<String>, ttl: Option<f64>, ttl_unit_ms: Option<u64>) -> Self {
        Self {
            key: key.into(),
            ttl,
            ttl_unit_ms,
        }
    }

    /// Build a configuration from an untyped JSON object.
    ///
    /// Accepts `key`, `ttl` and `ttl_unit_ms` (or `ttlMS` / `ttlUnitMs`).
    /// Anything that does not fit, such as a numeric key or a string ttl, is
    /// an [`CacheError::InvalidArgument`].
    ///
    /// ```
    /// use serde_json::json;
    /// use tincache::{CacheConfig, CacheError};
    ///
    /// let config = CacheConfig::from_value(json!({ "key": "k", "ttl": 5, "ttlMS": 1000 })).unwrap();
    /// assert_eq!(config.ttl_unit_ms, Some(1000));
    ///
    /// let err = CacheConfig::from_value(json!({ "key": 42 })).unwrap_err();
    /// assert!(matches!(err, CacheError::InvalidArgument(_)));
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(CacheError::InvalidArgument(
                "configuration must be an object.".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| CacheError::InvalidArgument(e.to_string()))
    }

    /// Check the invariants every configuration must hold.
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(CacheError::InvalidArgument(
                "key must be a non-empty string.".to_string(),
            ));
        }
        if let Some(ttl) = self.ttl {
            if !ttl.is_finite() || ttl < 0.0 {
                return Err(CacheError::InvalidArgument(
                    "ttl can only be null or a positive number.".to_string(),
                ));
            }
        }
        if self.ttl_unit_ms == Some(0) {
            return Err(CacheError::InvalidArgument(
                "ttl unit must be a positive number of milliseconds.".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Component;
    use crate::store::MemoryStore;
    use crate::{Cached, Hook};
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn builder_sets_fields() {
        let config = CacheConfig::new("k").with_ttl(2.5).with_ttl_unit_ms(1000);
        assert_eq!(config.key, "k");
        assert_eq!(config.ttl, Some(2.5));
        assert_eq!(config.ttl_unit_ms, Some(1000));
    }

    #[test]
    #[allow(deprecated)]
    fn positional_matches_builder() {
        let positional = CacheConfig::positional("k", Some(5.0), None);
        assert_eq!(positional, CacheConfig::new("k").with_ttl(5.0));
    }

    #[test]
    fn empty_key_rejected() {
        let err = CacheConfig::new("").validate().unwrap_err();
        assert_eq!(
            err,
            CacheError::InvalidArgument("key must be a non-empty string.".to_string())
        );
    }

    #[test]
    fn nan_ttl_rejected() {
        let err = CacheConfig::new("k").with_ttl(f64::NAN).validate();
        assert!(matches!(err, Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn zero_ttl_accepted() {
        assert!(CacheConfig::new("k").with_ttl(0.0).validate().is_ok());
    }

    #[test]
    fn zero_unit_rejected() {
        let err = CacheConfig::new("k").with_ttl_unit_ms(0).validate();
        assert!(matches!(err, Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn from_value_reads_aliases() {
        let config = CacheConfig::from_value(json!({ "key": "k", "ttlUnitMs": 10 })).unwrap();
        assert_eq!(config.ttl_unit_ms, Some(10));
        assert_eq!(config.ttl, None);
    }

    #[test]
    fn from_value_null_ttl_is_none() {
        let config = CacheConfig::from_value(json!({ "key": "k", "ttl": null })).unwrap();
        assert_eq!(config.ttl, None);
    }

    #[test]
    fn from_value_rejects_bad_shapes() {
        for value in [
            json!(null),
            json!("k"),
            json!(["k", 5]),
            json!({}),
            json!({ "key": 1 }),
            json!({ "key": null }),
            json!({ "key": "k", "ttl": "soon" }),
            json!({ "key": "k", "ttlMS": "fast" }),
        ] {
            let result = CacheConfig::from_value(value.clone());
            assert!(
                matches!(result, Err(CacheError::InvalidArgument(_))),
                "{value} should be rejected"
            );
        }
    }

    proptest! {
        #[test]
        fn non_empty_key_and_valid_ttl_configure(key in ".+", ttl in proptest::option::of(0.0f64..1e9)) {
            let mut config = CacheConfig::new(key);
            config.ttl = ttl;
            let store = Arc::new(MemoryStore::isolated());
            let cached = Cached::configure(store, config);
            prop_assert!(cached.is_ok());

            let hook = cached.unwrap().wrap(Hook::State);
            let rendered = Component::new().render(|| hook.use_state(1));
            prop_assert!(matches!(rendered, Ok((1, _, _))));
        }

        #[test]
        fn negative_ttl_fails(ttl in -1e9f64..-f64::EPSILON) {
            let result = CacheConfig::new("k").with_ttl(ttl).validate();
            prop_assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
        }
    }
}
