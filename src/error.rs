//! Error types for cache-backed hooks.

use thiserror::Error;

/// Errors raised by the cache decorator.
///
/// Both kinds are caller-input problems detected eagerly. Nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A configuration value failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The wrapped state primitive is not one of the supported variants.
    #[error("unsupported hook: {0}")]
    UnsupportedHook(String),
}

/// Errors raised while opening a durable store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sled::Error,
    },

    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;
