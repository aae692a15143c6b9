//! Component runtime for hooks.
//!
//! This module provides the render/commit cycle hooks run in: per-component
//! hook slots, the thread-local "currently rendering" context, and the
//! queue of effects deferred until commit.

mod context;

pub use context::Component;
