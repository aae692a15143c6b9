//! State primitives and effects for components.
//!
//! These are the host primitives the cache decorator wraps:
//! - `use_state` - a value plus a setter
//! - `use_reducer` - a value plus a dispatcher driven by a reducer function
//! - `use_effect` - a side effect that runs after commit when its dependencies change
//!
//! All of them must be called while a [`Component`](crate::runtime::Component)
//! is rendering, in the same order on every render.

mod effect;
mod reducer;
mod state;

pub use effect::use_effect;
pub use reducer::{use_reducer, Dispatch, Reducer};
pub use state::{use_state, SetState};

pub(crate) use reducer::use_shared_reducer;
