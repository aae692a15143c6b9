use crate::error::{CacheError, Result};
use crate::hooks::{Dispatch, Reducer, SetState};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The state primitives a cached hook can wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// `(initial) -> (state, set_state)`
    State,
    /// `(reducer, initial) -> (state, dispatch)`
    Reducer,
}

impl Hook {
    pub const SUPPORTED: [Hook; 2] = [Hook::State, Hook::Reducer];

    /// Declared name of the primitive.
    pub fn name(self) -> &'static str {
        match self {
            Hook::State => "useState",
            Hook::Reducer => "useReducer",
        }
    }

    /// Resolve a primitive by its declared name.
    ///
    /// Both `useState` and `use_state` spellings are accepted.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "useState" | "use_state" => Ok(Hook::State),
            "useReducer" | "use_reducer" => Ok(Hook::Reducer),
            _ => Err(unsupported()),
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Hook {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

pub(crate) fn unsupported() -> CacheError {
    let names: Vec<_> = Hook::SUPPORTED.iter().map(|hook| hook.name()).collect();
    CacheError::UnsupportedHook(format!("only {} can be cached.", names.join(" | ")))
}

/// Arguments for invoking a wrapped primitive.
pub enum HookArgs<T, A = ()> {
    State { initial: T },
    Reducer { reducer: Reducer<T, A>, initial: T },
}

impl<T, A> HookArgs<T, A> {
    pub fn state(initial: T) -> Self {
        HookArgs::State { initial }
    }

    pub fn reducer<R>(reducer: R, initial: T) -> Self
    where
        R: Fn(&T, A) -> T + Send + Sync + 'static,
    {
        HookArgs::Reducer {
            reducer: Arc::new(reducer),
            initial,
        }
    }

    /// Which primitive these arguments fit.
    pub fn hook(&self) -> Hook {
        match self {
            HookArgs::State { .. } => Hook::State,
            HookArgs::Reducer { .. } => Hook::Reducer,
        }
    }

    /// The caller-supplied initial value.
    pub fn initial(&self) -> &T {
        match self {
            HookArgs::State { initial } | HookArgs::Reducer { initial, .. } => initial,
        }
    }
}

/// The mutator a wrapped primitive hands back.
pub enum Mutator<T, A = ()> {
    Set(SetState<T>),
    Dispatch(Dispatch<T, A>),
}

impl<T, A> Mutator<T, A> {
    pub fn into_setter(self) -> Option<SetState<T>> {
        match self {
            Mutator::Set(set) => Some(set),
            Mutator::Dispatch(_) => None,
        }
    }

    pub fn into_dispatch(self) -> Option<Dispatch<T, A>> {
        match self {
            Mutator::Dispatch(dispatch) => Some(dispatch),
            Mutator::Set(_) => None,
        }
    }
}

/// Removes the durable copy of a cached hook's state.
pub type Invalidate = Arc<dyn Fn() + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for hook in Hook::SUPPORTED {
            assert_eq!(hook.name().parse::<Hook>().unwrap(), hook);
        }
        assert_eq!(Hook::from_name("use_reducer").unwrap(), Hook::Reducer);
    }

    #[test]
    fn unknown_name_is_unsupported() {
        let err = Hook::from_name("useMemo").unwrap_err();
        assert_eq!(
            err,
            CacheError::UnsupportedHook("only useState | useReducer can be cached.".to_string())
        );
    }

    #[test]
    fn args_report_their_shape() {
        let state: HookArgs<i32> = HookArgs::state(1);
        assert_eq!(state.hook(), Hook::State);
        assert_eq!(*state.initial(), 1);

        let reducer: HookArgs<i32, i32> = HookArgs::reducer(|n: &i32, by: i32| n + by, 2);
        assert_eq!(reducer.hook(), Hook::Reducer);
        assert_eq!(*reducer.initial(), 2);
    }
}
