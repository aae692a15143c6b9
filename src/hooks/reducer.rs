use crate::runtime::Component;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// A state transition function: `(current, action) -> next`.
pub type Reducer<T, A> = Arc<dyn Fn(&T, A) -> T + Send + Sync>;

struct ReducerCell<T, A> {
    value: RwLock<T>,
    // Latest reducer seen by a render
    reducer: RwLock<Reducer<T, A>>,
    owner: Weak<Component>,
}

/// Dispatcher returned by [`use_reducer`].
pub struct Dispatch<T, A> {
    cell: Arc<ReducerCell<T, A>>,
}

impl<T: Clone, A> Dispatch<T, A> {
    /// Apply the reducer to the current value.
    ///
    /// The reducer runs under the value's lock and must not dispatch to the
    /// same handle.
    pub fn dispatch(&self, action: A) {
        let reducer = Arc::clone(&*self.cell.reducer.read());
        {
            let mut value = self.cell.value.write();
            *value = reducer(&*value, action);
        }

        if let Some(owner) = self.cell.owner.upgrade() {
            owner.mark_dirty();
        }
    }

    /// The latest value, including dispatches not yet rendered.
    pub fn get(&self) -> T {
        self.cell.value.read().clone()
    }
}

impl<T, A> Clone for Dispatch<T, A> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

/// State driven by a reducer.
///
/// `initial` is only used on mount. The reducer from the most recent render
/// handles subsequent dispatches.
///
/// # Example
///
/// ```
/// use tincache::hooks::use_reducer;
/// use tincache::runtime::Component;
///
/// let component = Component::new();
/// let (count, dispatch) = component.render(|| use_reducer(|n: &i32, by: i32| n + by, 1));
/// assert_eq!(count, 1);
///
/// dispatch.dispatch(4);
/// assert_eq!(dispatch.get(), 5);
/// ```
///
/// # Panics
///
/// Panics when called outside of a render.
pub fn use_reducer<T, A, R>(reducer: R, initial: T) -> (T, Dispatch<T, A>)
where
    T: Clone + Send + Sync + 'static,
    A: 'static,
    R: Fn(&T, A) -> T + Send + Sync + 'static,
{
    use_shared_reducer(Arc::new(reducer), initial)
}

pub(crate) fn use_shared_reducer<T, A>(reducer: Reducer<T, A>, initial: T) -> (T, Dispatch<T, A>)
where
    T: Clone + Send + Sync + 'static,
    A: 'static,
{
    let component = Component::rendering();
    let owner = Arc::downgrade(&component);
    let latest = Arc::clone(&reducer);
    let cell = component.slot(move || ReducerCell {
        value: RwLock::new(initial),
        reducer: RwLock::new(reducer),
        owner,
    });
    *cell.reducer.write() = latest;

    let value = cell.value.read().clone();
    (value, Dispatch { cell })
}
