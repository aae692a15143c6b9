use crate::runtime::Component;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

struct StateCell<T> {
    value: RwLock<T>,
    owner: Weak<Component>,
}

impl<T> StateCell<T> {
    fn changed(&self) {
        if let Some(owner) = self.owner.upgrade() {
            owner.mark_dirty();
        }
    }
}

/// Setter returned by [`use_state`].
///
/// Writes land immediately; the owning component sees them on its next render.
pub struct SetState<T> {
    cell: Arc<StateCell<T>>,
}

impl<T: Clone> SetState<T> {
    /// Replace the value.
    pub fn set(&self, value: T) {
        *self.cell.value.write() = value;
        self.cell.changed();
    }

    /// Update the value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut value = self.cell.value.write();
            f(&mut *value);
        }
        self.cell.changed();
    }

    /// The latest value, including writes not yet rendered.
    pub fn get(&self) -> T {
        self.cell.value.read().clone()
    }
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

/// A value that survives renders, plus a setter.
///
/// `initial` is only used on mount; later renders return the current value.
///
/// # Panics
///
/// Panics when called outside of a render.
pub fn use_state<T>(initial: T) -> (T, SetState<T>)
where
    T: Clone + Send + Sync + 'static,
{
    let component = Component::rendering();
    let owner = Arc::downgrade(&component);
    let cell = component.slot(move || StateCell {
        value: RwLock::new(initial),
        owner,
    });

    let value = cell.value.read().clone();
    (value, SetState { cell })
}
