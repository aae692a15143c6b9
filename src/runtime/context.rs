use parking_lot::Mutex;
use std::any::Any;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

type Slot = Arc<dyn Any + Send + Sync>;
type PendingEffect = Box<dyn FnOnce() + Send>;

/// Per-component hook storage.
struct HookTable {
    // Hook slots in call order
    slots: Vec<Slot>,
    cursor: usize,
    // Effects queued by the current render, run on commit
    pending: Vec<PendingEffect>,
    // Set once a render has established the hook layout
    mounted: bool,
}

impl HookTable {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            cursor: 0,
            pending: Vec::new(),
            mounted: false,
        }
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.cursor = 0;
        self.pending.clear();
        self.mounted = false;
    }
}

// Thread-local stack of components currently rendering
thread_local! {
    static RENDER_STACK: RefCell<Vec<Arc<Component>>> = const { RefCell::new(Vec::new()) };
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// A component instance: the owner of hook state across renders.
///
/// Rendering runs a closure with this component as the current hook owner.
/// Hooks called inside the closure claim slots in call order, so every render
/// must call the same hooks in the same order. Effects requested during a
/// render are deferred until [`commit`](Component::commit).
///
/// # Examples
///
/// ```
/// use tincache::runtime::Component;
/// use tincache::hooks::use_state;
///
/// let component = Component::new();
/// let (count, set_count) = component.render(|| use_state(1));
/// assert_eq!(count, 1);
///
/// set_count.set(2);
/// assert!(component.needs_render());
///
/// let (count, _) = component.render(|| use_state(1));
/// assert_eq!(count, 2);
/// ```
pub struct Component {
    id: usize,
    hooks: Mutex<HookTable>,
    dirty: AtomicBool,
    renders: AtomicUsize,
}

impl Component {
    /// Create a new, unmounted component.
    pub fn new() -> Arc<Self> {
        Arc::new(Component {
            id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
            hooks: Mutex::new(HookTable::new()),
            dirty: AtomicBool::new(false),
            renders: AtomicUsize::new(0),
        })
    }

    /// Unique id of this component.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The component currently rendering on this thread, if any.
    pub fn current() -> Option<Arc<Self>> {
        RENDER_STACK.with(|stack| stack.borrow().last().cloned())
    }

    /// The component currently rendering on this thread.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a render.
    pub(crate) fn rendering() -> Arc<Self> {
        match Self::current() {
            Some(component) => component,
            None => panic!("hooks can only be called while a component is rendering"),
        }
    }

    /// Render and immediately commit.
    pub fn render<F, R>(self: &Arc<Self>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let result = self.render_without_commit(f);
        self.commit();
        result
    }

    /// Run the render phase only. Effects stay queued until
    /// [`commit`](Component::commit); a later render discards them.
    ///
    /// # Panics
    ///
    /// Panics if the render calls a different number of hooks than the
    /// render that mounted the component.
    pub fn render_without_commit<F, R>(self: &Arc<Self>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        {
            let mut hooks = self.hooks.lock();
            hooks.cursor = 0;
            hooks.pending.clear();
        }
        self.dirty.store(false, Ordering::SeqCst);

        RENDER_STACK.with(|stack| {
            stack.borrow_mut().push(Arc::clone(self));
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        RENDER_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        let result = match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        };

        let mut hooks = self.hooks.lock();
        if hooks.mounted && hooks.cursor != hooks.slots.len() {
            let (called, expected) = (hooks.cursor, hooks.slots.len());
            drop(hooks);
            panic!("rendered {called} hooks, expected {expected}; hook order must not change between renders");
        }
        // A render that called no hooks (e.g. bailed out with an error) leaves
        // the component unmounted, so the next render can still mount it.
        if hooks.cursor > 0 {
            hooks.mounted = true;
        }
        drop(hooks);

        let renders = self.renders.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(component = self.id, renders, "rendered");
        result
    }

    /// Run effects queued by the last render, in the order they were requested.
    pub fn commit(&self) {
        let pending = std::mem::take(&mut self.hooks.lock().pending);
        trace!(component = self.id, effects = pending.len(), "commit");
        for effect in pending {
            effect();
        }
    }

    /// Drop all hook state and any uncommitted effects.
    ///
    /// The next render mounts the component afresh.
    pub fn unmount(&self) {
        self.hooks.lock().clear();
        self.dirty.store(false, Ordering::SeqCst);
        trace!(component = self.id, "unmounted");
    }

    /// Whether state changed since the last render.
    pub fn needs_render(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Number of completed render phases.
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Whether a render has established hook state.
    pub fn is_mounted(&self) -> bool {
        self.hooks.lock().mounted
    }

    pub(crate) fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Claim the next hook slot, creating it with `init` on mount.
    ///
    /// # Panics
    ///
    /// Panics if the slot holds a different hook type, or if a mounted
    /// component asks for more slots than it mounted with.
    pub(crate) fn slot<T, F>(&self, init: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let mut hooks = self.hooks.lock();
        let index = hooks.cursor;
        hooks.cursor += 1;

        let slot = match hooks.slots.get(index) {
            Some(slot) => Arc::clone(slot),
            None if hooks.mounted => {
                drop(hooks);
                panic!("hook {index} was not called on mount; hook order must not change between renders");
            }
            None => {
                let slot: Slot = Arc::new(init());
                hooks.slots.push(Arc::clone(&slot));
                slot
            }
        };
        drop(hooks);

        match slot.downcast::<T>() {
            Ok(slot) => slot,
            Err(_) => panic!("hook {index} changed type between renders"),
        }
    }

    /// Queue `effect` to run on the next commit.
    pub(crate) fn queue_effect(&self, effect: impl FnOnce() + Send + 'static) {
        self.hooks.lock().pending.push(Box::new(effect));
    }
}
