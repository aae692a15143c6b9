use crate::runtime::Component;
use parking_lot::Mutex;

/// Run `effect` after the current render commits, but only when `deps`
/// differs from the dependencies of the last committed run.
///
/// The first render always schedules the effect. If the component unmounts
/// or re-renders before committing, the queued run is dropped and the
/// dependencies are not recorded.
///
/// # Examples
///
/// ```
/// use tincache::hooks::use_effect;
/// use tincache::runtime::Component;
/// use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
///
/// let component = Component::new();
/// let runs = Arc::new(AtomicUsize::new(0));
///
/// for deps in [1, 1, 2] {
///     let runs = runs.clone();
///     component.render(move || {
///         use_effect(deps, move || {
///             runs.fetch_add(1, Ordering::SeqCst);
///         });
///     });
/// }
///
/// // Ran on mount and when deps went from 1 to 2
/// assert_eq!(runs.load(Ordering::SeqCst), 2);
/// ```
///
/// # Panics
///
/// Panics when called outside of a render.
pub fn use_effect<D, F>(deps: D, effect: F)
where
    D: PartialEq + Send + 'static,
    F: FnOnce() + Send + 'static,
{
    let component = Component::rendering();
    let committed = component.slot(|| Mutex::new(None::<D>));

    if committed.lock().as_ref() == Some(&deps) {
        return;
    }

    component.queue_effect(move || {
        *committed.lock() = Some(deps);
        effect();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn render_with(component: &Arc<Component>, deps: (i32, &'static str), runs: &Arc<AtomicUsize>) {
        let runs = Arc::clone(runs);
        component.render(move || {
            use_effect(deps, move || {
                runs.fetch_add(1, Ordering::SeqCst);
            });
        });
    }

    #[test]
    fn effect_runs_on_mount() {
        let component = Component::new();
        let runs = Arc::new(AtomicUsize::new(0));
        render_with(&component, (0, "a"), &runs);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unchanged_deps_skip() {
        let component = Component::new();
        let runs = Arc::new(AtomicUsize::new(0));
        render_with(&component, (0, "a"), &runs);
        render_with(&component, (0, "a"), &runs);
        render_with(&component, (0, "b"), &runs);
        render_with(&component, (0, "b"), &runs);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn uncommitted_deps_are_not_recorded() {
        let component = Component::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let pending = Arc::clone(&runs);
        component.render_without_commit(move || {
            use_effect((1, "a"), move || {
                pending.fetch_add(1, Ordering::SeqCst);
            });
        });

        // Re-render supersedes the uncommitted one; deps still compare against nothing.
        render_with(&component, (1, "a"), &runs);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
