//! Swappable new-version callback.

use arc_swap::ArcSwap;
use std::sync::Arc;

struct Callback(Box<dyn Fn() + Send + Sync>);

/// Holds the host's current `on_new_version_available` callback.
///
/// The monitor reads the slot at notification time, so replacing the callback
/// takes effect on the next detection without restarting the monitor.
///
/// # Examples
///
/// ```rust
/// use deploy_watch::notify::CallbackSlot;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
/// let slot = CallbackSlot::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// slot.notify();
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
///
/// slot.replace(|| {});
/// slot.notify();
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
pub struct CallbackSlot {
    current: ArcSwap<Callback>,
}

impl CallbackSlot {
    /// Create a slot holding `callback`.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            current: ArcSwap::from_pointee(Callback(Box::new(callback))),
        }
    }

    /// Replace the callback. In-progress invocations finish with the old one.
    pub fn replace<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.current.store(Arc::new(Callback(Box::new(callback))));
    }

    /// Invoke the current callback.
    pub fn notify(&self) {
        let callback = self.current.load_full();
        (callback.0)();
    }
}

impl std::fmt::Debug for CallbackSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSlot").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_invokes_current() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let first_clone = Arc::clone(&first);
        let slot = CallbackSlot::new(move || {
            first_clone.fetch_add(1, Ordering::SeqCst);
        });
        slot.notify();

        let second_clone = Arc::clone(&second);
        slot.replace(move || {
            second_clone.fetch_add(1, Ordering::SeqCst);
        });
        slot.notify();
        slot.notify();

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_replace_from_inside_callback() {
        let slot = Arc::new(CallbackSlot::new(|| {}));
        let hits = Arc::new(AtomicUsize::new(0));

        let inner = Arc::clone(&slot);
        let hits_clone = Arc::clone(&hits);
        slot.replace(move || {
            let hits = Arc::clone(&hits_clone);
            inner.replace(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        });

        slot.notify();
        slot.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
