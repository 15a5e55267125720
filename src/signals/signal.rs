//! Signal - reactive value cell.
//!
//! `Signal<T>` holds a value and tracks dependencies when read inside an
//! effect. Writes notify every subscribed effect; writes of an equal value
//! are dropped before notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::runtime;
use super::runtime::DepId;

/// A reactive value cell.
///
/// Cheap to clone: clones share the value and the subscription identity, so
/// a signal can be captured by any number of closures. Dropping the last
/// clone unsubscribes it from the runtime.
pub struct Signal<T: 'static> {
    dep: DepId,
    value: Rc<RefCell<T>>,
}

/// Create a new signal holding `value`.
pub fn signal<T: 'static>(value: T) -> Signal<T> {
    Signal::new(value)
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Signal {
            dep: runtime::next_dep_id(),
            value: Rc::new(RefCell::new(value)),
        }
    }

    /// Read the current value, tracking the dependency when called from
    /// within an effect.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        runtime::track(self.dep);
        self.value.borrow().clone()
    }

    /// Read the current value without creating a dependency.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    /// Write a new value. Equal values do not notify subscribers.
    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        {
            let mut slot = self.value.borrow_mut();
            if *slot == value {
                return;
            }
            *slot = value;
        }
        runtime::trigger(self.dep);
    }

    /// Mutate the value in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
        runtime::trigger(self.dep);
    }
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Signal {
            dep: self.dep,
            value: self.value.clone(),
        }
    }
}

impl<T: 'static> Drop for Signal<T> {
    fn drop(&mut self) {
        // Last clone going away: release the subscription edges.
        if Rc::strong_count(&self.value) == 1 {
            runtime::remove_dep(self.dep);
        }
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.get_untracked())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::effect::effect;
    use crate::signals::runtime::reset_runtime;
    use std::cell::Cell;

    fn setup() {
        reset_runtime();
    }

    #[test]
    fn test_signal_get_set() {
        setup();

        let count = signal(0);
        assert_eq!(count.get(), 0);

        count.set(42);
        assert_eq!(count.get(), 42);

        count.update(|n| *n += 1);
        assert_eq!(count.get(), 43);
    }

    #[test]
    fn test_effect_reruns_on_write() {
        setup();

        let count = signal(0);
        let runs = Rc::new(Cell::new(0));

        let count_inner = count.clone();
        let runs_inner = runs.clone();
        let _stop = effect(move || {
            let _ = count_inner.get();
            runs_inner.set(runs_inner.get() + 1);
        });

        assert_eq!(runs.get(), 1);
        count.set(1);
        assert_eq!(runs.get(), 2);
        count.set(2);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_equal_write_does_not_trigger() {
        setup();

        let count = signal(5);
        let runs = Rc::new(Cell::new(0));

        let count_inner = count.clone();
        let runs_inner = runs.clone();
        let _stop = effect(move || {
            let _ = count_inner.get();
            runs_inner.set(runs_inner.get() + 1);
        });

        count.set(5);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_stopped_effect_never_reruns() {
        setup();

        let count = signal(0);
        let runs = Rc::new(Cell::new(0));

        let count_inner = count.clone();
        let runs_inner = runs.clone();
        let stop = effect(move || {
            let _ = count_inner.get();
            runs_inner.set(runs_inner.get() + 1);
        });

        stop();
        count.set(99);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_untracked_read_creates_no_dependency() {
        setup();

        let count = signal(0);
        let runs = Rc::new(Cell::new(0));

        let count_inner = count.clone();
        let runs_inner = runs.clone();
        let _stop = effect(move || {
            let _ = count_inner.get_untracked();
            runs_inner.set(runs_inner.get() + 1);
        });

        count.set(1);
        assert_eq!(runs.get(), 1);
    }
}
