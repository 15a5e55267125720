//! Derived - computed value that recomputes when its inputs change.
//!
//! A derived wraps a computation in an internal effect, caches the result,
//! and notifies its own subscribers only when the recomputed value actually
//! differs. Reading a derived from another effect chains the dependency.

use std::cell::RefCell;
use std::rc::Rc;

use super::effect::Effect;
use super::runtime;
use super::runtime::DepId;

/// A cached reactive computation.
pub struct Derived<T: 'static> {
    dep: DepId,
    value: Rc<RefCell<Option<T>>>,
    effect: Rc<Effect>,
}

/// Create a derived from a computation.
///
/// The computation runs once immediately; afterwards it re-runs whenever a
/// tracked input changes, and downstream effects only re-run when the
/// computed value is actually different.
pub fn derived<T: Clone + PartialEq + 'static>(f: impl Fn() -> T + 'static) -> Derived<T> {
    let dep = runtime::next_dep_id();
    let value: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));

    let slot = value.clone();
    let effect = Effect::new(move || {
        let next = f();
        let changed = {
            let mut slot = slot.borrow_mut();
            let changed = slot.as_ref() != Some(&next);
            if changed {
                *slot = Some(next);
            }
            changed
        };
        if changed {
            runtime::trigger(dep);
        }
    });

    Derived {
        dep,
        value,
        effect: Rc::new(effect),
    }
}

impl<T: Clone + 'static> Derived<T> {
    /// Read the cached value, tracking the derived as a dependency.
    pub fn get(&self) -> T {
        runtime::track(self.dep);
        self.value
            .borrow()
            .clone()
            .expect("derived is computed on creation")
    }
}

impl<T: 'static> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Derived {
            dep: self.dep,
            value: self.value.clone(),
            effect: self.effect.clone(),
        }
    }
}

impl<T: 'static> Drop for Derived<T> {
    fn drop(&mut self) {
        if Rc::strong_count(&self.value) == 1 {
            self.effect.stop();
            runtime::remove_dep(self.dep);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
