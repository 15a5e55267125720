//! Effect - side-effect runner with automatic dependency tracking.
//!
//! An effect runs its body once on creation, recording every reactive read.
//! Any later write to a recorded dependency re-runs the body (and re-records,
//! so conditional reads stay accurate).

use super::runtime;
use super::runtime::{EffectId, Scheduling};

/// Handle to a registered effect.
///
/// The body keeps running on dependency writes until [`Effect::stop`] is
/// called. Dropping the handle does NOT stop the effect; teardown is always
/// explicit so a mounted component can hold its render effect by handle.
#[derive(Debug)]
pub struct Effect {
    id: EffectId,
}

impl Effect {
    /// Register `f` and run it immediately. Re-runs happen inline on write.
    pub fn new(f: impl FnMut() + 'static) -> Effect {
        Effect {
            id: runtime::create_effect(f, Scheduling::Sync),
        }
    }

    /// Register `f` with queued scheduling: writes enqueue the re-run into
    /// the flush queue instead of running it inline. The first run is still
    /// immediate. This is what the component render loop uses.
    pub(crate) fn queued(f: impl FnMut() + 'static) -> Effect {
        Effect {
            id: runtime::create_effect(f, Scheduling::Queued),
        }
    }

    /// Stop the effect. It is unsubscribed from every dependency and its
    /// body is dropped; a stopped effect never runs again.
    pub fn stop(&self) {
        runtime::stop_effect(self.id);
    }
}

/// Run `f` as a reactive effect; returns a stop function.
///
/// ```ignore
/// use ember_vdom::signals::{signal, effect};
///
/// let count = signal(0);
/// let count_inner = count.clone();
/// let stop = effect(move || {
///     println!("count is {}", count_inner.get());
/// });
///
/// count.set(1); // effect re-runs
/// stop();       // effect is gone
/// ```
pub fn effect(f: impl FnMut() + 'static) -> impl FnOnce() {
    let handle = Effect::new(f);
    move || handle.stop()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::runtime::{batch, reset_runtime};
    use crate::signals::signal::signal;
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() {
        reset_runtime();
    }

    #[test]
    fn test_effect_runs_immediately() {
        setup();

        let ran = Rc::new(Cell::new(false));
        let ran_inner = ran.clone();
        let _stop = effect(move || ran_inner.set(true));
        assert!(ran.get());
    }

    #[test]
    fn test_queued_effect_coalesces_in_batch() {
        setup();

        let a = signal(0);
        let b = signal(0);
        let runs = Rc::new(Cell::new(0));

        let a_inner = a.clone();
        let b_inner = b.clone();
        let runs_inner = runs.clone();
        let handle = Effect::queued(move || {
            let _ = a_inner.get();
            let _ = b_inner.get();
            runs_inner.set(runs_inner.get() + 1);
        });

        assert_eq!(runs.get(), 1);

        batch(|| {
            a.set(1);
            b.set(2);
        });
        // Two writes, one flush, one re-run.
        assert_eq!(runs.get(), 2);

        handle.stop();
    }

    #[test]
    fn test_queued_effect_flushes_outside_batch() {
        setup();

        let a = signal(0);
        let runs = Rc::new(Cell::new(0));

        let a_inner = a.clone();
        let runs_inner = runs.clone();
        let handle = Effect::queued(move || {
            let _ = a_inner.get();
            runs_inner.set(runs_inner.get() + 1);
        });

        a.set(1);
        assert_eq!(runs.get(), 2);

        handle.stop();
    }

    #[test]
    fn test_conditional_dependency_retracking() {
        setup();

        let gate = signal(true);
        let left = signal(0);
        let right = signal(0);
        let runs = Rc::new(Cell::new(0));

        let gate_inner = gate.clone();
        let left_inner = left.clone();
        let right_inner = right.clone();
        let runs_inner = runs.clone();
        let _stop = effect(move || {
            if gate_inner.get() {
                let _ = left_inner.get();
            } else {
                let _ = right_inner.get();
            }
            runs_inner.set(runs_inner.get() + 1);
        });

        assert_eq!(runs.get(), 1);

        // Tracked branch: left.
        left.set(1);
        assert_eq!(runs.get(), 2);
        right.set(1);
        assert_eq!(runs.get(), 2);

        // Flip the gate; now only right is tracked.
        gate.set(false);
        assert_eq!(runs.get(), 3);
        left.set(2);
        assert_eq!(runs.get(), 3);
        right.set(2);
        assert_eq!(runs.get(), 4);
    }
}
