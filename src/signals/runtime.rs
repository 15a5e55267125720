//! Reactive runtime - dependency graph, trigger propagation, flush queue.
//!
//! One thread-local runtime holds every subscription edge between trackable
//! nodes (signals, map keys, deriveds) and effects. Reads inside a running
//! effect record an edge; writes walk the edges and either re-run subscribers
//! inline (sync effects) or push them onto the flush queue (queued effects).
//!
//! The queue is the crate's microtask-equivalent boundary: jobs are
//! deduplicated through a pending set, drained by a single flush loop guarded
//! by `is_flushing`, and held back while a [`batch`] is open. At most one
//! pending run exists per effect.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

// =============================================================================
// Identifiers
// =============================================================================

/// Identity of a trackable node (signal, derived, reactive-map key).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct DepId(u64);

/// Identity of a registered effect.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct EffectId(u64);

/// How an effect reacts to a trigger.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Scheduling {
    /// Re-run inline on write.
    Sync,
    /// Enqueue into the flush queue; drained at the batch boundary.
    Queued,
}

// =============================================================================
// Runtime State
// =============================================================================

type EffectFn = Rc<RefCell<dyn FnMut()>>;

struct EffectEntry {
    f: EffectFn,
    scheduling: Scheduling,
}

#[derive(Default)]
struct Runtime {
    next_id: u64,
    /// Stack of currently-running effects; reads track against the top.
    active: Vec<EffectId>,
    /// Dep → effects subscribed to it.
    subscribers: HashMap<DepId, HashSet<EffectId>>,
    /// Effect → deps it read on its last run (cleared before each re-run).
    dependencies: HashMap<EffectId, HashSet<DepId>>,
    effects: HashMap<EffectId, EffectEntry>,
    queue: VecDeque<EffectId>,
    pending: HashSet<EffectId>,
    is_flushing: bool,
    batch_depth: u32,
}

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::default());
}

fn fresh_id() -> u64 {
    RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        rt.next_id += 1;
        rt.next_id
    })
}

// =============================================================================
// Tracking
// =============================================================================

/// Allocate an identity for a new trackable node.
pub(crate) fn next_dep_id() -> DepId {
    DepId(fresh_id())
}

/// Record a read of `dep` by the currently-running effect, if any.
pub(crate) fn track(dep: DepId) {
    RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        if let Some(&effect) = rt.active.last() {
            rt.subscribers.entry(dep).or_default().insert(effect);
            rt.dependencies.entry(effect).or_default().insert(dep);
        }
    });
}

/// Notify every subscriber of `dep` that its value changed.
///
/// Sync subscribers re-run inline; queued subscribers are deduplicated into
/// the flush queue, which drains once the run stack has unwound. A sync
/// effect currently on the run stack is skipped (a writer never re-enters
/// itself inline); a queued effect that writes its own dependency simply
/// re-queues for the next flush.
pub(crate) fn trigger(dep: DepId) {
    let mut to_notify: Vec<(EffectId, Scheduling)> = RUNTIME.with(|rt| {
        let rt = rt.borrow();
        let Some(subs) = rt.subscribers.get(&dep) else {
            return Vec::new();
        };
        subs.iter()
            .filter_map(|id| rt.effects.get(id).map(|e| (*id, e.scheduling)))
            .filter(|(id, scheduling)| {
                *scheduling == Scheduling::Queued || !rt.active.contains(id)
            })
            .collect()
    });
    // Registration order doubles as dependency-discovery order.
    to_notify.sort_by_key(|(id, _)| id.0);

    for (id, scheduling) in to_notify {
        match scheduling {
            Scheduling::Sync => run_effect(id),
            Scheduling::Queued => enqueue(id),
        }
    }
    maybe_flush();
}

/// Forget a trackable node entirely (its owner was dropped).
pub(crate) fn remove_dep(dep: DepId) {
    RUNTIME.with(|rt| {
        rt.borrow_mut().subscribers.remove(&dep);
        // Stale entries in per-effect dep sets are cleared on the effect's
        // next run; the id is never reused.
    });
}

// =============================================================================
// Effects
// =============================================================================

/// Register an effect and run it once immediately, tracking its reads.
pub(crate) fn create_effect(f: impl FnMut() + 'static, scheduling: Scheduling) -> EffectId {
    let id = EffectId(fresh_id());
    RUNTIME.with(|rt| {
        rt.borrow_mut().effects.insert(
            id,
            EffectEntry {
                f: Rc::new(RefCell::new(f)),
                scheduling,
            },
        );
    });
    run_effect(id);
    id
}

/// Unsubscribe and drop an effect. A stopped effect never runs again.
pub(crate) fn stop_effect(id: EffectId) {
    RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        rt.effects.remove(&id);
        if let Some(deps) = rt.dependencies.remove(&id) {
            for dep in deps {
                if let Some(subs) = rt.subscribers.get_mut(&dep) {
                    subs.remove(&id);
                }
            }
        }
        rt.pending.remove(&id);
        rt.queue.retain(|queued| *queued != id);
    });
}

fn run_effect(id: EffectId) {
    let f = RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        let entry = rt.effects.get(&id)?;
        let f = entry.f.clone();
        // Drop last run's edges so conditional reads don't accumulate.
        if let Some(deps) = rt.dependencies.remove(&id) {
            for dep in deps {
                if let Some(subs) = rt.subscribers.get_mut(&dep) {
                    subs.remove(&id);
                }
            }
        }
        rt.active.push(id);
        Some(f)
    });
    let Some(f) = f else {
        return;
    };
    (f.borrow_mut())();
    RUNTIME.with(|rt| {
        rt.borrow_mut().active.pop();
    });
    // Jobs queued mid-run drain once the stack has unwound.
    maybe_flush();
}

// =============================================================================
// Flush Queue
// =============================================================================

fn enqueue(id: EffectId) {
    RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        if rt.pending.insert(id) {
            rt.queue.push_back(id);
        }
    });
}

fn maybe_flush() {
    let proceed = RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        if rt.is_flushing || rt.batch_depth > 0 || !rt.active.is_empty() || rt.queue.is_empty() {
            false
        } else {
            rt.is_flushing = true;
            true
        }
    });
    if !proceed {
        return;
    }
    loop {
        let next = RUNTIME.with(|rt| {
            let mut rt = rt.borrow_mut();
            match rt.queue.pop_front() {
                Some(id) => {
                    rt.pending.remove(&id);
                    Some(id)
                }
                None => {
                    rt.is_flushing = false;
                    None
                }
            }
        });
        match next {
            Some(id) => run_effect(id),
            None => break,
        }
    }
}

/// Run `f` with queued-effect flushing deferred to the end of the outermost
/// batch. Writes inside the batch coalesce to at most one run per effect.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    RUNTIME.with(|rt| rt.borrow_mut().batch_depth += 1);
    let result = f();
    RUNTIME.with(|rt| rt.borrow_mut().batch_depth -= 1);
    maybe_flush();
    result
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all runtime state (for testing).
pub fn reset_runtime() {
    RUNTIME.with(|rt| {
        *rt.borrow_mut() = Runtime::default();
    });
}
