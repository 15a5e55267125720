//! ReactiveMap - shallow-reactive string-keyed mapping.
//!
//! Each key has its own dependency identity, so an effect that read
//! `props.get("title")` only re-runs when `title` changes. The key set has a
//! separate identity tracked by iteration, `len`, and containment of missing
//! keys, so inserts and removals wake effects that enumerated the map.
//!
//! Clones share storage and subscriptions - a `ReactiveMap` is a handle, the
//! way component props need to be visible both to the runtime (writes on
//! re-resolution) and to the render context (tracked reads).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::runtime;
use super::runtime::DepId;

/// Shallow-reactive mapping from `String` keys to values.
pub struct ReactiveMap<V: Clone + PartialEq + 'static> {
    values: Rc<RefCell<HashMap<String, V>>>,
    /// Lazily-created per-key dependency identities. A key read before it
    /// exists still gets an identity, so a later insert wakes the reader.
    key_deps: Rc<RefCell<HashMap<String, DepId>>>,
    keys_dep: DepId,
}

impl<V: Clone + PartialEq + 'static> ReactiveMap<V> {
    pub fn new() -> Self {
        ReactiveMap {
            values: Rc::new(RefCell::new(HashMap::new())),
            key_deps: Rc::new(RefCell::new(HashMap::new())),
            keys_dep: runtime::next_dep_id(),
        }
    }

    /// Build from entries without triggering anything.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, V)>) -> Self {
        let map = Self::new();
        map.values.borrow_mut().extend(entries);
        map
    }

    fn dep_for(&self, key: &str) -> DepId {
        let mut deps = self.key_deps.borrow_mut();
        match deps.get(key) {
            Some(dep) => *dep,
            None => {
                let dep = runtime::next_dep_id();
                deps.insert(key.to_string(), dep);
                dep
            }
        }
    }

    fn existing_dep(&self, key: &str) -> Option<DepId> {
        self.key_deps.borrow().get(key).copied()
    }

    /// Read a key, tracking it as a dependency.
    pub fn get(&self, key: &str) -> Option<V> {
        runtime::track(self.dep_for(key));
        self.values.borrow().get(key).cloned()
    }

    /// Read a key without tracking.
    pub fn get_untracked(&self, key: &str) -> Option<V> {
        self.values.borrow().get(key).cloned()
    }

    /// Tracked containment check.
    pub fn contains(&self, key: &str) -> bool {
        runtime::track(self.dep_for(key));
        self.values.borrow().contains_key(key)
    }

    pub fn contains_untracked(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }

    /// Insert or replace. Triggers the key when the value changed and the
    /// key set when the key is new.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let (new_key, changed) = {
            let mut values = self.values.borrow_mut();
            let prev = values.get(&key);
            let unchanged = matches!(prev, Some(prev) if *prev == value);
            let new_key = prev.is_none();
            if unchanged {
                (false, false)
            } else {
                values.insert(key.clone(), value);
                (new_key, true)
            }
        };
        if changed {
            if let Some(dep) = self.existing_dep(&key) {
                runtime::trigger(dep);
            }
        }
        if new_key {
            runtime::trigger(self.keys_dep);
        }
    }

    /// Remove a key. Triggers the key and the key set when it was present.
    pub fn remove(&self, key: &str) -> Option<V> {
        let removed = self.values.borrow_mut().remove(key);
        if removed.is_some() {
            if let Some(dep) = self.existing_dep(key) {
                runtime::trigger(dep);
            }
            runtime::trigger(self.keys_dep);
        }
        removed
    }

    /// Snapshot of the key set, tracked against key-set changes.
    pub fn keys(&self) -> Vec<String> {
        runtime::track(self.keys_dep);
        self.values.borrow().keys().cloned().collect()
    }

    pub fn keys_untracked(&self) -> Vec<String> {
        self.values.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        runtime::track(self.keys_dep);
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only view for handing to code that must not write (setup props).
    pub fn readonly(&self) -> ReadonlyMap<V> {
        ReadonlyMap {
            inner: self.clone(),
        }
    }
}

impl<V: Clone + PartialEq + 'static> Default for ReactiveMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + PartialEq + 'static> Clone for ReactiveMap<V> {
    fn clone(&self) -> Self {
        ReactiveMap {
            values: self.values.clone(),
            key_deps: self.key_deps.clone(),
            keys_dep: self.keys_dep,
        }
    }
}

impl<V: Clone + PartialEq + 'static> Drop for ReactiveMap<V> {
    fn drop(&mut self) {
        if Rc::strong_count(&self.values) == 1 {
            for dep in self.key_deps.borrow().values() {
                runtime::remove_dep(*dep);
            }
            runtime::remove_dep(self.keys_dep);
        }
    }
}

/// Read-only view over a [`ReactiveMap`]. No write surface at all.
pub struct ReadonlyMap<V: Clone + PartialEq + 'static> {
    inner: ReactiveMap<V>,
}

impl<V: Clone + PartialEq + 'static> ReadonlyMap<V> {
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<V: Clone + PartialEq + 'static> Clone for ReadonlyMap<V> {
    fn clone(&self) -> Self {
        ReadonlyMap {
            inner: self.inner.clone(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
