//! Core value types shared across the crate.
//!
//! Prop values, sibling keys, and the ordered prop map that vnodes carry.
//! These are plain data - the reactive wrappers live in [`crate::signals`].

use std::fmt;
use std::rc::Rc;

// =============================================================================
// Handler
// =============================================================================

/// An event handler carried in a prop whose name begins with `on`.
///
/// Handlers compare by `Rc` pointer identity: two clones of the same handler
/// are equal, two separately-created closures never are. This is what makes
/// prop diffing skip re-binding an unchanged handler.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&[Value])>);

impl Handler {
    /// Wrap a closure as a handler.
    pub fn new(f: impl Fn(&[Value]) + 'static) -> Self {
        Handler(Rc::new(f))
    }

    /// Invoke the handler with the given arguments.
    pub fn call(&self, args: &[Value]) {
        (self.0)(args)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

// =============================================================================
// Value
// =============================================================================

/// A prop or attribute value.
///
/// `Null` stands in for the source language's null/undefined: a declared prop
/// receiving `Null` falls back to its default, and diffing a prop to `Null`
/// removes it from the host.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Num(f64),
    Str(String),
    Handler(Handler),
}

impl Value {
    /// Wrap a closure as a handler value.
    pub fn handler(f: impl Fn(&[Value]) + 'static) -> Self {
        Value::Handler(Handler::new(f))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Value::Handler(h) => Some(h),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Handler> for Value {
    fn from(h: Handler) -> Self {
        Value::Handler(h)
    }
}

// =============================================================================
// Key
// =============================================================================

/// Sibling identity token used by the keyed children diff.
///
/// Matching is strict equality. Within one parent no two siblings may share
/// the same key; keyless siblings are matched positionally.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Str(String),
    Int(i64),
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n as i64)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Ordered name → [`Value`] mapping carried by a vnode.
///
/// Insertion order is preserved so host mutations replay deterministically.
/// Prop maps are small; lookups are linear scans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: Vec<(String, Value)>,
}

impl Props {
    pub fn new() -> Self {
        Props::default()
    }

    /// Builder-style insert, for constructing vnodes inline.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace a prop.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for Props {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (name, value) in iter {
            props.set(name, value);
        }
        props
    }
}

/// Whether a prop name denotes an event handler (`on` prefix).
pub fn is_event_name(name: &str) -> bool {
    name.len() > 2 && name.starts_with("on")
}

/// Prop name an emitted event resolves to: `foo` → `onFoo`.
pub fn event_prop_name(event: &str) -> String {
    let mut name = String::with_capacity(event.len() + 2);
    name.push_str("on");
    let mut chars = event.chars();
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_identity_equality() {
        let a = Handler::new(|_| {});
        let b = a.clone();
        let c = Handler::new(|_| {});

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_props_insertion_order() {
        let props = Props::new().with("id", "x").with("class", "y").with("id", "z");

        let keys: Vec<&str> = props.keys().collect();
        assert_eq!(keys, vec!["id", "class"]);
        assert_eq!(props.get("id"), Some(&Value::Str("z".to_string())));
    }

    #[test]
    fn test_event_prop_name() {
        assert_eq!(event_prop_name("click"), "onClick");
        assert_eq!(event_prop_name("add"), "onAdd");
        assert_eq!(event_prop_name(""), "on");
    }

    #[test]
    fn test_is_event_name() {
        assert!(is_event_name("onClick"));
        assert!(!is_event_name("on"));
        assert!(!is_event_name("id"));
    }
}
