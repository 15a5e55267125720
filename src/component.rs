//! Component descriptors and the setup-time registration surface.
//!
//! A [`ComponentDef`] declares everything the runtime needs to mount a
//! component: the prop declaration, `setup`, an optional legacy `data`
//! factory, the render function and lifecycle hooks. Defs are built once and
//! shared behind `Rc`; vnode identity for components is def identity.
//!
//! [`on_mounted`] registers a callback during `setup` through an ambient
//! current-instance register - a thread-local stack entered only while the
//! runtime invokes `setup`, so it is balanced by construction.

use std::cell::RefCell;
use std::rc::Rc;

use log::warn;

use crate::renderer::RenderCtx;
use crate::signals::ReadonlyMap;
use crate::types::Value;
use crate::vnode::{Slots, VNode};

/// Render function: produces the component subtree from the render context.
pub type RenderFn = Rc<dyn Fn(&RenderCtx) -> VNode>;

/// Lifecycle hook bound to the render context.
pub type LifecycleHook = Rc<dyn Fn(&RenderCtx)>;

/// `setup` function: receives read-only props and the setup context.
pub type SetupFn = Rc<dyn Fn(&ReadonlyMap<Value>, &SetupContext) -> SetupResult>;

/// Legacy `data` factory: produces the initial reactive state entries.
pub type DataFn = Rc<dyn Fn() -> Vec<(String, Value)>>;

// =============================================================================
// Prop Declaration
// =============================================================================

/// Default for a declared prop. Factory defaults are invoked per mount.
#[derive(Clone)]
pub enum PropDefault {
    Value(Value),
    Factory(Rc<dyn Fn() -> Value>),
}

/// One declared component input.
#[derive(Clone)]
pub struct PropDecl {
    pub name: String,
    pub default: Option<PropDefault>,
}

// =============================================================================
// Setup
// =============================================================================

/// Capability to raise an event toward the parent: `emit("foo", ..)` invokes
/// the `onFoo` prop if the parent supplied one.
#[derive(Clone)]
pub struct Emit(Rc<dyn Fn(&str, &[Value])>);

impl Emit {
    pub(crate) fn new(f: impl Fn(&str, &[Value]) + 'static) -> Emit {
        Emit(Rc::new(f))
    }

    pub fn emit(&self, event: &str, args: &[Value]) {
        (self.0)(event, args)
    }
}

/// Second argument to `setup`: the non-reactive surroundings of the instance.
pub struct SetupContext {
    /// Undeclared incoming props, as passed at mount.
    pub attrs: crate::types::Props,
    pub emit: Emit,
    pub slots: Slots,
}

/// A named binding exposed by `setup` to the render context.
#[derive(Clone)]
pub enum Binding {
    /// Plain value; readable through the context, writes replace it silently.
    Value(Value),
    /// Reactive cell; reads track it, writes go through `Signal::set`.
    Signal(crate::signals::Signal<Value>),
}

/// What `setup` returned: a render function, or bindings for the context.
pub enum SetupResult {
    Render(RenderFn),
    Bindings(Vec<(String, Binding)>),
}

impl SetupResult {
    pub fn render(f: impl Fn(&RenderCtx) -> VNode + 'static) -> SetupResult {
        SetupResult::Render(Rc::new(f))
    }

    pub fn bindings(entries: impl IntoIterator<Item = (String, Binding)>) -> SetupResult {
        SetupResult::Bindings(entries.into_iter().collect())
    }
}

// =============================================================================
// Component Definition
// =============================================================================

/// Component descriptor. Build with the chained setters, then share via `Rc`.
///
/// # Example
///
/// ```ignore
/// use std::rc::Rc;
/// use ember_vdom::{ComponentDef, SetupResult, Binding, Value, VNode, Props, Children};
/// use ember_vdom::signals::signal;
///
/// let counter = Rc::new(
///     ComponentDef::new("counter")
///         .prop_with_default("start", 0)
///         .setup(|props, _ctx| {
///             let count = signal(props.get("start").unwrap_or(Value::Null));
///             SetupResult::bindings([("count".to_string(), Binding::Signal(count))])
///         })
///         .render(|ctx| {
///             VNode::element("div", Props::new(), Children::text(format!("{:?}", ctx.get("count"))))
///         }),
/// );
/// ```
pub struct ComponentDef {
    /// Diagnostic name; not used for identity.
    pub name: String,
    /// Bare render function wrapped as a component: no declaration, the
    /// whole incoming prop set is the render input.
    pub(crate) is_functional: bool,
    pub(crate) props: Vec<PropDecl>,
    pub(crate) setup: Option<SetupFn>,
    pub(crate) data: Option<DataFn>,
    pub(crate) render: Option<RenderFn>,
    pub(crate) before_create: Option<Rc<dyn Fn()>>,
    pub(crate) created: Option<LifecycleHook>,
    pub(crate) before_mount: Option<LifecycleHook>,
    pub(crate) mounted: Option<LifecycleHook>,
    pub(crate) before_update: Option<LifecycleHook>,
    pub(crate) updated: Option<LifecycleHook>,
    pub(crate) before_unmount: Option<LifecycleHook>,
    pub(crate) unmounted: Option<LifecycleHook>,
}

impl ComponentDef {
    pub fn new(name: impl Into<String>) -> ComponentDef {
        ComponentDef {
            name: name.into(),
            is_functional: false,
            props: Vec::new(),
            setup: None,
            data: None,
            render: None,
            before_create: None,
            created: None,
            before_mount: None,
            mounted: None,
            before_update: None,
            updated: None,
            before_unmount: None,
            unmounted: None,
        }
    }

    /// Wrap a bare render function as a component with no declaration.
    pub(crate) fn functional(render: RenderFn) -> ComponentDef {
        let mut def = ComponentDef::new("functional");
        def.is_functional = true;
        def.render = Some(render);
        def
    }

    /// Declare a prop with no default.
    pub fn prop(mut self, name: impl Into<String>) -> Self {
        self.props.push(PropDecl {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Declare a prop with a default value.
    pub fn prop_with_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.props.push(PropDecl {
            name: name.into(),
            default: Some(PropDefault::Value(default.into())),
        });
        self
    }

    /// Declare a prop whose default is produced per mount.
    pub fn prop_with_factory(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Value + 'static,
    ) -> Self {
        self.props.push(PropDecl {
            name: name.into(),
            default: Some(PropDefault::Factory(Rc::new(factory))),
        });
        self
    }

    pub fn setup(
        mut self,
        f: impl Fn(&ReadonlyMap<Value>, &SetupContext) -> SetupResult + 'static,
    ) -> Self {
        self.setup = Some(Rc::new(f));
        self
    }

    /// Legacy reactive state factory.
    pub fn data(mut self, f: impl Fn() -> Vec<(String, Value)> + 'static) -> Self {
        self.data = Some(Rc::new(f));
        self
    }

    pub fn render(mut self, f: impl Fn(&RenderCtx) -> VNode + 'static) -> Self {
        self.render = Some(Rc::new(f));
        self
    }

    pub fn before_create(mut self, f: impl Fn() + 'static) -> Self {
        self.before_create = Some(Rc::new(f));
        self
    }

    pub fn created(mut self, f: impl Fn(&RenderCtx) + 'static) -> Self {
        self.created = Some(Rc::new(f));
        self
    }

    pub fn before_mount(mut self, f: impl Fn(&RenderCtx) + 'static) -> Self {
        self.before_mount = Some(Rc::new(f));
        self
    }

    pub fn mounted(mut self, f: impl Fn(&RenderCtx) + 'static) -> Self {
        self.mounted = Some(Rc::new(f));
        self
    }

    pub fn before_update(mut self, f: impl Fn(&RenderCtx) + 'static) -> Self {
        self.before_update = Some(Rc::new(f));
        self
    }

    pub fn updated(mut self, f: impl Fn(&RenderCtx) + 'static) -> Self {
        self.updated = Some(Rc::new(f));
        self
    }

    pub fn before_unmount(mut self, f: impl Fn(&RenderCtx) + 'static) -> Self {
        self.before_unmount = Some(Rc::new(f));
        self
    }

    pub fn unmounted(mut self, f: impl Fn(&RenderCtx) + 'static) -> Self {
        self.unmounted = Some(Rc::new(f));
        self
    }

    /// Whether `name` appears in the prop declaration.
    pub(crate) fn declares(&self, name: &str) -> bool {
        self.props.iter().any(|decl| decl.name == name)
    }
}

// =============================================================================
// Current-Instance Register
// =============================================================================

/// Where `on_mounted` callbacks land: the mounted-callback list of the
/// instance currently running `setup`.
pub(crate) type MountedSink = Rc<RefCell<Vec<Box<dyn FnOnce()>>>>;

thread_local! {
    /// Stack of instances currently inside `setup`. Pushed and popped only
    /// by the component runtime, so it is balanced even when setups nest.
    static SETUP_STACK: RefCell<Vec<MountedSink>> = RefCell::new(Vec::new());
}

pub(crate) fn push_setup_sink(sink: MountedSink) {
    SETUP_STACK.with(|stack| stack.borrow_mut().push(sink));
}

pub(crate) fn pop_setup_sink() {
    SETUP_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

/// Register a callback to run after the component currently in `setup` has
/// mounted. Outside `setup` this is a logged no-op.
pub fn on_mounted(cb: impl FnOnce() + 'static) {
    SETUP_STACK.with(|stack| {
        let stack = stack.borrow();
        match stack.last() {
            Some(sink) => sink.borrow_mut().push(Box::new(cb)),
            None => warn!("on_mounted called outside component setup; callback dropped"),
        }
    });
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_on_mounted_outside_setup_is_noop() {
        let called = Rc::new(Cell::new(false));
        let called_inner = called.clone();
        on_mounted(move || called_inner.set(true));
        assert!(!called.get());
    }

    #[test]
    fn test_on_mounted_registers_into_current_sink() {
        let sink: MountedSink = Rc::new(RefCell::new(Vec::new()));
        push_setup_sink(sink.clone());
        on_mounted(|| {});
        on_mounted(|| {});
        pop_setup_sink();

        assert_eq!(sink.borrow().len(), 2);

        // After popping, registrations are dropped again.
        on_mounted(|| {});
        assert_eq!(sink.borrow().len(), 2);
    }

    #[test]
    fn test_declares() {
        let def = ComponentDef::new("x").prop("title").prop_with_default("count", 0);
        assert!(def.declares("title"));
        assert!(def.declares("count"));
        assert!(!def.declares("onClick"));
    }
}
