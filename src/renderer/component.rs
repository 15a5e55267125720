//! Component runtime.
//!
//! Mounting a component resolves its declared inputs into a shallow-reactive
//! props map, runs `setup` under the current-instance register, and wires a
//! queued render effect: the effect calls the render function against the
//! render context, then patches the produced subtree into place. Any tracked
//! read - a prop, a `data()` state entry, a signal binding - re-queues the
//! effect on write, and the flush boundary guarantees at most one re-render
//! per burst of writes.
//!
//! Patching a component never touches the subtree directly: it carries the
//! instance across, synchronises props inside one batch, and lets the effect
//! do the rest.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::{trace, warn};

use super::patch::patch;
use super::RendererShared;
use crate::component::{
    pop_setup_sink, push_setup_sink, Binding, ComponentDef, Emit, MountedSink, PropDefault,
    RenderFn, SetupContext, SetupResult,
};
use crate::host::{HostAdapter, HostNode};
use crate::signals::{batch, Effect, ReactiveMap};
use crate::types::{event_prop_name, is_event_name, Props, Value};
use crate::vnode::{Children, NodeKind, Slots, VNode};

// =============================================================================
// ComponentInstance
// =============================================================================

/// Per-mount bookkeeping for a component vnode.
///
/// Owned by its vnode (via `Rc` handle) and by the render effect's closure;
/// both owners are released at unmount, which is what makes invariant-style
/// "no instance survives its subtree" hold.
pub struct ComponentInstance {
    pub(crate) def: Rc<ComponentDef>,
    /// Declared inputs, shallow-reactive: render effects re-run per key.
    pub(crate) props: ReactiveMap<Value>,
    /// Undeclared incoming props; plain, replaced wholesale on patch.
    pub(crate) attrs: RefCell<Props>,
    /// Legacy `data()` state, reactive when present.
    pub(crate) state: Option<ReactiveMap<Value>>,
    /// Bindings returned by `setup`.
    pub(crate) setup_state: RefCell<HashMap<String, Binding>>,
    pub(crate) slots: Slots,
    /// The vnode this instance last produced.
    pub(crate) sub_tree: RefCell<Option<Rc<VNode>>>,
    pub(crate) is_mounted: Cell<bool>,
    /// Callbacks registered through `on_mounted` during `setup`.
    pub(crate) mounted_cbs: MountedSink,
    /// Render function resolved from `setup` or the definition.
    pub(crate) render: RefCell<Option<RenderFn>>,
    /// The render effect; stopped at unmount.
    pub(crate) effect: RefCell<Option<Effect>>,
}

impl ComponentInstance {
    /// Raise `event` toward the parent: invokes the `onEvent` prop.
    pub fn emit(&self, event: &str, args: &[Value]) {
        let prop = event_prop_name(event);
        match self.props.get_untracked(&prop) {
            Some(Value::Handler(handler)) => handler.call(args),
            Some(_) => warn!("emit {:?}: prop {:?} is not a handler", event, prop),
            None => warn!("emit {:?}: no {:?} handler supplied", event, prop),
        }
    }
}

// =============================================================================
// RenderCtx
// =============================================================================

/// Unified read/write surface handed to render functions and lifecycle
/// hooks.
///
/// Reads resolve in order state → props → setup bindings and track whatever
/// container answered, so the render effect re-runs precisely when a read
/// value changes. Writes resolve state → props (refused) → setup bindings;
/// unknown names are reported and refused.
pub struct RenderCtx {
    instance: Rc<ComponentInstance>,
}

impl RenderCtx {
    pub(crate) fn new(instance: Rc<ComponentInstance>) -> RenderCtx {
        RenderCtx { instance }
    }

    /// Read `key`, tracking it as a dependency of the running effect.
    /// Unknown keys warn and yield [`Value::Null`].
    pub fn get(&self, key: &str) -> Value {
        if let Some(state) = &self.instance.state {
            if let Some(value) = state.get(key) {
                return value;
            }
        }
        if let Some(value) = self.instance.props.get(key) {
            return value;
        }
        let binding = self.instance.setup_state.borrow().get(key).cloned();
        if let Some(binding) = binding {
            return match binding {
                Binding::Value(value) => value,
                Binding::Signal(signal) => signal.get(),
            };
        }
        warn!(
            "render context of {:?}: unknown key {:?}",
            self.instance.def.name, key
        );
        Value::Null
    }

    /// Write `key`. Prop writes are refused - props flow down.
    pub fn set(&self, key: &str, value: Value) {
        if let Some(state) = &self.instance.state {
            if state.contains_untracked(key) {
                state.insert(key, value);
                return;
            }
        }
        if self.instance.props.contains_untracked(key) {
            warn!(
                "render context of {:?}: refusing write to prop {:?}",
                self.instance.def.name, key
            );
            return;
        }
        let binding = self.instance.setup_state.borrow().get(key).cloned();
        match binding {
            Some(Binding::Signal(signal)) => signal.set(value),
            Some(Binding::Value(_)) => {
                self.instance
                    .setup_state
                    .borrow_mut()
                    .insert(key.to_string(), Binding::Value(value));
            }
            None => warn!(
                "render context of {:?}: unknown key {:?}",
                self.instance.def.name, key
            ),
        }
    }

    /// Invoke the named slot, if the parent supplied one.
    pub fn slot(&self, name: &str) -> Option<VNode> {
        self.instance.slots.get(name).map(|thunk| thunk())
    }

    /// The full slot mapping.
    pub fn slots(&self) -> &Slots {
        &self.instance.slots
    }

    /// Snapshot of the undeclared incoming props.
    pub fn attrs(&self) -> Props {
        self.instance.attrs.borrow().clone()
    }

    /// Raise `event` toward the parent.
    pub fn emit(&self, event: &str, args: &[Value]) {
        self.instance.emit(event, args)
    }
}

// =============================================================================
// Prop Resolution
// =============================================================================

/// Split incoming vnode props against the declaration: declared names and
/// `on*` handlers become props (declared ones falling back to their default
/// when absent or null), everything else lands in attrs. Functional
/// components have no declaration; their whole prop set is the render input.
pub(crate) fn resolve_props(def: &ComponentDef, incoming: &Props) -> (Vec<(String, Value)>, Props) {
    let mut props: Vec<(String, Value)> = Vec::new();
    let mut attrs = Props::new();

    if def.is_functional {
        for (name, value) in incoming.iter() {
            props.push((name.to_string(), value.clone()));
        }
        return (props, attrs);
    }

    for decl in &def.props {
        let supplied = incoming.get(&decl.name).filter(|value| !value.is_null());
        let value = match supplied {
            Some(value) => value.clone(),
            None => match &decl.default {
                Some(PropDefault::Value(value)) => value.clone(),
                Some(PropDefault::Factory(factory)) => factory(),
                None => Value::Null,
            },
        };
        props.push((decl.name.clone(), value));
    }

    for (name, value) in incoming.iter() {
        if def.declares(name) {
            continue;
        }
        if is_event_name(name) {
            props.push((name.to_string(), value.clone()));
        } else {
            attrs.set(name, value.clone());
        }
    }

    (props, attrs)
}

/// Whether two prop sets differ: size change or any strict value change.
pub(crate) fn has_props_changed(old: &Props, new: &Props) -> bool {
    if old.len() != new.len() {
        return true;
    }
    new.iter().any(|(name, value)| old.get(name) != Some(value))
}

// =============================================================================
// Mount
// =============================================================================

fn component_def(vnode: &VNode) -> Option<Rc<ComponentDef>> {
    match vnode.kind() {
        NodeKind::Component(def) => Some(def.clone()),
        NodeKind::Functional(render) => Some(Rc::new(ComponentDef::functional(render.clone()))),
        _ => None,
    }
}

pub(crate) fn mount_component<H: HostAdapter + 'static>(
    r: &Rc<RendererShared<H>>,
    vnode: &VNode,
    container: HostNode,
    anchor: Option<HostNode>,
) {
    let Some(def) = component_def(vnode) else {
        warn!("mount_component on a non-component vnode");
        return;
    };
    trace!("mount component {:?}", def.name);

    if let Some(hook) = &def.before_create {
        hook();
    }

    let (resolved, attrs) = resolve_props(&def, vnode.props());
    let state = def
        .data
        .as_ref()
        .map(|data| ReactiveMap::from_entries(data()));
    let slots = match vnode.children() {
        Children::Slots(slots) => slots.clone(),
        Children::None => Slots::new(),
        _ => {
            warn!(
                "component {:?}: children must be a slot mapping; ignored",
                def.name
            );
            Slots::new()
        }
    };

    let instance = Rc::new(ComponentInstance {
        def: def.clone(),
        props: ReactiveMap::from_entries(resolved),
        attrs: RefCell::new(attrs),
        state,
        setup_state: RefCell::new(HashMap::new()),
        slots,
        sub_tree: RefCell::new(None),
        is_mounted: Cell::new(false),
        mounted_cbs: Rc::new(RefCell::new(Vec::new())),
        render: RefCell::new(def.render.clone()),
        effect: RefCell::new(None),
    });
    vnode.set_component(Some(instance.clone()));

    if let Some(setup) = &def.setup {
        push_setup_sink(instance.mounted_cbs.clone());
        let emit = {
            let instance = instance.clone();
            Emit::new(move |event, args| instance.emit(event, args))
        };
        let ctx = SetupContext {
            attrs: instance.attrs.borrow().clone(),
            emit,
            slots: instance.slots.clone(),
        };
        let result = setup(&instance.props.readonly(), &ctx);
        pop_setup_sink();
        match result {
            SetupResult::Render(render) => *instance.render.borrow_mut() = Some(render),
            SetupResult::Bindings(bindings) => {
                *instance.setup_state.borrow_mut() = bindings.into_iter().collect();
            }
        }
    }

    if instance.render.borrow().is_none() {
        warn!(
            "component {:?} resolved no render function; rendering a placeholder",
            def.name
        );
        *instance.render.borrow_mut() = Some(Rc::new(|_| VNode::comment("")));
    }

    if let Some(hook) = &def.created {
        hook(&RenderCtx::new(instance.clone()));
    }

    // The render loop: first run mounts, every later run re-patches. Writes
    // to anything the render read re-queue this effect; the flush boundary
    // collapses bursts to a single re-render.
    let renderer = Rc::clone(r);
    let inst = instance.clone();
    let render_effect = Effect::queued(move || {
        let Some(render) = inst.render.borrow().clone() else {
            return;
        };
        let ctx = RenderCtx::new(inst.clone());
        let next_tree = Rc::new(render(&ctx));

        if !inst.is_mounted.get() {
            if let Some(hook) = &inst.def.before_mount {
                hook(&ctx);
            }
            patch(&renderer, None, &next_tree, container, anchor);
            inst.is_mounted.set(true);

            let callbacks: Vec<_> = inst.mounted_cbs.borrow_mut().drain(..).collect();
            for callback in callbacks {
                callback();
            }
            if let Some(hook) = &inst.def.mounted {
                hook(&ctx);
            }
        } else {
            if let Some(hook) = &inst.def.before_update {
                hook(&ctx);
            }
            let prev = inst.sub_tree.borrow_mut().take();
            patch(&renderer, prev.as_deref(), &next_tree, container, anchor);
            if let Some(hook) = &inst.def.updated {
                hook(&ctx);
            }
        }
        *inst.sub_tree.borrow_mut() = Some(next_tree);
    });
    *instance.effect.borrow_mut() = Some(render_effect);

    // The component vnode's host link is its subtree's root node.
    vnode.set_el(instance.sub_tree.borrow().as_ref().and_then(|tree| tree.el()));
}

// =============================================================================
// Patch
// =============================================================================

pub(crate) fn patch_component(old: &VNode, new: &VNode) {
    let Some(instance) = old.take_component() else {
        warn!("patching a component that was never mounted");
        return;
    };
    new.set_component(Some(instance.clone()));
    new.set_el(old.el());

    if !has_props_changed(old.props(), new.props()) {
        return;
    }
    trace!("component {:?}: props changed", instance.def.name);

    let (resolved, attrs) = resolve_props(&instance.def, new.props());
    batch(|| {
        let keep: Vec<&str> = resolved.iter().map(|(name, _)| name.as_str()).collect();
        for (name, value) in &resolved {
            instance.props.insert(name.clone(), value.clone());
        }
        for key in instance.props.keys_untracked() {
            if !keep.contains(&key.as_str()) {
                instance.props.remove(&key);
            }
        }
        *instance.attrs.borrow_mut() = attrs;
    });

    // The batch boundary flushed the re-render (when one was due); refresh
    // the host link from the new subtree.
    new.set_el(instance.sub_tree.borrow().as_ref().and_then(|tree| tree.el()));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_props_routing() {
        let def = ComponentDef::new("x")
            .prop("title")
            .prop_with_default("count", 7);

        let incoming = Props::new()
            .with("title", "hello")
            .with("class", "wide")
            .with("onPing", Value::handler(|_| {}));

        let (props, attrs) = resolve_props(&def, &incoming);

        let props: HashMap<String, Value> = props.into_iter().collect();
        assert_eq!(props.get("title"), Some(&Value::Str("hello".to_string())));
        assert_eq!(props.get("count"), Some(&Value::Int(7)));
        assert!(matches!(props.get("onPing"), Some(Value::Handler(_))));
        assert_eq!(attrs.get("class"), Some(&Value::Str("wide".to_string())));
        assert!(!attrs.contains("onPing"));
        assert!(!attrs.contains("title"));
    }

    #[test]
    fn test_resolve_props_null_falls_back_to_default() {
        let def = ComponentDef::new("x").prop_with_default("count", 3);
        let incoming = Props::new().with("count", Value::Null);

        let (props, _) = resolve_props(&def, &incoming);
        assert_eq!(props, vec![("count".to_string(), Value::Int(3))]);
    }

    #[test]
    fn test_resolve_props_factory_default() {
        let def = ComponentDef::new("x").prop_with_factory("items", || Value::Int(42));
        let (props, _) = resolve_props(&def, &Props::new());
        assert_eq!(props, vec![("items".to_string(), Value::Int(42))]);
    }

    #[test]
    fn test_has_props_changed() {
        let a = Props::new().with("title", "x");
        let same = Props::new().with("title", "x");
        let other_value = Props::new().with("title", "y");
        let extra = Props::new().with("title", "x").with("id", "i");

        assert!(!has_props_changed(&a, &same));
        assert!(has_props_changed(&a, &other_value));
        assert!(has_props_changed(&a, &extra));
        assert!(has_props_changed(&extra, &a));
    }

    #[test]
    fn test_handler_identity_keeps_props_unchanged() {
        let handler = Value::handler(|_| {});
        let a = Props::new().with("onPing", handler.clone());
        let b = Props::new().with("onPing", handler);
        assert!(!has_props_changed(&a, &b));
    }
}
