//! Virtual node descriptors.
//!
//! A [`VNode`] describes an intended host subtree: a host element, a text or
//! comment node, a non-materialised fragment, or a component. Node kinds are
//! a tagged sum ([`NodeKind`]) so the patch dispatcher is a plain `match`.
//!
//! VNodes are immutable descriptors with two mutable back-references filled
//! in by the renderer: `el` (the host node once mounted) and `component`
//! (the instance for component vnodes). Both are lookups, not ownership -
//! the host owns its nodes, the renderer owns instances through the vnode
//! tree.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::component::{ComponentDef, RenderFn};
use crate::host::HostNode;
use crate::renderer::{ComponentInstance, RenderCtx};
use crate::types::{Key, Props};

/// A named slot: thunk producing the slot content on demand.
pub type SlotFn = Rc<dyn Fn() -> VNode>;

/// Slot mapping supplied by a parent as the children of a component vnode.
pub type Slots = HashMap<String, SlotFn>;

// =============================================================================
// NodeKind
// =============================================================================

/// What a vnode describes. The `Text`, `Comment` and `Fragment` sentinels of
/// the patch protocol are the unit variants; identity is variant matching.
#[derive(Clone)]
pub enum NodeKind {
    /// Host element with the given tag.
    Element(String),
    /// Host text node; content rides in the vnode children.
    Text,
    /// Host comment node; content rides in the vnode children.
    Comment,
    /// Non-materialised grouping of children.
    Fragment,
    /// Stateful component described by a [`ComponentDef`].
    Component(Rc<ComponentDef>),
    /// Bare render function; no declared props, no setup.
    Functional(RenderFn),
}

impl NodeKind {
    /// Whether two kinds reconcile in place. Differing kinds (including
    /// differing element tags) force unmount + mount.
    pub fn same_kind(&self, other: &NodeKind) -> bool {
        match (self, other) {
            (NodeKind::Element(a), NodeKind::Element(b)) => a == b,
            (NodeKind::Text, NodeKind::Text) => true,
            (NodeKind::Comment, NodeKind::Comment) => true,
            (NodeKind::Fragment, NodeKind::Fragment) => true,
            (NodeKind::Component(a), NodeKind::Component(b)) => Rc::ptr_eq(a, b),
            (NodeKind::Functional(a), NodeKind::Functional(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Element(tag) => write!(f, "Element({:?})", tag),
            NodeKind::Text => f.write_str("Text"),
            NodeKind::Comment => f.write_str("Comment"),
            NodeKind::Fragment => f.write_str("Fragment"),
            NodeKind::Component(def) => write!(f, "Component({:?})", def.name),
            NodeKind::Functional(_) => f.write_str("Functional"),
        }
    }
}

// =============================================================================
// Children
// =============================================================================

/// The children a vnode carries.
pub enum Children {
    None,
    /// Primitive text content.
    Text(String),
    /// Ordered child vnodes.
    Nodes(Vec<VNode>),
    /// Slot mapping; only meaningful on component vnodes.
    Slots(Slots),
}

impl Children {
    pub fn text(content: impl Into<String>) -> Children {
        Children::Text(content.into())
    }

    pub fn nodes(nodes: Vec<VNode>) -> Children {
        Children::Nodes(nodes)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Children::None)
    }

    pub fn as_nodes(&self) -> Option<&[VNode]> {
        match self {
            Children::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Children::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Debug for Children {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Children::None => f.write_str("None"),
            Children::Text(text) => write!(f, "Text({:?})", text),
            Children::Nodes(nodes) => write!(f, "Nodes(×{})", nodes.len()),
            Children::Slots(slots) => write!(f, "Slots(×{})", slots.len()),
        }
    }
}

// =============================================================================
// VNode
// =============================================================================

/// Descriptor of an intended host subtree.
pub struct VNode {
    kind: NodeKind,
    props: Props,
    children: Children,
    key: Option<Key>,
    /// Host node backing this vnode once mounted.
    el: Cell<Option<HostNode>>,
    /// Component instance for component vnodes.
    component: RefCell<Option<Rc<ComponentInstance>>>,
}

impl VNode {
    fn new(kind: NodeKind, props: Props, children: Children) -> VNode {
        VNode {
            kind,
            props,
            children,
            key: None,
            el: Cell::new(None),
            component: RefCell::new(None),
        }
    }

    /// Host element vnode.
    pub fn element(tag: impl Into<String>, props: Props, children: Children) -> VNode {
        VNode::new(NodeKind::Element(tag.into()), props, children)
    }

    /// Host text vnode.
    pub fn text(content: impl Into<String>) -> VNode {
        VNode::new(NodeKind::Text, Props::new(), Children::Text(content.into()))
    }

    /// Host comment vnode.
    pub fn comment(content: impl Into<String>) -> VNode {
        VNode::new(NodeKind::Comment, Props::new(), Children::Text(content.into()))
    }

    /// Fragment vnode grouping children without a host node of its own.
    pub fn fragment(children: Vec<VNode>) -> VNode {
        VNode::new(NodeKind::Fragment, Props::new(), Children::Nodes(children))
    }

    /// Component vnode.
    pub fn component(def: Rc<ComponentDef>, props: Props) -> VNode {
        VNode::new(NodeKind::Component(def), props, Children::None)
    }

    /// Component vnode with named slots.
    pub fn component_with_slots(def: Rc<ComponentDef>, props: Props, slots: Slots) -> VNode {
        VNode::new(NodeKind::Component(def), props, Children::Slots(slots))
    }

    /// Function component vnode.
    pub fn functional(render: impl Fn(&RenderCtx) -> VNode + 'static, props: Props) -> VNode {
        VNode::new(NodeKind::Functional(Rc::new(render)), props, Children::None)
    }

    /// Attach a sibling identity key.
    pub fn with_key(mut self, key: impl Into<Key>) -> VNode {
        self.key = Some(key.into());
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Text content for text/comment vnodes; empty otherwise.
    pub fn text_content(&self) -> &str {
        self.children.as_text().unwrap_or("")
    }

    /// The host node backing this vnode, once mounted.
    pub fn el(&self) -> Option<HostNode> {
        self.el.get()
    }

    pub(crate) fn set_el(&self, el: Option<HostNode>) {
        self.el.set(el);
    }

    /// The component instance, for component vnodes after mount.
    pub fn component_instance(&self) -> Option<Rc<ComponentInstance>> {
        self.component.borrow().clone()
    }

    pub(crate) fn set_component(&self, instance: Option<Rc<ComponentInstance>>) {
        *self.component.borrow_mut() = instance;
    }

    pub(crate) fn take_component(&self) -> Option<Rc<ComponentInstance>> {
        self.component.borrow_mut().take()
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VNode")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("children", &self.children)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_kind_elements_by_tag() {
        let div = VNode::element("div", Props::new(), Children::None);
        let div2 = VNode::element("div", Props::new(), Children::None);
        let span = VNode::element("span", Props::new(), Children::None);

        assert!(div.kind().same_kind(div2.kind()));
        assert!(!div.kind().same_kind(span.kind()));
    }

    #[test]
    fn test_same_kind_sentinels() {
        assert!(VNode::text("a").kind().same_kind(VNode::text("b").kind()));
        assert!(VNode::comment("a").kind().same_kind(VNode::comment("b").kind()));
        assert!(VNode::fragment(vec![]).kind().same_kind(VNode::fragment(vec![]).kind()));
        assert!(!VNode::text("a").kind().same_kind(VNode::comment("a").kind()));
    }

    #[test]
    fn test_same_kind_components_by_identity() {
        let a = Rc::new(ComponentDef::new("a"));
        let b = Rc::new(ComponentDef::new("a"));

        let va = VNode::component(a.clone(), Props::new());
        let va2 = VNode::component(a, Props::new());
        let vb = VNode::component(b, Props::new());

        assert!(va.kind().same_kind(va2.kind()));
        assert!(!va.kind().same_kind(vb.kind()));
    }

    #[test]
    fn test_key_equality() {
        let a = VNode::text("x").with_key("a");
        let a2 = VNode::text("y").with_key("a");
        let b = VNode::text("x").with_key("b");

        assert_eq!(a.key(), a2.key());
        assert_ne!(a.key(), b.key());
        assert_eq!(VNode::text("x").key(), None);
    }
}
