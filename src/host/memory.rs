//! In-memory host adapter.
//!
//! An arena of host nodes plus an ordered log of every operation the
//! renderer issued. This is the crate's headless rendering surface: tests
//! assert against the log (how did we get here) and the arena (what does the
//! tree look like now).

use super::{HostAdapter, HostNode};
use crate::types::Value;

// =============================================================================
// Operation Log
// =============================================================================

/// One recorded host mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum HostOp {
    CreateElement {
        node: HostNode,
        tag: String,
    },
    CreateText {
        node: HostNode,
        text: String,
    },
    CreateComment {
        node: HostNode,
        text: String,
    },
    Insert {
        node: HostNode,
        parent: HostNode,
        anchor: Option<HostNode>,
    },
    Remove {
        node: HostNode,
    },
    SetElementText {
        el: HostNode,
        text: String,
    },
    SetText {
        node: HostNode,
        text: String,
    },
    PatchProp {
        el: HostNode,
        name: String,
        removed: bool,
    },
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
enum MemKind {
    Element(String),
    Text,
    Comment,
}

#[derive(Debug)]
struct MemNode {
    kind: MemKind,
    text: String,
    attrs: Vec<(String, Value)>,
    children: Vec<HostNode>,
    parent: Option<HostNode>,
}

/// Arena-backed host tree that records every mutation.
///
/// Handles index into the arena; passing a handle this host did not mint
/// panics, which in tests is exactly the signal wanted.
#[derive(Default)]
pub struct MemoryHost {
    nodes: Vec<MemNode>,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> MemoryHost {
        MemoryHost::default()
    }

    fn alloc(&mut self, kind: MemKind, text: &str) -> HostNode {
        let node = HostNode::new(self.nodes.len() as u64);
        self.nodes.push(MemNode {
            kind,
            text: text.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
            parent: None,
        });
        node
    }

    fn node(&self, node: HostNode) -> &MemNode {
        &self.nodes[node.raw() as usize]
    }

    fn node_mut(&mut self, node: HostNode) -> &mut MemNode {
        &mut self.nodes[node.raw() as usize]
    }

    fn detach(&mut self, node: HostNode) {
        if let Some(parent) = self.node(node).parent {
            self.node_mut(parent).children.retain(|child| *child != node);
            self.node_mut(node).parent = None;
        }
    }

    /// Create a root container to render into. Not part of the op log.
    pub fn create_container(&mut self) -> HostNode {
        self.alloc(MemKind::Element("#container".to_string()), "")
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Drain the log, keeping the tree. Call between renders to scope
    /// assertions to one reconciliation.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    pub fn tag(&self, node: HostNode) -> Option<&str> {
        match &self.node(node).kind {
            MemKind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn text(&self, node: HostNode) -> &str {
        &self.node(node).text
    }

    pub fn attr(&self, node: HostNode, name: &str) -> Option<&Value> {
        self.node(node)
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn children(&self, node: HostNode) -> &[HostNode] {
        &self.node(node).children
    }

    pub fn parent(&self, node: HostNode) -> Option<HostNode> {
        self.node(node).parent
    }

    /// Structural dump of a subtree: `<div id="x">hi</div>` for elements,
    /// raw text for text nodes, `<!--x-->` for comments.
    pub fn snapshot(&self, node: HostNode) -> String {
        let entry = self.node(node);
        match &entry.kind {
            MemKind::Text => entry.text.clone(),
            MemKind::Comment => format!("<!--{}-->", entry.text),
            MemKind::Element(tag) => {
                let mut out = String::new();
                out.push('<');
                out.push_str(tag);
                let mut attrs: Vec<&(String, Value)> = entry.attrs.iter().collect();
                attrs.sort_by(|a, b| a.0.cmp(&b.0));
                for (name, value) in attrs {
                    match value {
                        Value::Handler(_) => continue,
                        Value::Str(s) => out.push_str(&format!(" {}={:?}", name, s)),
                        other => out.push_str(&format!(" {}={:?}", name, other)),
                    }
                }
                out.push('>');
                if entry.children.is_empty() {
                    out.push_str(&entry.text);
                } else {
                    for child in &entry.children {
                        out.push_str(&self.snapshot(*child));
                    }
                }
                out.push_str(&format!("</{}>", tag));
                out
            }
        }
    }
}

// =============================================================================
// HostAdapter Implementation
// =============================================================================

impl HostAdapter for MemoryHost {
    fn create_element(&mut self, tag: &str) -> HostNode {
        let node = self.alloc(MemKind::Element(tag.to_string()), "");
        self.ops.push(HostOp::CreateElement {
            node,
            tag: tag.to_string(),
        });
        node
    }

    fn create_text(&mut self, text: &str) -> HostNode {
        let node = self.alloc(MemKind::Text, text);
        self.ops.push(HostOp::CreateText {
            node,
            text: text.to_string(),
        });
        node
    }

    fn create_comment(&mut self, text: &str) -> HostNode {
        let node = self.alloc(MemKind::Comment, text);
        self.ops.push(HostOp::CreateComment {
            node,
            text: text.to_string(),
        });
        node
    }

    fn insert(&mut self, node: HostNode, parent: HostNode, anchor: Option<HostNode>) {
        self.detach(node);
        let position = match anchor {
            Some(anchor) => self
                .node(parent)
                .children
                .iter()
                .position(|child| *child == anchor),
            None => None,
        };
        match position {
            Some(index) => self.node_mut(parent).children.insert(index, node),
            None => self.node_mut(parent).children.push(node),
        }
        self.node_mut(node).parent = Some(parent);
        self.ops.push(HostOp::Insert {
            node,
            parent,
            anchor,
        });
    }

    fn remove(&mut self, node: HostNode) {
        self.detach(node);
        self.ops.push(HostOp::Remove { node });
    }

    fn set_element_text(&mut self, el: HostNode, text: &str) {
        let children = std::mem::take(&mut self.node_mut(el).children);
        for child in children {
            self.node_mut(child).parent = None;
        }
        self.node_mut(el).text = text.to_string();
        self.ops.push(HostOp::SetElementText {
            el,
            text: text.to_string(),
        });
    }

    fn set_text(&mut self, node: HostNode, text: &str) {
        self.node_mut(node).text = text.to_string();
        self.ops.push(HostOp::SetText {
            node,
            text: text.to_string(),
        });
    }

    fn patch_prop(&mut self, el: HostNode, name: &str, _prev: Option<&Value>, next: Option<&Value>) {
        let removed = !matches!(next, Some(value) if !value.is_null());
        {
            let entry = self.node_mut(el);
            entry.attrs.retain(|(n, _)| n != name);
            if let Some(value) = next {
                if !value.is_null() {
                    entry.attrs.push((name.to_string(), value.clone()));
                }
            }
        }
        self.ops.push(HostOp::PatchProp {
            el,
            name: name.to_string(),
            removed,
        });
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_before_anchor() {
        let mut host = MemoryHost::new();
        let root = host.create_container();
        let a = host.create_element("a");
        let b = host.create_element("b");
        let c = host.create_element("c");

        host.insert(a, root, None);
        host.insert(c, root, None);
        host.insert(b, root, Some(c));

        assert_eq!(host.children(root), &[a, b, c]);
    }

    #[test]
    fn test_insert_moves_attached_node() {
        let mut host = MemoryHost::new();
        let root = host.create_container();
        let a = host.create_element("a");
        let b = host.create_element("b");

        host.insert(a, root, None);
        host.insert(b, root, None);
        assert_eq!(host.children(root), &[a, b]);

        host.insert(b, root, Some(a));
        assert_eq!(host.children(root), &[b, a]);
        assert_eq!(host.parent(b), Some(root));
    }

    #[test]
    fn test_set_element_text_clears_children() {
        let mut host = MemoryHost::new();
        let root = host.create_container();
        let child = host.create_element("p");
        host.insert(child, root, None);

        host.set_element_text(root, "plain");
        assert!(host.children(root).is_empty());
        assert_eq!(host.parent(child), None);
        assert_eq!(host.text(root), "plain");
    }

    #[test]
    fn test_patch_prop_null_removes() {
        let mut host = MemoryHost::new();
        let el = host.create_element("div");

        host.patch_prop(el, "id", None, Some(&Value::Str("x".to_string())));
        assert_eq!(host.attr(el, "id"), Some(&Value::Str("x".to_string())));

        host.patch_prop(el, "id", Some(&Value::Str("x".to_string())), None);
        assert_eq!(host.attr(el, "id"), None);
    }

    #[test]
    fn test_snapshot() {
        let mut host = MemoryHost::new();
        let root = host.create_container();
        let div = host.create_element("div");
        host.patch_prop(div, "id", None, Some(&Value::Str("x".to_string())));
        host.set_element_text(div, "hi");
        host.insert(div, root, None);

        assert_eq!(host.snapshot(root), "<#container><div id=\"x\">hi</div></#container>");
    }
}
