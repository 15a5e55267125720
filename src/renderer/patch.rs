//! Patch dispatcher and element reconciler.
//!
//! `patch` routes an (old, new) vnode pair by node kind and decides
//! mount/patch per node; unmount-on-kind-change happens here before the
//! dispatch. Elements, text and comments are handled in this module;
//! children sequences and components delegate onward.

use std::rc::Rc;

use log::{trace, warn};

use super::children;
use super::component;
use super::unmount;
use super::RendererShared;
use crate::host::{HostAdapter, HostNode};
use crate::vnode::{Children, NodeKind, VNode};

/// Reconcile `new` against `old` inside `container`, inserting new host
/// nodes before `anchor` (append when `None`).
pub(crate) fn patch<H: HostAdapter + 'static>(
    r: &Rc<RendererShared<H>>,
    old: Option<&VNode>,
    new: &VNode,
    container: HostNode,
    anchor: Option<HostNode>,
) {
    // A kind change is a replacement, never a patch.
    let old = match old {
        Some(prev) if !prev.kind().same_kind(new.kind()) => {
            trace!("kind change {:?} -> {:?}: replacing", prev.kind(), new.kind());
            unmount::unmount(r, prev);
            None
        }
        other => other,
    };

    match new.kind() {
        NodeKind::Element(_) => match old {
            None => mount_element(r, new, container, anchor),
            Some(prev) => patch_element(r, prev, new),
        },
        NodeKind::Text => process_text(r, old, new, container, anchor),
        NodeKind::Comment => process_comment(r, old, new, container, anchor),
        NodeKind::Fragment => process_fragment(r, old, new, container, anchor),
        NodeKind::Component(_) | NodeKind::Functional(_) => match old {
            None => component::mount_component(r, new, container, anchor),
            Some(prev) => component::patch_component(prev, new),
        },
    }
}

// =============================================================================
// Elements
// =============================================================================

fn mount_element<H: HostAdapter + 'static>(
    r: &Rc<RendererShared<H>>,
    vnode: &VNode,
    container: HostNode,
    anchor: Option<HostNode>,
) {
    let NodeKind::Element(tag) = vnode.kind() else {
        return;
    };
    trace!("mount <{}>", tag);

    let el = r.host.borrow_mut().create_element(tag);
    vnode.set_el(Some(el));

    match vnode.children() {
        Children::Text(text) => r.host.borrow_mut().set_element_text(el, text),
        Children::Nodes(nodes) => {
            for child in nodes {
                patch(r, None, child, el, None);
            }
        }
        Children::None => {}
        Children::Slots(_) => warn!("slot children on <{}> are ignored", tag),
    }

    for (name, value) in vnode.props().iter() {
        r.host.borrow_mut().patch_prop(el, name, None, Some(value));
    }

    r.host.borrow_mut().insert(el, container, anchor);
}

fn patch_element<H: HostAdapter + 'static>(r: &Rc<RendererShared<H>>, old: &VNode, new: &VNode) {
    let Some(el) = old.el() else {
        warn!("patching an element that never reached the host");
        return;
    };
    new.set_el(Some(el));

    patch_props(r, el, old, new);
    children::reconcile_children(r, old, new, el, None);
}

fn patch_props<H: HostAdapter + 'static>(
    r: &Rc<RendererShared<H>>,
    el: HostNode,
    old: &VNode,
    new: &VNode,
) {
    for (name, next) in new.props().iter() {
        let prev = old.props().get(name);
        if prev != Some(next) {
            r.host.borrow_mut().patch_prop(el, name, prev, Some(next));
        }
    }
    for (name, prev) in old.props().iter() {
        if !new.props().contains(name) {
            r.host.borrow_mut().patch_prop(el, name, Some(prev), None);
        }
    }
}

// =============================================================================
// Text and Comments
// =============================================================================

fn process_text<H: HostAdapter + 'static>(
    r: &Rc<RendererShared<H>>,
    old: Option<&VNode>,
    new: &VNode,
    container: HostNode,
    anchor: Option<HostNode>,
) {
    match old {
        None => {
            let node = r.host.borrow_mut().create_text(new.text_content());
            new.set_el(Some(node));
            r.host.borrow_mut().insert(node, container, anchor);
        }
        Some(prev) => {
            new.set_el(prev.el());
            if prev.text_content() != new.text_content() {
                match prev.el() {
                    Some(node) => r.host.borrow_mut().set_text(node, new.text_content()),
                    None => warn!("updating a text node that never reached the host"),
                }
            }
        }
    }
}

fn process_comment<H: HostAdapter + 'static>(
    r: &Rc<RendererShared<H>>,
    old: Option<&VNode>,
    new: &VNode,
    container: HostNode,
    anchor: Option<HostNode>,
) {
    match old {
        None => {
            let node = r.host.borrow_mut().create_comment(new.text_content());
            new.set_el(Some(node));
            r.host.borrow_mut().insert(node, container, anchor);
        }
        Some(prev) => {
            new.set_el(prev.el());
            if prev.text_content() != new.text_content() {
                match prev.el() {
                    Some(node) => r.host.borrow_mut().set_text(node, new.text_content()),
                    None => warn!("updating a comment that never reached the host"),
                }
            }
        }
    }
}

// =============================================================================
// Fragments
// =============================================================================

fn process_fragment<H: HostAdapter + 'static>(
    r: &Rc<RendererShared<H>>,
    old: Option<&VNode>,
    new: &VNode,
    container: HostNode,
    anchor: Option<HostNode>,
) {
    match old {
        None => {
            if let Children::Nodes(nodes) = new.children() {
                for child in nodes {
                    patch(r, None, child, container, anchor);
                }
            }
        }
        Some(prev) => children::reconcile_children(r, prev, new, container, anchor),
    }
}
