//! Unmount walker - recursive subtree teardown.
//!
//! Components stop their render effect, fire the unmount hooks around their
//! subtree's teardown, and release the instance. Fragments tear down
//! children only (no host node of their own). Host nodes tear down array
//! children first, then detach from the host. Teardown is infallible: a
//! node that never reached the host is logged and skipped, and siblings
//! keep tearing down regardless.

use std::rc::Rc;

use log::{trace, warn};

use super::component::RenderCtx;
use super::RendererShared;
use crate::host::HostAdapter;
use crate::vnode::{Children, NodeKind, VNode};

pub(crate) fn unmount<H: HostAdapter + 'static>(r: &Rc<RendererShared<H>>, vnode: &VNode) {
    match vnode.kind() {
        NodeKind::Component(_) | NodeKind::Functional(_) => unmount_component(r, vnode),
        NodeKind::Fragment => {
            if let Children::Nodes(children) = vnode.children() {
                for child in children {
                    unmount(r, child);
                }
            }
        }
        _ => {
            if let Children::Nodes(children) = vnode.children() {
                for child in children {
                    unmount(r, child);
                }
            }
            match vnode.el() {
                Some(el) => r.host.borrow_mut().remove(el),
                None => warn!("unmounting {:?} that never reached the host", vnode.kind()),
            }
        }
    }
}

fn unmount_component<H: HostAdapter + 'static>(r: &Rc<RendererShared<H>>, vnode: &VNode) {
    let Some(instance) = vnode.take_component() else {
        warn!("unmounting a component that was never mounted");
        return;
    };
    trace!("unmount component {:?}", instance.def.name);

    // Stop the render loop first: a teardown hook writing reactive state
    // must not schedule a re-render of a dying subtree.
    if let Some(effect) = instance.effect.borrow_mut().take() {
        effect.stop();
    }

    if let Some(hook) = &instance.def.before_unmount {
        hook(&RenderCtx::new(instance.clone()));
    }

    if let Some(sub_tree) = instance.sub_tree.borrow_mut().take() {
        unmount(r, &sub_tree);
    }

    if let Some(hook) = &instance.def.unmounted {
        hook(&RenderCtx::new(instance.clone()));
    }
}
