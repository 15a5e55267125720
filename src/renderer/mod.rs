//! The rendering core.
//!
//! [`Renderer`] binds a host adapter and exposes the `render(vnode, container)`
//! entry point. Internally the work splits the way the data flows:
//!
//! - [`patch`] - dispatcher routing an (old, new) vnode pair by kind
//! - [`children`] - children reconciliation and the keyed fast diff
//! - [`component`] - component instances, render effects, lifecycle
//! - [`unmount`] - recursive teardown
//!
//! Every host mutation funnels through the adapter held here; every
//! container's last-rendered root is remembered here, so a second render
//! against the same container becomes a patch and `render(None, container)`
//! becomes an unmount.

mod children;
mod component;
mod patch;
mod unmount;

pub use component::{ComponentInstance, RenderCtx};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use crate::host::{HostAdapter, HostNode};
use crate::vnode::VNode;

// =============================================================================
// Renderer
// =============================================================================

pub(crate) struct RendererShared<H: HostAdapter + 'static> {
    pub(crate) host: RefCell<H>,
    /// Container → root vnode it last rendered.
    roots: RefCell<HashMap<HostNode, Rc<VNode>>>,
}

/// A rendering core bound to one host adapter.
///
/// Cheap to clone; clones share the host and the container bookkeeping.
/// Component render effects capture the same shared state, which is what
/// lets a prop write re-patch a subtree long after `render` returned.
pub struct Renderer<H: HostAdapter + 'static> {
    shared: Rc<RendererShared<H>>,
}

impl<H: HostAdapter + 'static> Renderer<H> {
    pub fn new(host: H) -> Renderer<H> {
        Renderer {
            shared: Rc::new(RendererShared {
                host: RefCell::new(host),
                roots: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Render `vnode` into `container`, reconciling against whatever the
    /// container held before. `None` unmounts the container's tree.
    pub fn render(&self, vnode: Option<VNode>, container: HostNode) {
        let prev = self.shared.roots.borrow_mut().remove(&container);
        match vnode {
            Some(vnode) => {
                trace!("render into {:?}", container);
                let root = Rc::new(vnode);
                patch::patch(&self.shared, prev.as_deref(), &root, container, None);
                self.shared.roots.borrow_mut().insert(container, root);
            }
            None => {
                trace!("clear {:?}", container);
                if let Some(prev) = prev {
                    unmount::unmount(&self.shared, &prev);
                }
            }
        }
    }

    /// The root vnode last rendered into `container`, if any.
    pub fn rendered_root(&self, container: HostNode) -> Option<Rc<VNode>> {
        self.shared.roots.borrow().get(&container).cloned()
    }

    /// Inspect the host adapter.
    pub fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(&self.shared.host.borrow())
    }

    /// Mutate the host adapter (e.g. to create containers or drain op logs).
    pub fn with_host_mut<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut self.shared.host.borrow_mut())
    }
}

impl<H: HostAdapter + 'static> Clone for Renderer<H> {
    fn clone(&self) -> Self {
        Renderer {
            shared: self.shared.clone(),
        }
    }
}
