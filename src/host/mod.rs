//! Host-node adapter seam.
//!
//! The renderer never touches a platform directly: every mutation goes
//! through [`HostAdapter`], and host nodes are opaque [`HostNode`] tokens the
//! adapter mints. A DOM adapter maps tokens to elements, a terminal adapter
//! to cells, the bundled [`MemoryHost`] to an arena - the core neither knows
//! nor cares.

mod memory;

pub use memory::{HostOp, MemoryHost};

use crate::types::Value;

// =============================================================================
// HostNode
// =============================================================================

/// Opaque handle to a platform node, minted by the adapter.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct HostNode(u64);

impl HostNode {
    pub fn new(raw: u64) -> HostNode {
        HostNode(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

// =============================================================================
// HostAdapter
// =============================================================================

/// Platform mutation surface consumed by the renderer.
///
/// Operations are infallible by contract; an adapter that can fail must
/// resolve the failure on its own side of the seam. `prev`/`next` on
/// [`HostAdapter::patch_prop`] carry the old and new prop value; `next` of
/// `None` means removal, and removal of an `on*` prop must also detach any
/// listener the adapter registered for it.
pub trait HostAdapter {
    fn create_element(&mut self, tag: &str) -> HostNode;

    fn create_text(&mut self, text: &str) -> HostNode;

    fn create_comment(&mut self, text: &str) -> HostNode;

    /// Insert `node` into `parent` before `anchor`; append when `anchor` is
    /// `None`. Inserting an already-attached node moves it.
    fn insert(&mut self, node: HostNode, parent: HostNode, anchor: Option<HostNode>);

    /// Detach `node` from its parent.
    fn remove(&mut self, node: HostNode);

    /// Replace all children of `el` with a single run of text.
    fn set_element_text(&mut self, el: HostNode, text: &str);

    /// Update the data of a text or comment node.
    fn set_text(&mut self, node: HostNode, text: &str);

    fn patch_prop(&mut self, el: HostNode, name: &str, prev: Option<&Value>, next: Option<&Value>);

    /// Schedule `cb` for the next paint boundary. Defaults to immediate
    /// invocation; only transition-capable adapters need a real frame.
    fn next_frame(&mut self, cb: Box<dyn FnOnce()>) {
        cb()
    }
}
