//! # ember-vdom
//!
//! Reactive virtual DOM rendering core.
//!
//! A platform-agnostic engine that reconciles trees of virtual-node
//! descriptors against the previously rendered tree, emitting a minimal
//! sequence of mutations through a pluggable host adapter.
//!
//! ## Architecture
//!
//! The pipeline is purely reactive:
//!
//! ```text
//! VNode tree → patch dispatcher → {element, text/comment, fragment, component}
//!                    ↑                                          │
//!                    └── render effect ← signals ← component setup
//! ```
//!
//! Components render through a queued reactive effect: `setup()` wires
//! signals and bindings, the render function produces a subtree, and any
//! tracked write re-queues the effect, which re-patches only its own
//! subtree. Keyed children reconcile through a prefix/suffix-trimming diff
//! with a longest-increasing-subsequence move planner.
//!
//! ## Modules
//!
//! - [`types`] - Prop values, keys, the ordered prop map
//! - [`vnode`] - Virtual node descriptors and constructors
//! - [`component`] - Component definitions, setup surface, `on_mounted`
//! - [`signals`] - Fine-grained reactive primitives
//! - [`host`] - The host adapter seam and the in-memory reference host
//! - [`renderer`] - The patch/diff/component/unmount core
//!
//! ## Example
//!
//! ```ignore
//! use ember_vdom::{Renderer, VNode, Props, Children};
//! use ember_vdom::host::MemoryHost;
//!
//! let renderer = Renderer::new(MemoryHost::new());
//! let container = renderer.with_host_mut(|host| host.create_container());
//!
//! renderer.render(
//!     Some(VNode::element("div", Props::new().with("id", "x"), Children::text("hi"))),
//!     container,
//! );
//! ```

pub mod component;
pub mod host;
pub mod renderer;
pub mod signals;
pub mod types;
pub mod vnode;

// Re-export commonly used items
pub use component::{
    on_mounted, Binding, ComponentDef, Emit, PropDecl, PropDefault, SetupContext, SetupResult,
};
pub use host::{HostAdapter, HostNode};
pub use renderer::{ComponentInstance, RenderCtx, Renderer};
pub use types::{Handler, Key, Props, Value};
pub use vnode::{Children, NodeKind, SlotFn, Slots, VNode};
