//! Fine-grained reactive primitives.
//!
//! The rendering core consumes reactivity as a capability: a value cell
//! ([`Signal`]), a cached computation ([`Derived`]), a side-effect runner
//! ([`effect`] / [`Effect`]) and a shallow-reactive mapping ([`ReactiveMap`]).
//! Everything is single-threaded; state lives in a thread-local runtime.
//!
//! Component re-renders go through the queued scheduler: writes enqueue the
//! render effect into a deduplicated flush queue, and [`batch`] scopes a
//! flush boundary so a burst of writes produces one re-render.

mod derived;
mod effect;
mod map;
mod runtime;
mod signal;

pub use derived::{derived, Derived};
pub use effect::{effect, Effect};
pub use map::{ReactiveMap, ReadonlyMap};
pub use runtime::{batch, reset_runtime};
pub use signal::{signal, Signal};
