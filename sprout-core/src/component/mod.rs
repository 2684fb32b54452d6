//! Components
//!
//! Flat mount targets: a component renders markup into its own container,
//! attaches that container under an element id, and wires declared event
//! bindings to it.

mod events;
mod lifecycle;

pub use events::{EventContext, EventScope, EventSpec, Handler};
pub use lifecycle::{Component, ComponentOptions, LifecycleState};
