//! Host Document
//!
//! The element tree components mount into, its event model, and the markup
//! string helpers used to fill it.

mod document;
mod event;
pub mod markup;

pub use document::{Document, Element, ListenerId, ListenerOptions};
pub use event::{Event, EventKind};
