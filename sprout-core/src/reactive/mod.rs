//! Reactive Primitives
//!
//! This module implements the reactive core: signals and tracked
//! computations, coordinated by an explicit [`Runtime`].
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal's value is read
//! within a tracked computation, the signal automatically registers that
//! computation as a subscriber. When the signal's value changes, every
//! subscriber runs again.
//!
//! ## Computations
//!
//! A computation is created by [`Runtime::track`]. It runs once right away
//! and again whenever one of the signals read during its latest run changes.
//! Component re-rendering is built on this.
//!
//! # Implementation Notes
//!
//! There is no ambient global state. Each runtime owns its tracking stack and
//! its signal arena, so independent reactive graphs can coexist in one
//! process.

mod channel;
mod computation;
mod context;
mod runtime;
mod signal;

pub use computation::{Computation, ComputationId};
pub use runtime::Runtime;
pub use signal::{SetValue, Signal, SignalId};
