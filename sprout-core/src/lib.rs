//! Sprout Core
//!
//! This crate provides the core runtime for the Sprout reactive UI library.
//! It implements:
//!
//! - Reactive primitives (signals and tracked computations)
//! - Components that re-render their container when tracked state changes
//! - Per-component event bindings with window scope and id-based delegation
//! - An in-memory host document to mount into
//!
//! Propagation is synchronous: a write re-runs every dependent computation,
//! depth-first and in subscription order, before it returns. There is no
//! diffing; a re-render replaces the container's whole content.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Runtime, signals, computations and dependency tracking
//! - `dom`: Host document, elements, events and markup helpers
//! - `component`: Component lifecycle and event registry
//! - `app`: Facade bundling a runtime, a document and the configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use sprout_core::{App, EventSpec};
//!
//! let app = App::new();
//! app.create_mount_point("app");
//!
//! let count = app.create_signal(0);
//! let reader = count.clone();
//! let counter = app.component(move || format!("<h1>{}</h1><button id=\"plus\">+</button>", reader.get()));
//!
//! let writer = count.clone();
//! counter
//!     .add_event(move |_| {
//!         EventSpec::new("click", move |_| { writer.update(|c| c + 1); })
//!             .name("increment")
//!             .target_id("plus")
//!     })
//!     .render(None);
//!
//! app.document().fire("click", "plus");
//! assert_eq!(counter.node_ref().text_content(), "1 +");
//! ```

pub mod app;
pub mod component;
pub mod config;
pub mod dom;
pub mod error;
pub mod reactive;

pub use app::App;
pub use component::{Component, ComponentOptions, EventScope, EventSpec, LifecycleState};
pub use config::Config;
pub use dom::{Document, Element, Event, EventKind};
pub use error::{Error, Result};
pub use reactive::{Computation, Runtime, SetValue, Signal, SignalId};
