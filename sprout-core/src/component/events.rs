//! Event Registry
//!
//! Each component keeps an ordered list of declared event bindings and
//! turns them into native listeners whenever it mounts or re-renders.
//!
//! # Installation
//!
//! - Window-scoped bindings install a listener on the document's window
//!   table.
//! - Container-scoped bindings install one listener on the component's
//!   container. If the binding names a `target_id`, the listener only calls
//!   the handler when the event originated from the element with that id.
//!   This is delegation: one listener filters by id instead of one listener
//!   per descendant.
//!
//! Every install wraps the handler anew and records the id of the listener it
//! installed. Re-installing first removes the previously installed listener,
//! so re-renders never stack duplicate listeners. Removal is keyed by the
//! binding's logical name, never by handler identity.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{Element, Event, EventKind, ListenerId, ListenerOptions};
use crate::error::{Error, Result};

/// Where a binding's listener is installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventScope {
    /// The document's window table.
    Window,
    /// The component's own container.
    #[default]
    #[serde(rename = "self")]
    Container,
}

/// Shared event handler.
pub type Handler = Rc<dyn Fn(&Event)>;

/// What `add_event` factories receive.
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    /// The component's container.
    pub target: &'a Element,
}

/// A declared event binding.
///
/// ```rust,ignore
/// component.add_event(|_| {
///     EventSpec::new("click", move |_| count.update(|c| c + 1))
///         .name("increment")
///         .target_id("plus")
/// });
/// ```
#[derive(Clone)]
pub struct EventSpec {
    kind: EventKind,
    handler: Handler,
    name: Option<String>,
    scope: EventScope,
    target_id: Option<String>,
}

impl EventSpec {
    /// Bind `handler` to events of `kind` on the container.
    pub fn new<F>(kind: impl Into<EventKind>, handler: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        Self {
            kind: kind.into(),
            handler: Rc::new(handler),
            name: None,
            scope: EventScope::Container,
            target_id: None,
        }
    }

    /// Logical name used by `remove_event`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Only handle events originating from the element with this id.
    pub fn target_id(mut self, id: impl Into<String>) -> Self {
        self.target_id = Some(id.into());
        self
    }

    /// Choose where the listener is installed.
    pub fn scope(mut self, scope: EventScope) -> Self {
        self.scope = scope;
        self
    }

    /// Install on the window instead of the container.
    pub fn on_window(self) -> Self {
        self.scope(EventScope::Window)
    }

    /// The event kind.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// The logical name, if any.
    pub fn logical_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Debug for EventSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSpec")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("target_id", &self.target_id)
            .finish_non_exhaustive()
    }
}

/// A listener currently installed for a binding.
#[derive(Debug, Clone, Copy)]
struct Installed {
    scope: EventScope,
    listener: ListenerId,
}

struct Binding {
    spec: EventSpec,
    installed: Option<Installed>,
}

impl Binding {
    fn uninstall(&mut self, container: &Element) {
        let Some(installed) = self.installed.take() else {
            return;
        };
        match installed.scope {
            EventScope::Window => container
                .document()
                .remove_window_listener(&self.spec.kind, installed.listener),
            EventScope::Container => {
                container.remove_event_listener(&self.spec.kind, installed.listener)
            }
        };
    }

    fn install(&mut self, container: &Element, capture: bool) {
        self.uninstall(container);

        let handler = Rc::clone(&self.spec.handler);
        let kind = self.spec.kind.clone();
        let listener = match self.spec.scope {
            EventScope::Window => container.document().add_window_listener(
                kind,
                ListenerOptions::default(),
                move |event| handler(event),
            ),
            EventScope::Container => {
                let target_id = self.spec.target_id.clone();
                container.add_event_listener(kind, ListenerOptions { capture }, move |event| {
                    let matches = match &target_id {
                        Some(id) => event.target_id() == Some(id.as_str()),
                        None => true,
                    };
                    if matches {
                        handler(event);
                    }
                })
            }
        };

        self.installed = Some(Installed {
            scope: self.spec.scope,
            listener,
        });
    }
}

/// Ordered list of a component's bindings.
#[derive(Default)]
pub(crate) struct EventRegistry {
    bindings: Vec<Binding>,
}

impl EventRegistry {
    pub(crate) fn add(&mut self, spec: EventSpec) {
        debug!(kind = %spec.kind, name = ?spec.name, "event binding added");
        self.bindings.push(Binding {
            spec,
            installed: None,
        });
    }

    /// (Re)install every binding, in declaration order.
    pub(crate) fn mount(&mut self, container: &Element, capture: bool) {
        for binding in &mut self.bindings {
            binding.install(container, capture);
        }
        debug!(bindings = self.bindings.len(), "event bindings installed");
    }

    /// Uninstall and drop every binding named `name`.
    ///
    /// Returns the number of bindings removed, or an error if none matched.
    pub(crate) fn remove(&mut self, name: &str, container: &Element) -> Result<usize> {
        let mut removed = 0;
        self.bindings.retain_mut(|binding| {
            if binding.spec.name.as_deref() == Some(name) {
                binding.uninstall(container);
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed == 0 {
            return Err(Error::EventNotRegistered {
                name: name.to_string(),
            });
        }
        debug!(name, removed, "event binding removed");
        Ok(removed)
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }

    pub(crate) fn installed_count(&self) -> usize {
        self.bindings
            .iter()
            .filter(|b| b.installed.is_some())
            .count()
    }
}
