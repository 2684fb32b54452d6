//! Events dispatched through the host document.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of an event type, such as `click` or `keydown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKind(String);

impl EventKind {
    /// Create an event kind from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The event name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dispatched event.
///
/// `target_id` is the id of the element the event originated from. Listeners
/// installed higher up the tree see the same value, which is what delegated
/// handlers filter on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: EventKind,
    target_id: Option<String>,
}

impl Event {
    /// Create an event with no originating element id.
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self {
            kind: kind.into(),
            target_id: None,
        }
    }

    /// Set the id of the originating element.
    pub fn with_target_id(mut self, id: impl Into<String>) -> Self {
        self.target_id = Some(id.into());
        self
    }

    /// The event type.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Id of the originating element, if it has one.
    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_compare_by_name() {
        assert_eq!(EventKind::from("click"), EventKind::new("click".to_string()));
        assert_ne!(EventKind::from("click"), EventKind::from("input"));
    }

    #[test]
    fn event_carries_target_id() {
        let event = Event::new("click").with_target_id("plus");
        assert_eq!(event.kind().as_str(), "click");
        assert_eq!(event.target_id(), Some("plus"));
        assert_eq!(Event::new("click").target_id(), None);
    }

    #[test]
    fn kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&EventKind::from("keydown")).unwrap();
        assert_eq!(json, "\"keydown\"");
    }
}
