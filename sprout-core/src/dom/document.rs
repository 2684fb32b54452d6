//! Host Document
//!
//! An in-memory stand-in for the browser tree the components render into:
//! elements with ids, inline styles, markup content and children, a root
//! `body`, and a window-level listener table.
//!
//! # Content Model
//!
//! An element's content is its markup string followed by any child elements
//! appended to it. Markup is opaque: it is stored and serialized as given,
//! and only scanned for the ids it declares so events can originate from
//! elements that exist only as markup. Replacing the markup detaches every
//! child element, like assigning `innerHTML`.
//!
//! # Event Propagation
//!
//! Dispatching at an element walks the same phases a browser does:
//!
//! 1. window capture listeners
//! 2. capture listeners on ancestors, root first
//! 3. every listener on the target
//! 4. bubble listeners on ancestors, nearest first
//! 5. window bubble listeners
//!
//! Window phases only run for elements attached to the document. Callbacks
//! are collected before any of them runs, so a listener that adds or
//! removes listeners affects the next dispatch, not this one.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use super::event::{Event, EventKind};
use super::markup;

/// Identifier returned when installing a listener, used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Options accepted by `add_event_listener`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Run during the capture phase instead of the bubble phase.
    pub capture: bool,
}

impl ListenerOptions {
    /// Capture-phase options.
    pub fn capture() -> Self {
        Self { capture: true }
    }
}

type Callback = Rc<dyn Fn(&Event)>;

struct Listener {
    id: ListenerId,
    capture: bool,
    callback: Callback,
}

/// Listeners grouped by event kind, in installation order.
#[derive(Default)]
struct ListenerTable {
    by_kind: IndexMap<EventKind, Vec<Listener>>,
}

impl ListenerTable {
    fn add(&mut self, kind: EventKind, listener: Listener) {
        self.by_kind.entry(kind).or_default().push(listener);
    }

    fn remove(&mut self, kind: &EventKind, id: ListenerId) -> bool {
        let Some(listeners) = self.by_kind.get_mut(kind) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.by_kind.shift_remove(kind);
        }
        removed
    }

    /// Callbacks for `kind`, filtered by phase. `None` takes both.
    fn collect(&self, kind: &EventKind, capture: Option<bool>, out: &mut Vec<Callback>) {
        if let Some(listeners) = self.by_kind.get(kind) {
            out.extend(
                listeners
                    .iter()
                    .filter(|l| capture.map_or(true, |c| l.capture == c))
                    .map(|l| Rc::clone(&l.callback)),
            );
        }
    }

    fn count(&self, kind: Option<&EventKind>) -> usize {
        match kind {
            Some(kind) => self.by_kind.get(kind).map_or(0, Vec::len),
            None => self.by_kind.values().map(Vec::len).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeKey(usize);

struct NodeData {
    tag: String,
    id: Option<String>,
    style: IndexMap<String, String>,
    markup: String,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    listeners: ListenerTable,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            style: IndexMap::new(),
            markup: String::new(),
            parent: None,
            children: Vec::new(),
            listeners: ListenerTable::default(),
        }
    }
}

struct DocumentInner {
    /// Element arena. Elements are never freed.
    nodes: Vec<NodeData>,
    body: NodeKey,
    window: ListenerTable,
    next_listener: u64,
}

impl DocumentInner {
    fn node(&self, key: NodeKey) -> &NodeData {
        &self.nodes[key.0]
    }

    fn node_mut(&mut self, key: NodeKey) -> &mut NodeData {
        &mut self.nodes[key.0]
    }

    fn next_listener_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        id
    }

    /// `key` followed by its ancestors, nearest first.
    fn path(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut path = vec![key];
        let mut current = self.node(key).parent;
        while let Some(parent) = current {
            path.push(parent);
            current = self.node(parent).parent;
        }
        path
    }

    fn is_connected(&self, key: NodeKey) -> bool {
        self.path(key).last() == Some(&self.body)
    }

    /// Attached elements in document order.
    fn visible(&self) -> Vec<NodeKey> {
        let mut order = Vec::new();
        let mut stack = vec![self.body];
        while let Some(key) = stack.pop() {
            order.push(key);
            stack.extend(self.node(key).children.iter().rev().copied());
        }
        order
    }

    fn detach(&mut self, key: NodeKey) {
        if let Some(parent) = self.node_mut(key).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != key);
        }
    }

    fn serialize(&self, key: NodeKey, out: &mut String) {
        let node = self.node(key);
        out.push('<');
        out.push_str(&node.tag);
        if let Some(id) = &node.id {
            out.push_str(&markup::attributes([("id", id.as_str())]));
        }
        if !node.style.is_empty() {
            let style = node
                .style
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            out.push_str(&markup::attributes([("style", style)]));
        }
        out.push('>');
        self.serialize_content(key, out);
        out.push_str("</");
        out.push_str(&node.tag);
        out.push('>');
    }

    fn serialize_content(&self, key: NodeKey, out: &mut String) {
        let node = self.node(key);
        out.push_str(&node.markup);
        for child in &node.children {
            self.serialize(*child, out);
        }
    }
}

/// Handle to a host document.
///
/// Cloning the handle shares the document.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Document {
    /// Create a document containing only an empty `body`.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(DocumentInner {
                nodes: vec![NodeData::new("body")],
                body: NodeKey(0),
                window: ListenerTable::default(),
                next_listener: 0,
            })),
        }
    }

    /// The root element.
    pub fn body(&self) -> Element {
        let body = self.inner.borrow().body;
        self.element(body)
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> Element {
        let key = {
            let mut inner = self.inner.borrow_mut();
            inner.nodes.push(NodeData::new(tag));
            NodeKey(inner.nodes.len() - 1)
        };
        self.element(key)
    }

    /// Create a `div` with the given id and append it to `body`.
    pub fn create_mount_point(&self, id: &str) -> Element {
        let element = self.create_element("div");
        element.set_id(id);
        self.body().append_child(&element);
        element
    }

    /// Find an attached element by id. Detached elements are not searched.
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        let key = {
            let inner = self.inner.borrow();
            inner
                .visible()
                .into_iter()
                .find(|key| inner.node(*key).id.as_deref() == Some(id))
        };
        key.map(|key| self.element(key))
    }

    /// Install a window-level listener.
    pub fn add_window_listener<F>(
        &self,
        kind: impl Into<EventKind>,
        options: ListenerOptions,
        callback: F,
    ) -> ListenerId
    where
        F: Fn(&Event) + 'static,
    {
        let kind = kind.into();
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener_id();
        trace!(kind = %kind, listener = id.0, "window listener added");
        inner.window.add(
            kind,
            Listener {
                id,
                capture: options.capture,
                callback: Rc::new(callback),
            },
        );
        id
    }

    /// Remove a window-level listener. Returns whether it was installed.
    pub fn remove_window_listener(&self, kind: &EventKind, id: ListenerId) -> bool {
        self.inner.borrow_mut().window.remove(kind, id)
    }

    /// Number of window listeners, for one kind or all of them.
    pub fn window_listener_count(&self, kind: Option<&str>) -> usize {
        let kind = kind.map(EventKind::from);
        self.inner.borrow().window.count(kind.as_ref())
    }

    /// Dispatch `event` at `target`. Returns the number of listeners invoked.
    pub fn dispatch(&self, target: &Element, event: &Event) -> usize {
        let callbacks = {
            let inner = self.inner.borrow();
            let kind = event.kind();
            let path = inner.path(target.key);
            let connected = path.last() == Some(&inner.body);
            let mut callbacks = Vec::new();

            if connected {
                inner.window.collect(kind, Some(true), &mut callbacks);
            }
            for key in path.iter().skip(1).rev() {
                inner.node(*key).listeners.collect(kind, Some(true), &mut callbacks);
            }
            let listeners = &inner.node(target.key).listeners;
            listeners.collect(kind, Some(true), &mut callbacks);
            listeners.collect(kind, Some(false), &mut callbacks);
            for key in path.iter().skip(1) {
                inner.node(*key).listeners.collect(kind, Some(false), &mut callbacks);
            }
            if connected {
                inner.window.collect(kind, Some(false), &mut callbacks);
            }
            callbacks
        };

        trace!(kind = %event.kind(), listeners = callbacks.len(), "dispatching event");
        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }

    /// Dispatch `event` at the window only.
    pub fn dispatch_window(&self, event: &Event) -> usize {
        let callbacks = {
            let inner = self.inner.borrow();
            let mut callbacks = Vec::new();
            inner.window.collect(event.kind(), Some(true), &mut callbacks);
            inner.window.collect(event.kind(), Some(false), &mut callbacks);
            callbacks
        };
        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }

    /// Dispatch a `kind` event originating from the element with id
    /// `target_id`.
    ///
    /// The event is dispatched at the attached element carrying that id. If
    /// the id only exists inside some element's markup, it is dispatched at
    /// the innermost attached element whose markup declares it. Returns the
    /// number of listeners invoked, zero when the id is nowhere to be found.
    pub fn fire(&self, kind: impl Into<EventKind>, target_id: &str) -> usize {
        let event = Event::new(kind).with_target_id(target_id);
        let target = self.get_element_by_id(target_id).or_else(|| {
            let key = {
                let inner = self.inner.borrow();
                inner.visible().into_iter().rev().find(|key| {
                    markup::declared_ids(&inner.node(*key).markup)
                        .iter()
                        .any(|id| id == target_id)
                })
            };
            key.map(|key| self.element(key))
        });

        match target {
            Some(target) => self.dispatch(&target, &event),
            None => 0,
        }
    }

    /// Serialize the attached tree, starting at `body`.
    pub fn to_html(&self) -> String {
        let inner = self.inner.borrow();
        let mut out = String::new();
        inner.serialize(inner.body, &mut out);
        out
    }

    fn element(&self, key: NodeKey) -> Element {
        Element {
            document: self.clone(),
            key,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("elements", &inner.nodes.len())
            .field("window_listeners", &inner.window.count(None))
            .finish()
    }
}

/// Handle to one element of a [`Document`].
#[derive(Clone)]
pub struct Element {
    document: Document,
    key: NodeKey,
}

impl Element {
    /// The document this element belongs to.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Tag name.
    pub fn tag(&self) -> String {
        self.read(|node| node.tag.clone())
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<String> {
        self.read(|node| node.id.clone())
    }

    /// Set the `id` attribute.
    pub fn set_id(&self, id: &str) {
        self.write(|node| node.id = Some(id.to_string()));
    }

    /// Set one inline style property.
    pub fn set_style(&self, property: &str, value: &str) {
        self.write(|node| {
            node.style.insert(property.to_string(), value.to_string());
        });
    }

    /// Read one inline style property.
    pub fn style(&self, property: &str) -> Option<String> {
        self.read(|node| node.style.get(property).cloned())
    }

    /// Serialized content: markup followed by child elements.
    pub fn inner_html(&self) -> String {
        let inner = self.document.inner.borrow();
        let mut out = String::new();
        inner.serialize_content(self.key, &mut out);
        out
    }

    /// Serialized element including its own tag.
    pub fn outer_html(&self) -> String {
        let inner = self.document.inner.borrow();
        let mut out = String::new();
        inner.serialize(self.key, &mut out);
        out
    }

    /// Replace the entire content with `markup`. Child elements are detached.
    pub fn set_inner_html(&self, markup: &str) {
        let mut inner = self.document.inner.borrow_mut();
        let children = std::mem::take(&mut inner.node_mut(self.key).children);
        for child in children {
            inner.node_mut(child).parent = None;
        }
        inner.node_mut(self.key).markup = markup.to_string();
    }

    /// Visible text of the content, whitespace collapsed.
    pub fn text_content(&self) -> String {
        markup::visible_text(&self.inner_html())
    }

    /// Whether this element's own markup declares an element with `id`.
    pub fn declares_id(&self, id: &str) -> bool {
        self.read(|node| markup::declared_ids(&node.markup).iter().any(|d| d == id))
    }

    /// Append `child`, moving it if it already has a parent.
    ///
    /// Returns `false` without changing anything if `child` is this element
    /// or one of its ancestors.
    pub fn append_child(&self, child: &Element) -> bool {
        let mut inner = self.document.inner.borrow_mut();
        if inner.path(self.key).contains(&child.key) {
            return false;
        }
        inner.detach(child.key);
        inner.node_mut(child.key).parent = Some(self.key);
        inner.node_mut(self.key).children.push(child.key);
        true
    }

    /// Parent element, if attached to one.
    pub fn parent(&self) -> Option<Element> {
        self.read(|node| node.parent)
            .map(|key| self.document.element(key))
    }

    /// Child elements in order.
    pub fn children(&self) -> Vec<Element> {
        self.read(|node| node.children.clone())
            .into_iter()
            .map(|key| self.document.element(key))
            .collect()
    }

    /// Whether the element is reachable from `body`.
    pub fn is_connected(&self) -> bool {
        self.document.inner.borrow().is_connected(self.key)
    }

    /// Install a listener on this element.
    pub fn add_event_listener<F>(
        &self,
        kind: impl Into<EventKind>,
        options: ListenerOptions,
        callback: F,
    ) -> ListenerId
    where
        F: Fn(&Event) + 'static,
    {
        let kind = kind.into();
        let mut inner = self.document.inner.borrow_mut();
        let id = inner.next_listener_id();
        trace!(kind = %kind, listener = id.0, "element listener added");
        inner.node_mut(self.key).listeners.add(
            kind,
            Listener {
                id,
                capture: options.capture,
                callback: Rc::new(callback),
            },
        );
        id
    }

    /// Remove a listener. Returns whether it was installed.
    pub fn remove_event_listener(&self, kind: &EventKind, id: ListenerId) -> bool {
        self.write(|node| node.listeners.remove(kind, id))
    }

    /// Number of listeners installed here, for one kind or all of them.
    pub fn listener_count(&self, kind: Option<&str>) -> usize {
        let kind = kind.map(EventKind::from);
        self.read(|node| node.listeners.count(kind.as_ref()))
    }

    /// Dispatch `event` at this element.
    pub fn dispatch_event(&self, event: &Event) -> usize {
        self.document.dispatch(self, event)
    }

    fn read<R>(&self, f: impl FnOnce(&NodeData) -> R) -> R {
        f(self.document.inner.borrow().node(self.key))
    }

    fn write<R>(&self, f: impl FnOnce(&mut NodeData) -> R) -> R {
        f(self.document.inner.borrow_mut().node_mut(self.key))
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.document.inner, &other.document.inner) && self.key == other.key
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag())
            .field("id", &self.id())
            .finish()
    }
}
