//! Component Lifecycle
//!
//! A component owns one container element, a markup function and its event
//! bindings. Its states are
//!
//! ```text
//! Constructed --mount--> Mounted <--update_dom / mount--> Updated
//! ```
//!
//! There is no disposed state.
//!
//! # Rendering
//!
//! Every render replaces the container's whole content with a fresh call to
//! the markup function. The container itself is created once and keeps its
//! identity for the component's lifetime; only its content and listeners
//! change.
//!
//! A reactive component runs `update_dom` inside a tracked computation, so
//! each signal the markup reads becomes a dependency. A change to any of them
//! re-renders the container and, once mounted, re-installs the event
//! bindings. The computation holds only a weak reference to the component.
//!
//! # Missing Render Targets
//!
//! Mounting against an id that is not in the document logs a warning and
//! leaves the component where it was. Check [`Component::is_mounted`] to
//! detect it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::events::{EventContext, EventRegistry, EventSpec};
use crate::config::Config;
use crate::dom::{Document, Element};
use crate::error::Result;
use crate::reactive::{Computation, Runtime};

/// Where a component is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Created, container filled, not attached yet.
    Constructed,
    /// Attached under its render target.
    Mounted,
    /// Re-rendered at least once since the last mount.
    Updated,
}

/// Options accepted when creating a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentOptions {
    /// Element id to mount under. Falls back to the configured default.
    pub render_target_id: Option<String>,

    /// Render once and never track signal reads.
    pub is_static: bool,
}

impl ComponentOptions {
    /// Options for a static component.
    pub fn static_render() -> Self {
        Self {
            is_static: true,
            ..Self::default()
        }
    }

    /// Set the render target id.
    pub fn render_target(mut self, id: impl Into<String>) -> Self {
        self.render_target_id = Some(id.into());
        self
    }
}

/// Handle to a component.
///
/// Cloning the handle shares the component. Keep a handle alive for as long
/// as the component should keep re-rendering.
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

struct ComponentInner {
    /// Generated id, also the container's element id.
    id: String,

    markup: Box<dyn Fn() -> String>,

    /// The container. Never replaced.
    container: Element,

    /// Reference handed out by `node_ref`, refreshed on every render.
    current: RefCell<Element>,

    render_target_id: RefCell<String>,

    state: Cell<LifecycleState>,

    events: RefCell<EventRegistry>,

    /// Install container listeners in the capture phase.
    capture: bool,

    /// The tracked re-render, for reactive components.
    computation: RefCell<Option<Computation>>,
}

impl Component {
    /// Create a component rendering `markup` into a fresh container.
    ///
    /// The markup runs once here. Unless `options.is_static` is set it runs
    /// inside a tracked computation and re-runs when what it read changes.
    /// A panic in the markup function propagates out of this call.
    pub fn new<F>(
        runtime: &Runtime,
        document: &Document,
        config: &Config,
        markup: F,
        options: ComponentOptions,
    ) -> Self
    where
        F: Fn() -> String + 'static,
    {
        let id = Uuid::new_v4().to_string();
        let container = document.create_element(&config.container_tag);
        container.set_id(&id);
        container.set_style("display", &config.container_display);

        let render_target_id = options
            .render_target_id
            .unwrap_or_else(|| config.default_render_target_id.clone());

        let component = Self {
            inner: Rc::new(ComponentInner {
                id,
                markup: Box::new(markup),
                current: RefCell::new(container.clone()),
                container,
                render_target_id: RefCell::new(render_target_id),
                state: Cell::new(LifecycleState::Constructed),
                events: RefCell::new(EventRegistry::default()),
                capture: config.capture_local_listeners,
                computation: RefCell::new(None),
            }),
        };

        if options.is_static {
            runtime.untrack(|| component.update_dom());
        } else {
            let weak = Rc::downgrade(&component.inner);
            let computation = runtime.track(move || rerender(&weak));
            *component.inner.computation.borrow_mut() = Some(computation);
        }

        debug!(
            component = %component.inner.id,
            is_static = options.is_static,
            "component created"
        );
        component
    }

    /// The generated id, shared with the container element.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.inner.state.get()
    }

    /// Whether the last successful mount attached the container.
    pub fn is_mounted(&self) -> bool {
        self.state() != LifecycleState::Constructed
    }

    /// The id the component mounts under.
    pub fn render_target_id(&self) -> String {
        self.inner.render_target_id.borrow().clone()
    }

    /// The tracked re-render computation. `None` for static components.
    pub fn computation(&self) -> Option<Computation> {
        self.inner.computation.borrow().clone()
    }

    /// Reference to the container.
    pub fn node_ref(&self) -> Element {
        self.inner.current.borrow().clone()
    }

    /// Mount under `target_id`, or under the stored render target if `None`.
    pub fn render(&self, target_id: Option<&str>) -> &Self {
        self.mount(target_id);
        self
    }

    /// Mount, then hand the container to `callback` for imperative setup.
    ///
    /// The callback runs even if the target was missing; it can check
    /// `is_mounted` on a cloned handle.
    pub fn on_mounted<F>(&self, callback: F, target_id: Option<&str>) -> &Self
    where
        F: FnOnce(&Element),
    {
        self.mount(target_id);
        callback(&self.inner.container);
        self
    }

    /// Re-run the markup function and replace the container's content.
    ///
    /// The content is assigned in one step, so a panicking markup function
    /// leaves the previous content in place.
    pub fn update_dom(&self) {
        let html = (self.inner.markup)();
        self.inner.container.set_inner_html(&html);
        *self.inner.current.borrow_mut() = self.inner.container.clone();

        if self.is_mounted() {
            self.inner.state.set(LifecycleState::Updated);
        }
        debug!(component = %self.inner.id, "component rendered");
    }

    /// Install every event binding, replacing listeners installed earlier.
    pub fn mount_events(&self) {
        self.inner
            .events
            .borrow_mut()
            .mount(&self.inner.container, self.inner.capture);
    }

    /// Declare an event binding.
    ///
    /// `factory` receives the container and returns the binding. Listeners
    /// are installed on the next mount or re-render.
    pub fn add_event<F>(&self, factory: F) -> &Self
    where
        F: FnOnce(EventContext<'_>) -> EventSpec,
    {
        let spec = factory(EventContext {
            target: &self.inner.container,
        });
        self.inner.events.borrow_mut().add(spec);
        self
    }

    /// Uninstall and drop every binding named `name`.
    ///
    /// Fails with [`Error::EventNotRegistered`](crate::Error::EventNotRegistered)
    /// if no binding has that name.
    pub fn remove_event(&self, name: &str) -> Result<&Self> {
        self.inner
            .events
            .borrow_mut()
            .remove(name, &self.inner.container)?;
        Ok(self)
    }

    /// Number of declared bindings.
    pub fn binding_count(&self) -> usize {
        self.inner.events.borrow().len()
    }

    /// Number of bindings with a listener currently installed.
    pub fn installed_binding_count(&self) -> usize {
        self.inner.events.borrow().installed_count()
    }

    fn mount(&self, target_id: Option<&str>) -> bool {
        let target_id = target_id
            .map(str::to_string)
            .unwrap_or_else(|| self.render_target_id());

        let Some(target) = self.inner.container.document().get_element_by_id(&target_id) else {
            warn!(
                component = %self.inner.id,
                target = %target_id,
                "render target not found; component left unmounted"
            );
            *self.inner.render_target_id.borrow_mut() = target_id;
            return false;
        };

        if !target.append_child(&self.inner.container) {
            // Only the container itself or an element inside it can refuse it.
            warn!(
                component = %self.inner.id,
                target = %target_id,
                "render target is inside the component; mount skipped"
            );
            return false;
        }
        debug!(component = %self.inner.id, target = %target_id, "component mounted");
        *self.inner.render_target_id.borrow_mut() = target_id;
        self.inner.state.set(LifecycleState::Mounted);
        self.mount_events();
        true
    }
}

/// Body of a reactive component's tracked computation.
fn rerender(component: &Weak<ComponentInner>) {
    let Some(inner) = component.upgrade() else {
        return;
    };
    let component = Component { inner };
    component.update_dom();
    if component.is_mounted() {
        component.mount_events();
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("render_target_id", &self.render_target_id())
            .field("bindings", &self.binding_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Event;
    use std::cell::Cell;

    struct Fixture {
        runtime: Runtime,
        document: Document,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            let document = Document::new();
            document.create_mount_point("app");
            Self {
                runtime: Runtime::new(),
                document,
                config: Config::default(),
            }
        }

        fn component<F>(&self, markup: F, options: ComponentOptions) -> Component
        where
            F: Fn() -> String + 'static,
        {
            Component::new(&self.runtime, &self.document, &self.config, markup, options)
        }
    }

    #[test]
    fn construction_fills_container() {
        let fx = Fixture::new();
        let component = fx.component(|| "<p>hi</p>".to_string(), ComponentOptions::default());

        let container = component.node_ref();
        assert_eq!(container.inner_html(), "<p>hi</p>");
        assert_eq!(container.id().as_deref(), Some(component.id()));
        assert_eq!(container.style("display").as_deref(), Some("contents"));
        assert_eq!(component.state(), LifecycleState::Constructed);
        assert!(!container.is_connected());
    }

    #[test]
    fn render_mounts_under_default_target() {
        let fx = Fixture::new();
        let component = fx.component(|| "x".to_string(), ComponentOptions::default());

        component.render(None);

        assert!(component.is_mounted());
        assert_eq!(component.render_target_id(), "app");
        let app = fx.document.get_element_by_id("app").unwrap();
        assert_eq!(app.children(), vec![component.node_ref()]);
    }

    #[test]
    fn render_target_from_options_and_override() {
        let fx = Fixture::new();
        fx.document.create_mount_point("sidebar");
        let component = fx.component(
            || "x".to_string(),
            ComponentOptions::default().render_target("sidebar"),
        );
        assert_eq!(component.render_target_id(), "sidebar");

        component.render(Some("app"));
        assert_eq!(component.render_target_id(), "app");
        assert_eq!(
            component.node_ref().parent().and_then(|p| p.id()).as_deref(),
            Some("app")
        );
    }

    #[test]
    fn missing_target_leaves_component_unmounted() {
        let fx = Fixture::new();
        let component = fx.component(|| "x".to_string(), ComponentOptions::default());
        component.add_event(|_| EventSpec::new("click", |_| {}));

        component.render(Some("nowhere"));

        assert!(!component.is_mounted());
        assert!(!component.node_ref().is_connected());
        assert_eq!(component.installed_binding_count(), 0);
    }

    #[test]
    fn on_mounted_runs_callback_without_target() {
        let fx = Fixture::new();
        let component = fx.component(|| "x".to_string(), ComponentOptions::default());
        let seen = Cell::new(false);

        let expected = component.node_ref();
        component.on_mounted(
            |container| {
                assert_eq!(container, &expected);
                assert!(!container.is_connected());
                seen.set(true);
            },
            Some("nowhere"),
        );

        assert!(seen.get());
        assert!(!component.is_mounted());
    }

    #[test]
    fn mounting_into_own_container_is_refused() {
        let fx = Fixture::new();
        let component = fx.component(|| "x".to_string(), ComponentOptions::default());
        component.add_event(|_| EventSpec::new("click", |_| {}));
        component.render(None);
        let state = component.state();
        let own_id = component.id().to_string();

        component.render(Some(&own_id));

        assert_eq!(component.render_target_id(), "app");
        assert_eq!(component.state(), state);
        assert_eq!(
            component.node_ref().parent(),
            fx.document.get_element_by_id("app")
        );
        assert!(component.node_ref().is_connected());
        assert_eq!(component.installed_binding_count(), 1);
    }

    #[test]
    fn static_component_ignores_signal_changes() {
        let fx = Fixture::new();
        let count = fx.runtime.create_signal(0);
        let reader = count.clone();
        let component = fx.component(
            move || reader.get().to_string(),
            ComponentOptions::static_render(),
        );

        count.set(5);

        assert_eq!(component.node_ref().inner_html(), "0");
        assert!(component.computation().is_none());
        assert_eq!(count.subscriber_count(), 0);
    }

    #[test]
    fn reactive_component_rerenders_and_reinstalls_events() {
        let fx = Fixture::new();
        let count = fx.runtime.create_signal(0);
        let reader = count.clone();
        let component = fx.component(
            move || format!("<h1>{}</h1>", reader.get()),
            ComponentOptions::default(),
        );
        component.add_event(|_| EventSpec::new("click", |_| {}));
        component.render(None);

        count.set(1);

        assert_eq!(component.state(), LifecycleState::Updated);
        assert_eq!(component.node_ref().text_content(), "1");
        assert_eq!(component.node_ref().listener_count(Some("click")), 1);
    }

    #[test]
    fn update_dom_is_idempotent() {
        let fx = Fixture::new();
        let component = fx.component(
            || r#"<ul><li id="a">a</li></ul>"#.to_string(),
            ComponentOptions::default(),
        );

        component.update_dom();
        let first = component.node_ref().inner_html();
        component.update_dom();
        assert_eq!(component.node_ref().inner_html(), first);
    }

    #[test]
    fn on_mounted_receives_container() {
        let fx = Fixture::new();
        let component = fx.component(|| "x".to_string(), ComponentOptions::default());
        let seen = Cell::new(false);

        let expected = component.node_ref();
        component.on_mounted(
            |container| {
                assert_eq!(container, &expected);
                assert!(container.is_connected());
                seen.set(true);
            },
            None,
        );
        assert!(seen.get());
    }

    #[test]
    fn add_event_factory_sees_container() {
        let fx = Fixture::new();
        let component = fx.component(|| "x".to_string(), ComponentOptions::default());
        let expected = component.node_ref();

        component.add_event(|ctx| {
            assert_eq!(ctx.target, &expected);
            EventSpec::new("click", |_| {})
        });
        assert_eq!(component.binding_count(), 1);
    }

    #[test]
    fn dropped_component_stops_rendering() {
        let fx = Fixture::new();
        let count = fx.runtime.create_signal(0);
        let renders = Rc::new(Cell::new(0));

        let (reader, counter) = (count.clone(), renders.clone());
        let component = fx.component(
            move || {
                counter.set(counter.get() + 1);
                reader.get().to_string()
            },
            ComponentOptions::default(),
        );
        drop(component);

        count.set(1);
        count.set(2);

        assert_eq!(renders.get(), 1);
        // The orphaned computation stopped reading on its last run.
        assert_eq!(count.subscriber_count(), 0);
    }

    #[test]
    fn remounting_does_not_duplicate_listeners() {
        let fx = Fixture::new();
        let hits = Rc::new(Cell::new(0));
        let component = fx.component(|| "<b id=\"go\">go</b>".to_string(), ComponentOptions::default());

        let sink = hits.clone();
        component.add_event(move |_| {
            EventSpec::new("click", move |_| sink.set(sink.get() + 1)).target_id("go")
        });
        component.render(None).render(None);

        component
            .node_ref()
            .dispatch_event(&Event::new("click").with_target_id("go"));
        assert_eq!(hits.get(), 1);
    }
}
