//! Application facade.
//!
//! [`App`] bundles one reactive runtime, one host document and the
//! configuration, and exposes the public operations in one place.

use crate::component::{Component, ComponentOptions};
use crate::config::Config;
use crate::dom::{Document, Element};
use crate::reactive::{Computation, Runtime, Signal};

/// A runtime, a document and the settings components are built with.
#[derive(Debug, Clone, Default)]
pub struct App {
    runtime: Runtime,
    document: Document,
    config: Config,
}

impl App {
    /// Create an app with the default configuration and an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an app with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The reactive runtime.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// The host document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a signal holding `initial`.
    pub fn create_signal<T>(&self, initial: T) -> Signal<T>
    where
        T: Clone + PartialEq + 'static,
    {
        self.runtime.create_signal(initial)
    }

    /// Run `action` as a tracked computation.
    pub fn track<F>(&self, action: F) -> Computation
    where
        F: Fn() + 'static,
    {
        self.runtime.track(action)
    }

    /// Create a component with explicit options.
    pub fn create_component<F>(&self, markup: F, options: ComponentOptions) -> Component
    where
        F: Fn() -> String + 'static,
    {
        Component::new(&self.runtime, &self.document, &self.config, markup, options)
    }

    /// Create a reactive component: it re-renders when signals it read change.
    pub fn component<F>(&self, markup: F) -> Component
    where
        F: Fn() -> String + 'static,
    {
        self.create_component(markup, ComponentOptions::default())
    }

    /// Create a static component: rendered once, never tracked.
    pub fn static_component<F>(&self, markup: F) -> Component
    where
        F: Fn() -> String + 'static,
    {
        self.create_component(markup, ComponentOptions::static_render())
    }

    /// Add a `div` with `id` to the document body to mount components under.
    pub fn create_mount_point(&self, id: &str) -> Element {
        self.document.create_mount_point(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_reaches_components() {
        let config = Config::from_json(
            r#"{ "default_render_target_id": "root", "container_tag": "section" }"#,
        )
        .unwrap();
        let app = App::with_config(config);
        app.create_mount_point("root");

        let component = app.static_component(|| "hello".to_string());
        component.render(None);

        assert!(component.is_mounted());
        assert_eq!(component.node_ref().tag(), "section");
        assert_eq!(component.render_target_id(), "root");
    }

    #[test]
    fn clones_share_runtime_and_document() {
        let app = App::new();
        let other = app.clone();
        other.create_mount_point("app");

        assert!(app.document().get_element_by_id("app").is_some());
        let signal = other.create_signal(1);
        assert_eq!(app.runtime().signal_count(), 1);
        assert_eq!(signal.get(), 1);
    }
}
