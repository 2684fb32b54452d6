//! Runtime Configuration
//!
//! Knobs a browser runtime would hard-code: where components mount
//! when no target is given, what the layout-transparent container looks like,
//! and whether container listeners run in the capture phase.
//!
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```rust,ignore
//! let config = Config::from_json(r#"{ "default_render_target_id": "root" }"#)?;
//! assert_eq!(config.container_tag, "div");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Process-level settings shared by every component created from an [`App`](crate::App).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Element id used by `render` and `on_mounted` when no target is passed.
    pub default_render_target_id: String,

    /// Tag name of the container element each component owns.
    pub container_tag: String,

    /// CSS `display` value applied to containers. `contents` makes the
    /// container behave as if it were not in the layout tree.
    pub container_display: String,

    /// Install component-local listeners in the capture phase.
    pub capture_local_listeners: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_render_target_id: "app".to_string(),
            container_tag: "div".to_string(),
            container_display: "contents".to_string(),
            capture_local_listeners: true,
        }
    }
}

impl Config {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
