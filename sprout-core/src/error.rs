//! Error types for the Sprout runtime.
//!
//! The reactive core itself is infallible: reads and writes always succeed,
//! and panics raised by user code propagate to the caller untouched. The
//! errors here cover the places where the caller can ask for something that
//! does not exist.

use thiserror::Error;

/// Errors produced by the component layer and configuration loading.
#[derive(Debug, Error)]
pub enum Error {
    /// `remove_event` was called with a logical name that no binding carries.
    #[error("event `{name}` is not registered on this component")]
    EventNotRegistered {
        /// The logical name that was looked up.
        name: String,
    },

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
