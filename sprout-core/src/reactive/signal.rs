//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value and
//! tracks which computations depend on it.
//!
//! # How Signals Work
//!
//! 1. When a signal is read within a tracked computation, the signal
//!    registers that computation as a subscriber.
//!
//! 2. When a write changes the value, all subscribers re-run, in the order
//!    they subscribed, before the write returns.
//!
//! 3. A write that leaves the value equal to the current one is ignored:
//!    no subscriber runs and the previous value is untouched.
//!
//! # Previous Value
//!
//! Every accepted write moves the old current value into the "previous"
//! slot. Until the first accepted write, the previous value is the initial
//! value.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use super::runtime::RuntimeInner;

/// Identifier of a signal, unique within its runtime.
///
/// Ids are handed out in creation order and double as the signal's index
/// in the runtime's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(usize);

impl SignalId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the signal in its runtime's arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The two ways to write a signal.
///
/// Keeping the updater form as its own variant means a `T` that is itself a
/// closure type is never mistaken for an updater.
pub enum SetValue<T> {
    /// Replace the value.
    Literal(T),
    /// Compute the next value from the current one.
    Updater(Box<dyn FnOnce(&T) -> T>),
}

impl<T> SetValue<T> {
    /// Wrap a closure as an updater.
    pub fn updater<F>(f: F) -> Self
    where
        F: FnOnce(&T) -> T + 'static,
    {
        Self::Updater(Box::new(f))
    }

    fn resolve(self, current: &T) -> T {
        match self {
            Self::Literal(value) => value,
            Self::Updater(f) => f(current),
        }
    }
}

impl<T> From<T> for SetValue<T> {
    fn from(value: T) -> Self {
        Self::Literal(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for SetValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Updater(_) => f.write_str("Updater(..)"),
        }
    }
}

/// A reactive signal holding a value of type T.
///
/// # Type Parameters
///
/// - `T`: The stored value. `Clone` because reads hand out copies, and
///   `PartialEq` because writes of an equal value are ignored.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = Runtime::new();
/// let count = runtime.create_signal(0);
///
/// count.set(5);
/// count.update(|c| c + 1);
/// assert_eq!(count.get(), 6);
/// assert_eq!(count.get_previous(), 5);
///
/// count.reset();
/// assert_eq!(count.get(), 0);
/// ```
pub struct Signal<T> {
    id: SignalId,

    /// Weak so that computations capturing the signal do not keep the
    /// runtime alive. Once the runtime is gone, reads no longer subscribe
    /// and writes no longer notify.
    runtime: Weak<RuntimeInner>,

    state: Rc<RefCell<SignalState<T>>>,
}

struct SignalState<T> {
    current: T,
    /// `None` until the first accepted write.
    previous: Option<T>,
    initial: T,
}

impl<T> Signal<T>
where
    T: Clone + PartialEq + 'static,
{
    pub(crate) fn new(id: SignalId, runtime: Weak<RuntimeInner>, initial: T) -> Self {
        Self {
            id,
            runtime,
            state: Rc::new(RefCell::new(SignalState {
                current: initial.clone(),
                previous: None,
                initial,
            })),
        }
    }

    /// Get the signal's ID.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Get the current value.
    ///
    /// Inside a tracked computation this also subscribes the computation.
    /// Outside one it is a plain read.
    pub fn get(&self) -> T {
        self.track_read();
        self.state.borrow().current.clone()
    }

    /// Get the current value without subscribing anything.
    pub fn get_untracked(&self) -> T {
        self.state.borrow().current.clone()
    }

    /// Borrow the current value, subscribing like [`get`](Self::get).
    ///
    /// Writing to this signal from inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track_read();
        f(&self.state.borrow().current)
    }

    /// Replace the value. Returns whether the write was accepted.
    pub fn set(&self, value: T) -> bool {
        self.apply(SetValue::Literal(value))
    }

    /// Compute the next value from the current one. Returns whether the
    /// write was accepted.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T + 'static,
    {
        self.apply(SetValue::updater(f))
    }

    /// Apply a write.
    ///
    /// If the next value equals the current one nothing happens. Otherwise
    /// the current value becomes the previous value and every subscriber
    /// re-runs before this returns.
    pub fn apply(&self, write: SetValue<T>) -> bool {
        // The updater runs without a borrow held so it may read this signal.
        let current = self.state.borrow().current.clone();
        let next = write.resolve(&current);

        {
            let mut state = self.state.borrow_mut();
            if state.current == next {
                return false;
            }
            let previous = std::mem::replace(&mut state.current, next);
            state.previous = Some(previous);
        }

        debug!(signal = self.id.index(), "signal written");
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.notify(self.id);
        }
        true
    }

    /// Write the initial value back.
    pub fn reset(&self) -> bool {
        let initial = self.state.borrow().initial.clone();
        self.set(initial)
    }

    /// The value held just before the most recent accepted write, or the
    /// initial value if there has been none.
    pub fn get_previous(&self) -> T {
        let state = self.state.borrow();
        state
            .previous
            .as_ref()
            .unwrap_or(&state.initial)
            .clone()
    }

    /// Number of computations subscribed to this signal.
    pub fn subscriber_count(&self) -> usize {
        self.runtime
            .upgrade()
            .map_or(0, |runtime| runtime.subscriber_count(self.id))
    }

    fn track_read(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.on_read(self.id);
        }
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            runtime: Weak::clone(&self.runtime),
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for Signal<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &state.current)
            .field("previous", &state.previous)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
