//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects signals and
//! computations. It owns the tracking stack and the signal arena, and it
//! re-runs computations when a signal they read changes.
//!
//! # How It Works
//!
//! 1. Creating a signal allocates a slot in the arena. The slot index is the
//!    signal's id and holds the signal's channel list.
//!
//! 2. Running a computation pushes a frame. Every signal read while the
//!    frame is on top records a dependency and subscribes the computation.
//!
//! 3. After the run, signals the computation stopped reading drop it from
//!    their channel lists. Signals it still reads keep it in place.
//!
//! 4. An accepted write re-runs every subscriber in subscription order,
//!    synchronously and depth-first, before the write returns.
//!
//! # Threading
//!
//! Everything here is single-threaded. Handles are `Rc`-based and not
//! `Send`; independent runtimes share nothing, so tests can build as many as
//! they like.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::channel::ChannelList;
use super::computation::{Computation, ComputationId, DependencySet};
use super::context::{FrameGuard, TrackingStack};
use super::signal::{Signal, SignalId};

/// Handle to a reactive runtime.
///
/// Cloning the handle shares the runtime.
#[derive(Clone, Default)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

#[derive(Default)]
pub(crate) struct RuntimeInner {
    stack: TrackingStack,

    /// Signal arena. Slot `n` holds the channel list of `SignalId(n)`.
    channels: RefCell<Vec<ChannelList>>,

    next_computation: Cell<u64>,
}

impl Runtime {
    /// Create an empty runtime.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn downgrade(&self) -> Weak<RuntimeInner> {
        Rc::downgrade(&self.inner)
    }

    /// Create a signal holding `initial`.
    pub fn create_signal<T>(&self, initial: T) -> Signal<T>
    where
        T: Clone + PartialEq + 'static,
    {
        let id = self.inner.allocate_signal();
        trace!(signal = id.index(), "signal created");
        Signal::new(id, self.downgrade(), initial)
    }

    /// Run `action` as a tracked computation.
    ///
    /// The action runs immediately. Every signal it reads becomes a
    /// dependency, and a later change to any of them runs it again.
    pub fn track<F>(&self, action: F) -> Computation
    where
        F: Fn() + 'static,
    {
        let computation = self.inner.new_computation(action);
        self.inner.execute(&computation);
        computation
    }

    /// Run `f` without attributing its reads to the current computation.
    pub fn untrack<R>(&self, f: impl FnOnce() -> R) -> R {
        let _frame = self.inner.stack.enter_untracked();
        f()
    }

    /// Check if reads are currently attributed to a computation.
    pub fn is_tracking(&self) -> bool {
        self.inner.stack.current().is_some()
    }

    /// The computation that reads currently attribute to.
    pub fn current_computation(&self) -> Option<Computation> {
        self.inner.stack.current()
    }

    /// Number of frames on the tracking stack.
    pub fn depth(&self) -> usize {
        self.inner.stack.depth()
    }

    /// Number of signals created in this runtime.
    pub fn signal_count(&self) -> usize {
        self.inner.channels.borrow().len()
    }

    /// Number of computations subscribed to `signal`.
    pub fn subscriber_count(&self, signal: SignalId) -> usize {
        self.inner.subscriber_count(signal)
    }
}

impl RuntimeInner {
    fn allocate_signal(&self) -> SignalId {
        let mut channels = self.channels.borrow_mut();
        channels.push(ChannelList::default());
        SignalId::new(channels.len() - 1)
    }

    fn new_computation<F>(&self, action: F) -> Computation
    where
        F: Fn() + 'static,
    {
        let raw = self.next_computation.get();
        self.next_computation.set(raw + 1);
        Computation::new(ComputationId::new(raw), action)
    }

    /// Run `computation` inside a fresh frame.
    ///
    /// If the computation is already running (it wrote to one of its own
    /// dependencies) the new run nests inside the current one.
    fn execute(&self, computation: &Computation) {
        let nested = computation.is_running();
        let _run = Execution {
            runtime: self,
            computation: computation.clone(),
            nested,
            previous: computation.begin_run(),
            _frame: self.stack.enter(computation.clone()),
        };
        computation.invoke();
    }

    /// Called by a signal on every tracked read.
    pub(crate) fn on_read(&self, signal: SignalId) {
        let Some(computation) = self.stack.current() else {
            return;
        };
        if computation.record(signal) {
            let mut channels = self.channels.borrow_mut();
            if let Some(list) = channels.get_mut(signal.index()) {
                if list.subscribe(&computation) {
                    trace!(
                        signal = signal.index(),
                        computation = computation.id().raw(),
                        "subscribed"
                    );
                }
            }
        }
    }

    /// Called by a signal after an accepted write.
    pub(crate) fn notify(&self, signal: SignalId) {
        let subscribers = match self.channels.borrow().get(signal.index()) {
            Some(list) => list.snapshot(),
            None => return,
        };
        debug!(
            signal = signal.index(),
            subscribers = subscribers.len(),
            "propagating change"
        );

        for computation in subscribers {
            // An earlier subscriber may have caused this one to re-run and
            // stop reading the signal.
            let still_subscribed = self
                .channels
                .borrow()
                .get(signal.index())
                .is_some_and(|list| list.contains(computation.id()));
            if !still_subscribed {
                continue;
            }
            self.execute(&computation);
        }
    }

    pub(crate) fn subscriber_count(&self, signal: SignalId) -> usize {
        self.channels
            .borrow()
            .get(signal.index())
            .map_or(0, ChannelList::len)
    }

    fn unsubscribe(&self, signal: SignalId, computation: ComputationId) {
        if let Some(list) = self.channels.borrow_mut().get_mut(signal.index()) {
            if list.unsubscribe(computation) {
                trace!(
                    signal = signal.index(),
                    computation = computation.raw(),
                    "dropped stale subscription"
                );
            }
        }
    }
}

/// One run of a computation.
///
/// Dropping it, normally or while unwinding, ends the run, drops the
/// subscriptions the run no longer needs, and pops the frame. A nested run
/// drops nothing: the run it interrupted resumes with its own reads merged
/// back, and cleanup happens when the outermost run ends.
struct Execution<'a> {
    runtime: &'a RuntimeInner,
    computation: Computation,
    nested: bool,
    /// Previous run's set, or the interrupted run's partial set if nested.
    previous: DependencySet,
    _frame: FrameGuard<'a>,
}

impl Drop for Execution<'_> {
    fn drop(&mut self) {
        if self.nested {
            self.computation.end_run(Some(&self.previous));
            return;
        }
        self.computation.end_run(None);
        for signal in self.previous.drain(..) {
            if !self.computation.depends_on(signal) {
                self.runtime.unsubscribe(signal, self.computation.id());
            }
        }
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("signals", &self.signal_count())
            .field("depth", &self.depth())
            .finish()
    }
}
