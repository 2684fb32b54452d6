//! Tracked computations.
//!
//! A computation is an action plus the set of signals it read during its most
//! recent run. Component re-renders, user `track` calls and anything else that
//! should re-run on change are all computations.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use super::signal::SignalId;

/// Unique identifier for a computation within one runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComputationId(u64);

impl ComputationId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Signals read during one run. Most computations read a handful of
/// signals, so the set lives inline until it grows past four entries.
pub(crate) type DependencySet = SmallVec<[SignalId; 4]>;

/// Handle to a tracked computation.
///
/// Cloning the handle shares the computation. Signals hold these handles in
/// their channel lists; the runtime re-runs them when a dependency changes.
#[derive(Clone)]
pub struct Computation {
    inner: Rc<ComputationInner>,
}

struct ComputationInner {
    id: ComputationId,

    /// The action to re-run.
    action: Box<dyn Fn()>,

    /// Signals read during the current (or most recent) run, in read order.
    dependencies: RefCell<DependencySet>,

    /// Number of runs of the action currently on the call stack. A write
    /// to one of its own dependencies re-runs the action nested.
    depth: Cell<usize>,

    /// Number of times the action has started.
    run_count: Cell<usize>,
}

impl Computation {
    pub(crate) fn new<F>(id: ComputationId, action: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            inner: Rc::new(ComputationInner {
                id,
                action: Box::new(action),
                dependencies: RefCell::new(DependencySet::new()),
                depth: Cell::new(0),
                run_count: Cell::new(0),
            }),
        }
    }

    /// Get the computation's unique ID.
    pub fn id(&self) -> ComputationId {
        self.inner.id
    }

    /// Signals read during the most recent run, in first-read order.
    pub fn dependencies(&self) -> Vec<SignalId> {
        self.inner.dependencies.borrow().to_vec()
    }

    /// Whether the most recent run read `signal`.
    pub fn depends_on(&self, signal: SignalId) -> bool {
        self.inner.dependencies.borrow().contains(&signal)
    }

    /// Number of times the action has been started.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }

    /// Whether the action is currently executing.
    pub fn is_running(&self) -> bool {
        self.inner.depth.get() > 0
    }

    /// Number of runs currently on the call stack.
    pub fn run_depth(&self) -> usize {
        self.inner.depth.get()
    }

    /// Record a read of `signal`. Returns `true` the first time the signal
    /// is seen in this run.
    pub(crate) fn record(&self, signal: SignalId) -> bool {
        let mut deps = self.inner.dependencies.borrow_mut();
        if deps.contains(&signal) {
            false
        } else {
            deps.push(signal);
            true
        }
    }

    /// Start a fresh run: clears the dependency set and hands back what it
    /// held. For an outermost run that is the previous run's set, used to
    /// drop stale subscriptions afterwards. For a nested run it is the
    /// partial set of the run it interrupted, to be merged back by
    /// [`end_run`](Self::end_run).
    pub(crate) fn begin_run(&self) -> DependencySet {
        self.inner.depth.set(self.inner.depth.get() + 1);
        self.inner.run_count.set(self.inner.run_count.get() + 1);
        std::mem::take(&mut *self.inner.dependencies.borrow_mut())
    }

    /// Finish a run. `interrupted` is the set returned by the matching
    /// `begin_run` when the run was nested; its reads stay recorded since
    /// the interrupted run resumes with them.
    pub(crate) fn end_run(&self, interrupted: Option<&DependencySet>) {
        if let Some(outer) = interrupted {
            for signal in outer {
                self.record(*signal);
            }
        }
        self.inner.depth.set(self.inner.depth.get() - 1);
    }

    pub(crate) fn invoke(&self) {
        (self.inner.action)();
    }
}

impl PartialEq for Computation {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Computation {}

impl fmt::Debug for Computation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computation")
            .field("id", &self.inner.id)
            .field("dependencies", &self.inner.dependencies.borrow())
            .field("run_count", &self.run_count())
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ignores_repeated_reads() {
        let computation = Computation::new(ComputationId::new(0), || {});

        assert!(computation.record(SignalId::new(3)));
        assert!(computation.record(SignalId::new(1)));
        assert!(!computation.record(SignalId::new(3)));

        assert_eq!(
            computation.dependencies(),
            vec![SignalId::new(3), SignalId::new(1)]
        );
    }

    #[test]
    fn begin_run_starts_from_an_empty_set() {
        let computation = Computation::new(ComputationId::new(7), || {});
        computation.record(SignalId::new(0));

        let previous = computation.begin_run();

        assert_eq!(previous.as_slice(), &[SignalId::new(0)]);
        assert!(computation.dependencies().is_empty());
        assert!(computation.is_running());
        assert_eq!(computation.run_count(), 1);

        computation.end_run(None);
        assert!(!computation.is_running());
    }

    #[test]
    fn nested_run_restores_interrupted_reads() {
        let computation = Computation::new(ComputationId::new(2), || {});

        computation.begin_run();
        computation.record(SignalId::new(0));
        computation.record(SignalId::new(1));

        let interrupted = computation.begin_run();
        assert_eq!(computation.run_depth(), 2);
        computation.record(SignalId::new(1));
        computation.record(SignalId::new(2));
        computation.end_run(Some(&interrupted));

        assert_eq!(computation.run_depth(), 1);
        assert_eq!(
            computation.dependencies(),
            vec![SignalId::new(1), SignalId::new(2), SignalId::new(0)]
        );
    }

    #[test]
    fn clones_are_the_same_computation() {
        let a = Computation::new(ComputationId::new(1), || {});
        let b = a.clone();
        let c = Computation::new(ComputationId::new(1), || {});

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
