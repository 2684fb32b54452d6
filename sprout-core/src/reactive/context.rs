//! Tracking Context
//!
//! The tracking context records which computation is currently running.
//! This enables automatic dependency tracking: when a signal is read, the
//! computation on top of the stack becomes one of its subscribers.
//!
//! # Implementation
//!
//! Each [`Runtime`](super::Runtime) owns one stack. Running a computation
//! pushes a frame; the frame is popped when the returned guard is dropped,
//! which also happens while unwinding out of a panicking action, so the
//! stack never keeps a stale frame.
//!
//! Nested runs (a computation that creates another one) push on top of the
//! outer frame, and reads always attribute to the innermost frame. An
//! untracked frame hides every outer frame from reads.

use std::cell::RefCell;

use super::computation::Computation;

/// The tracking-frame stack of one runtime.
#[derive(Debug, Default)]
pub(crate) struct TrackingStack {
    /// `None` frames come from `untrack` and swallow reads.
    frames: RefCell<Vec<Option<Computation>>>,
}

impl TrackingStack {
    /// Enter a frame for `computation`.
    pub(crate) fn enter(&self, computation: Computation) -> FrameGuard<'_> {
        self.frames.borrow_mut().push(Some(computation));
        FrameGuard { stack: self }
    }

    /// Enter a frame that attributes reads to nothing.
    pub(crate) fn enter_untracked(&self) -> FrameGuard<'_> {
        self.frames.borrow_mut().push(None);
        FrameGuard { stack: self }
    }

    /// The computation that reads currently attribute to, if any.
    pub(crate) fn current(&self) -> Option<Computation> {
        self.frames.borrow().last().cloned().flatten()
    }

    /// Number of frames on the stack, untracked frames included.
    pub(crate) fn depth(&self) -> usize {
        self.frames.borrow().len()
    }
}

/// Pops its frame when dropped.
pub(crate) struct FrameGuard<'a> {
    stack: &'a TrackingStack,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        let popped = self.stack.frames.borrow_mut().pop();
        debug_assert!(popped.is_some(), "tracking stack underflow");
    }
}
