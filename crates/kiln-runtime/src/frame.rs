//! External frame-request primitive

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Handle of one scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub u64);

/// Something that calls back once per display refresh (e.g. requestAnimationFrame or a
/// vsync'd event loop)
pub trait FrameRequestSource {
    /// Schedule the next frame callback
    fn request(&mut self) -> FrameHandle;

    /// Cancel a scheduled callback. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct ManualState {
    next: u64,
    outstanding: BTreeSet<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

/// Frame source driven by hand, for headless runs and tests.
///
/// Clones share state, so a test can keep one clone to inspect what the application
/// scheduled.
#[derive(Debug, Clone, Default)]
pub struct ManualFrameSource {
    state: Rc<RefCell<ManualState>>,
}

impl ManualFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests scheduled and not yet cancelled or fired
    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding.len()
    }

    /// The pending request, if any
    pub fn pending(&self) -> Option<FrameHandle> {
        self.state.borrow().outstanding.iter().next_back().copied()
    }

    /// Consume the pending request as if the display fired it
    pub fn fire(&self) -> Option<FrameHandle> {
        let mut state = self.state.borrow_mut();
        let handle = state.outstanding.iter().next_back().copied()?;
        state.outstanding.remove(&handle);
        Some(handle)
    }

    pub fn total_requested(&self) -> u64 {
        self.state.borrow().requested
    }

    pub fn total_cancelled(&self) -> u64 {
        self.state.borrow().cancelled
    }
}

impl FrameRequestSource for ManualFrameSource {
    fn request(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        state.requested += 1;
        let handle = FrameHandle(state.next);
        state.outstanding.insert(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        if state.outstanding.remove(&handle) {
            state.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_cancel() {
        let mut source = ManualFrameSource::new();
        let observer = source.clone();

        let a = source.request();
        let b = source.request();
        assert_ne!(a, b);
        assert_eq!(observer.outstanding(), 2);

        source.cancel(a);
        source.cancel(a);
        assert_eq!(observer.outstanding(), 1);
        assert_eq!(observer.total_cancelled(), 1);
        assert_eq!(observer.pending(), Some(b));
    }

    #[test]
    fn test_fire_consumes_pending() {
        let mut source = ManualFrameSource::new();
        let handle = source.request();
        assert_eq!(source.fire(), Some(handle));
        assert_eq!(source.fire(), None);
        assert_eq!(source.outstanding(), 0);
    }
}
