//! Application lifecycle state machine.
//!
//! `Uninitialized → Initialized → Running → (DestroyPending) → Destroyed`.
//! `DestroyPending` only exists while a frame is executing; it collapses to `Destroyed`
//! when that frame ends. A destroy requested between frames is queued: the state is kept
//! but every later transition fails with `Destroyed` until teardown runs.

use kiln_core::{KilnError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Running,
    /// Destroy was requested during the current frame
    DestroyPending,
    Destroyed,
}

/// What a destroy request turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyRequest {
    /// Teardown has run
    Now,
    /// Not inside a frame: teardown runs at the next lifecycle call
    Queued,
    /// Inside a frame: teardown runs once the frame completes
    Deferred,
    AlreadyDestroyed,
}

/// Lifecycle state plus the "inside a frame" and "destroy queued" flags
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
    in_frame: bool,
    destroy_queued: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            in_frame: false,
            destroy_queued: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    pub fn is_running(&self) -> bool {
        self.state == LifecycleState::Running
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroy_queued
            || matches!(
                self.state,
                LifecycleState::Destroyed | LifecycleState::DestroyPending
            )
    }

    /// Destroy was requested between frames and teardown has not run yet
    pub fn is_destroy_queued(&self) -> bool {
        self.destroy_queued
    }

    /// Fails with `Destroyed` once teardown has been requested or has run
    pub fn check_alive(&self) -> Result<()> {
        if self.is_destroyed() {
            return Err(KilnError::Destroyed);
        }
        Ok(())
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.check_alive()?;
        match self.state {
            LifecycleState::Uninitialized => {
                self.state = LifecycleState::Initialized;
                Ok(())
            }
            _ => Err(KilnError::AlreadyInitialized),
        }
    }

    pub fn start(&mut self) -> Result<()> {
        self.check_alive()?;
        match self.state {
            LifecycleState::Uninitialized => Err(KilnError::NotInitialized),
            LifecycleState::Initialized => {
                self.state = LifecycleState::Running;
                Ok(())
            }
            _ => Err(KilnError::AlreadyStarted),
        }
    }

    /// Enter a frame. Only a running application can tick.
    pub fn begin_frame(&mut self) -> Result<()> {
        self.check_alive()?;
        match self.state {
            LifecycleState::Uninitialized => Err(KilnError::NotInitialized),
            LifecycleState::Initialized => Err(KilnError::NotStarted),
            _ => {
                self.in_frame = true;
                Ok(())
            }
        }
    }

    /// Leave the frame. Returns true if a destroy was requested during it.
    pub fn end_frame(&mut self) -> bool {
        self.in_frame = false;
        self.state == LifecycleState::DestroyPending
    }

    pub fn request_destroy(&mut self) -> DestroyRequest {
        match self.state {
            LifecycleState::Destroyed => DestroyRequest::AlreadyDestroyed,
            LifecycleState::DestroyPending => DestroyRequest::Deferred,
            _ if self.in_frame => {
                self.state = LifecycleState::DestroyPending;
                DestroyRequest::Deferred
            }
            _ => {
                self.destroy_queued = true;
                DestroyRequest::Queued
            }
        }
    }

    /// Teardown finished
    pub fn mark_destroyed(&mut self) {
        self.state = LifecycleState::Destroyed;
        self.in_frame = false;
        self.destroy_queued = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.state(), LifecycleState::Uninitialized);
        lc.initialize().unwrap();
        lc.start().unwrap();
        assert!(lc.is_running());

        lc.begin_frame().unwrap();
        assert!(lc.in_frame());
        assert!(!lc.end_frame());
        assert!(!lc.in_frame());
    }

    #[test]
    fn test_ordering_errors() {
        let mut lc = Lifecycle::new();
        assert!(matches!(lc.start(), Err(KilnError::NotInitialized)));
        assert!(matches!(lc.begin_frame(), Err(KilnError::NotInitialized)));

        lc.initialize().unwrap();
        assert!(matches!(lc.initialize(), Err(KilnError::AlreadyInitialized)));
        assert!(matches!(lc.begin_frame(), Err(KilnError::NotStarted)));

        lc.start().unwrap();
        assert!(matches!(lc.start(), Err(KilnError::AlreadyStarted)));
        assert!(matches!(lc.initialize(), Err(KilnError::AlreadyInitialized)));
    }

    #[test]
    fn test_destroy_inside_frame_is_deferred() {
        let mut lc = Lifecycle::new();
        lc.initialize().unwrap();
        lc.start().unwrap();
        lc.begin_frame().unwrap();

        assert_eq!(lc.request_destroy(), DestroyRequest::Deferred);
        assert_eq!(lc.state(), LifecycleState::DestroyPending);
        assert_eq!(lc.request_destroy(), DestroyRequest::Deferred);
        assert!(lc.end_frame());
    }

    #[test]
    fn test_destroy_outside_frame() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.request_destroy(), DestroyRequest::Queued);
        assert!(lc.is_destroyed());
        assert_eq!(lc.state(), LifecycleState::Uninitialized);
        assert!(matches!(lc.initialize(), Err(KilnError::Destroyed)));
        assert_eq!(lc.request_destroy(), DestroyRequest::Queued);
        lc.mark_destroyed();
        assert!(!lc.is_destroy_queued());

        assert_eq!(lc.request_destroy(), DestroyRequest::AlreadyDestroyed);
        assert!(matches!(lc.initialize(), Err(KilnError::Destroyed)));
        assert!(matches!(lc.start(), Err(KilnError::Destroyed)));
        assert!(matches!(lc.begin_frame(), Err(KilnError::Destroyed)));
    }
}
