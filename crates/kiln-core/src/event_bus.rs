//! Event bus for queued notifications

/// A simple event queue that producers push to and consumers drain
///
/// Used where events are produced at one point in time and handled later on the
/// same thread, e.g. provider notifications that are routed between frames.
pub struct EventBus<T> {
    events: Vec<T>,
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventBus<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event onto the bus
    pub fn push(&mut self, event: T) {
        self.events.push(event);
    }

    /// Drain all events from the bus, returning them in push order
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.events)
    }

    /// Pending events, oldest first
    pub fn pending(&self) -> &[T] {
        &self.events
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.events.len()
    }
}
