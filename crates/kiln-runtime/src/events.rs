//! Lifecycle events and a small publish/subscribe emitter

use crate::app::AppHandle;
use std::collections::HashMap;
use std::hash::Hash;

/// Events fired by the application over its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Start,
    Initialize,
    PostInitialize,
    FrameUpdate,
    Update,
    FrameRender,
    PreRender,
    PostRender,
    FrameEnd,
    Destroy,
}

/// Payload carried by every lifecycle event
#[derive(Debug, Clone)]
pub struct FrameEvent {
    /// Raw timestamp passed to the tick
    pub timestamp: f64,
    /// Clamped, scaled delta in seconds
    pub dt: f64,
    /// Raw elapsed milliseconds since the previous tick
    pub ms: f64,
    /// Index of the current frame
    pub frame: u64,
    pub app: AppHandle,
}

pub type ListenerId = u64;

struct Listener<A> {
    id: ListenerId,
    once: bool,
    callback: Box<dyn FnMut(&A)>,
}

/// Named-event emitter. Listeners run in registration order.
pub struct EventEmitter<E, A> {
    listeners: HashMap<E, Vec<Listener<A>>>,
    next_id: ListenerId,
}

impl<E: Copy + Eq + Hash, A> Default for EventEmitter<E, A> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<E: Copy + Eq + Hash, A> EventEmitter<E, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `event`
    pub fn on(&mut self, event: E, callback: impl FnMut(&A) + 'static) -> ListenerId {
        self.add(event, false, Box::new(callback))
    }

    /// Subscribe to the next firing of `event` only
    pub fn once(&mut self, event: E, callback: impl FnMut(&A) + 'static) -> ListenerId {
        self.add(event, true, Box::new(callback))
    }

    /// Remove one listener. Returns false if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(index) = list.iter().position(|l| l.id == id) {
                list.remove(index);
                return true;
            }
        }
        false
    }

    /// Remove every listener of one event
    pub fn off_event(&mut self, event: E) {
        self.listeners.remove(&event);
    }

    pub fn off_all(&mut self) {
        self.listeners.clear();
    }

    /// Call every listener of `event`. Returns how many ran.
    pub fn fire(&mut self, event: E, args: &A) -> usize {
        let Some(list) = self.listeners.get_mut(&event) else {
            return 0;
        };
        for listener in list.iter_mut() {
            (listener.callback)(args);
        }
        let count = list.len();
        list.retain(|l| !l.once);
        count
    }

    pub fn has_listeners(&self, event: E) -> bool {
        self.listeners.get(&event).is_some_and(|l| !l.is_empty())
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    fn add(&mut self, event: E, once: bool, callback: Box<dyn FnMut(&A)>) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.entry(event).or_default().push(Listener { id, once, callback });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Ev {
        A,
        B,
    }

    #[test]
    fn test_on_and_fire_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter: EventEmitter<Ev, u32> = EventEmitter::new();
        let s1 = Rc::clone(&seen);
        emitter.on(Ev::A, move |v| s1.borrow_mut().push(("first", *v)));
        let s2 = Rc::clone(&seen);
        emitter.on(Ev::A, move |v| s2.borrow_mut().push(("second", *v)));

        assert_eq!(emitter.fire(Ev::A, &7), 2);
        assert_eq!(emitter.fire(Ev::B, &7), 0);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_once_runs_once() {
        let count = Rc::new(RefCell::new(0));
        let mut emitter: EventEmitter<Ev, ()> = EventEmitter::new();
        let c = Rc::clone(&count);
        emitter.once(Ev::A, move |_| *c.borrow_mut() += 1);

        emitter.fire(Ev::A, &());
        emitter.fire(Ev::A, &());
        assert_eq!(*count.borrow(), 1);
        assert!(!emitter.has_listeners(Ev::A));
    }

    #[test]
    fn test_off() {
        let mut emitter: EventEmitter<Ev, ()> = EventEmitter::new();
        let a = emitter.on(Ev::A, |_| {});
        emitter.on(Ev::B, |_| {});
        emitter.on(Ev::B, |_| {});

        assert!(emitter.off(a));
        assert!(!emitter.off(a));
        assert_eq!(emitter.listener_count(), 2);

        emitter.off_event(Ev::B);
        assert_eq!(emitter.listener_count(), 0);

        emitter.on(Ev::A, |_| {});
        emitter.off_all();
        assert!(!emitter.has_listeners(Ev::A));
    }
}
