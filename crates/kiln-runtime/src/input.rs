//! Input devices snapshotted once per frame

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// A device whose state is latched at the start of each frame's update phase
pub trait InputDevice {
    fn name(&self) -> &str;

    /// Apply the events received since the previous frame
    fn update(&mut self);

    /// Detach from the event source; called once on application destroy
    fn release(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyEvent {
    Down(String),
    Up(String),
}

#[derive(Debug, Default)]
struct KeyboardState {
    /// Events received since the last update
    queue: Vec<KeyEvent>,
    /// Keys currently held down
    keys_down: HashSet<String>,
    /// Keys pressed this frame
    keys_just_pressed: HashSet<String>,
    /// Keys released this frame
    keys_just_released: HashSet<String>,
    /// Action map: action name -> list of key bindings
    action_map: HashMap<String, Vec<String>>,
    released: bool,
}

/// Keyboard with named action bindings.
///
/// Clones share state: the windowing layer feeds events into one clone while systems
/// query another.
#[derive(Debug, Clone, Default)]
pub struct KeyboardInput {
    state: Rc<RefCell<KeyboardState>>,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an action to one or more keys
    pub fn bind_action(&self, action: impl Into<String>, keys: &[&str]) {
        self.state
            .borrow_mut()
            .action_map
            .insert(action.into(), keys.iter().map(|k| k.to_string()).collect());
    }

    /// Queue a key press event
    pub fn key_down(&self, key: &str) {
        let mut state = self.state.borrow_mut();
        if !state.released {
            state.queue.push(KeyEvent::Down(key.to_string()));
        }
    }

    /// Queue a key release event
    pub fn key_up(&self, key: &str) {
        let mut state = self.state.borrow_mut();
        if !state.released {
            state.queue.push(KeyEvent::Up(key.to_string()));
        }
    }

    /// Is a key currently held down?
    pub fn is_key_down(&self, key: &str) -> bool {
        self.state.borrow().keys_down.contains(key)
    }

    /// Was a key pressed this frame?
    pub fn is_key_just_pressed(&self, key: &str) -> bool {
        self.state.borrow().keys_just_pressed.contains(key)
    }

    pub fn is_key_just_released(&self, key: &str) -> bool {
        self.state.borrow().keys_just_released.contains(key)
    }

    /// Is an action currently held? (any bound key is down)
    pub fn is_action_pressed(&self, action: &str) -> bool {
        let state = self.state.borrow();
        state
            .action_map
            .get(action)
            .is_some_and(|keys| keys.iter().any(|k| state.keys_down.contains(k)))
    }

    /// Was an action just pressed this frame?
    pub fn is_action_just_pressed(&self, action: &str) -> bool {
        let state = self.state.borrow();
        state
            .action_map
            .get(action)
            .is_some_and(|keys| keys.iter().any(|k| state.keys_just_pressed.contains(k)))
    }
}

impl InputDevice for KeyboardInput {
    fn name(&self) -> &str {
        "keyboard"
    }

    fn update(&mut self) {
        let mut state = self.state.borrow_mut();
        state.keys_just_pressed.clear();
        state.keys_just_released.clear();

        let events = std::mem::take(&mut state.queue);
        for event in events {
            match event {
                KeyEvent::Down(key) => {
                    if state.keys_down.insert(key.clone()) {
                        state.keys_just_pressed.insert(key);
                    }
                }
                KeyEvent::Up(key) => {
                    state.keys_down.remove(&key);
                    state.keys_just_released.insert(key);
                }
            }
        }
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        state.released = true;
        state.queue.clear();
        state.keys_down.clear();
        state.keys_just_pressed.clear();
        state.keys_just_released.clear();
    }
}
