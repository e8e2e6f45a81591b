// crates/engine_core/src/input/poller.rs

use engine_shared::{Action, SharedInput};

use crate::input::InputMap;

/// Raw device events, already stripped of platform types.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    PointerDown,
    PointerUp,
    PointerMoved { dx: f32 },
    /// Window lost focus: everything counts as released.
    FocusLost,
}

/// Low-level input collector that tracks active keys.
/// This keeps raw device state out of the frame driver.
pub struct InputPoller {
    active_keys: Vec<String>,
    input_map: InputMap,
    state: SharedInput,
}

impl InputPoller {
    pub fn new(input_map: InputMap, state: SharedInput) -> Self {
        Self {
            active_keys: Vec::new(),
            input_map,
            state,
        }
    }

    pub fn state(&self) -> SharedInput {
        self.state.clone()
    }

    /// Process a single event and update internal key state. Key repeats
    /// are ignored.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                if !self.active_keys.contains(key) {
                    self.active_keys.push(key.clone());
                }
            }
            InputEvent::KeyUp(key) => self.active_keys.retain(|k| k != key),
            InputEvent::PointerDown => self.state.borrow_mut().set_pointer_held(true),
            InputEvent::PointerUp => self.state.borrow_mut().set_pointer_held(false),
            InputEvent::PointerMoved { dx } => self.state.borrow_mut().push_pointer_delta(*dx),
            InputEvent::FocusLost => {
                self.active_keys.clear();
                self.state.borrow_mut().release_all();
            }
        }
    }

    /// Returns true if a given key is currently pressed.
    pub fn is_key_active(&self, key: &str) -> bool {
        self.active_keys.iter().any(|k| k == key)
    }

    /// Sync raw key state into the shared action state using the input map.
    pub fn synchronize(&self) {
        let mut state = self.state.borrow_mut();
        for action in Action::ALL {
            let held = self
                .active_keys
                .iter()
                .any(|k| self.input_map.map_signal_to_intent(k) == Some(action));
            state.set_held(action, held);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputDefaults;
    use engine_shared::InputState;

    fn poller() -> InputPoller {
        InputPoller::new(InputDefaults::input_map(), InputState::shared())
    }

    #[test]
    fn keys_become_held_actions_on_sync() {
        let mut poller = poller();
        poller.handle_event(&InputEvent::KeyDown("w".into()));
        poller.handle_event(&InputEvent::KeyDown("q".into()));
        assert!(!poller.state().borrow().is_held(Action::Up));

        poller.synchronize();
        let state = poller.state();
        assert!(state.borrow().is_held(Action::Up));
        assert!(!state.borrow().is_held(Action::Down));

        poller.handle_event(&InputEvent::KeyUp("w".into()));
        poller.synchronize();
        assert!(!state.borrow().is_held(Action::Up));
    }

    #[test]
    fn repeated_key_down_is_one_press() {
        let mut poller = poller();
        let state = poller.state();
        poller.handle_event(&InputEvent::KeyDown(" ".into()));
        poller.synchronize();
        assert!(state.borrow_mut().is_freshly_pressed(Action::Shoot));

        poller.handle_event(&InputEvent::KeyDown(" ".into()));
        poller.synchronize();
        assert!(!state.borrow_mut().is_freshly_pressed(Action::Shoot));

        poller.handle_event(&InputEvent::KeyUp(" ".into()));
        poller.synchronize();
        poller.handle_event(&InputEvent::KeyDown(" ".into()));
        poller.synchronize();
        assert!(state.borrow_mut().is_freshly_pressed(Action::Shoot));
    }

    #[test]
    fn drag_accumulates_pointer_delta() {
        let mut poller = poller();
        let state = poller.state();
        poller.handle_event(&InputEvent::PointerMoved { dx: 5.0 });
        poller.handle_event(&InputEvent::PointerDown);
        poller.handle_event(&InputEvent::PointerMoved { dx: 20.0 });
        assert_eq!(state.borrow_mut().take_pointer_delta(), 20.0);

        poller.handle_event(&InputEvent::FocusLost);
        assert!(!state.borrow().pointer_held());
        assert!(!poller.is_key_active("w"));
    }
}
