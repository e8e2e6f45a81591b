// crates/engine_shared/src/input_types.rs
//! Compact input types shared between the host poller and gameplay components.

use std::cell::RefCell;
use std::rc::Rc;

/// Stable integer id for actions (bit index in the digital mask).
pub type ActionId = u32;

/// Gameplay intents. The discriminant is the bit used in [`InputState`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    Shoot = 4,
    Reload = 5,
    Use = 6,
    LookLeft = 7,
    LookRight = 8,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Shoot,
        Action::Reload,
        Action::Use,
        Action::LookLeft,
        Action::LookRight,
    ];

    pub fn id(self) -> ActionId {
        self as ActionId
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
            Action::Shoot => "shoot",
            Action::Reload => "reload",
            Action::Use => "use",
            Action::LookLeft => "look_left",
            Action::LookRight => "look_right",
        }
    }

    pub fn from_name(name: &str) -> Option<Action> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    fn bit(self) -> u64 {
        1u64 << self.id()
    }
}

/// Per-frame input snapshot.
///
/// Held actions live in a bitmask. `latched_mask` remembers which held
/// actions were already reported as freshly pressed, so each press edge is
/// observed exactly once no matter how many frames the key stays down.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    digital_mask: u64,
    latched_mask: u64,
    pointer_held: bool,
    pointer_dx: f32,
}

pub type SharedInput = Rc<RefCell<InputState>>;

impl InputState {
    pub fn shared() -> SharedInput {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn set_held(&mut self, action: Action, held: bool) {
        if held {
            self.digital_mask |= action.bit();
        } else {
            self.digital_mask &= !action.bit();
            self.latched_mask &= !action.bit();
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        (self.digital_mask & action.bit()) != 0
    }

    /// True once per press: the first query while held, false afterwards
    /// until the action is released and pressed again.
    pub fn is_freshly_pressed(&mut self, action: Action) -> bool {
        if self.is_held(action) && (self.latched_mask & action.bit()) == 0 {
            self.latched_mask |= action.bit();
            return true;
        }
        false
    }

    pub fn set_pointer_held(&mut self, held: bool) {
        self.pointer_held = held;
    }

    pub fn pointer_held(&self) -> bool {
        self.pointer_held
    }

    /// Pointer motion only counts while a button is held (drag to look).
    pub fn push_pointer_delta(&mut self, dx: f32) {
        if self.pointer_held {
            self.pointer_dx += dx;
        }
    }

    pub fn take_pointer_delta(&mut self) -> f32 {
        std::mem::take(&mut self.pointer_dx)
    }

    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_press_reports_once_per_edge() {
        let mut input = InputState::default();
        assert!(!input.is_freshly_pressed(Action::Shoot));

        input.set_held(Action::Shoot, true);
        assert!(input.is_freshly_pressed(Action::Shoot));
        assert!(!input.is_freshly_pressed(Action::Shoot));
        assert!(input.is_held(Action::Shoot));

        input.set_held(Action::Shoot, false);
        input.set_held(Action::Shoot, true);
        assert!(input.is_freshly_pressed(Action::Shoot));
    }

    #[test]
    fn pointer_delta_requires_held_button() {
        let mut input = InputState::default();
        input.push_pointer_delta(10.0);
        assert_eq!(input.take_pointer_delta(), 0.0);

        input.set_pointer_held(true);
        input.push_pointer_delta(10.0);
        input.push_pointer_delta(-4.0);
        assert_eq!(input.take_pointer_delta(), 6.0);
        assert_eq!(input.take_pointer_delta(), 0.0);
    }

    #[test]
    fn action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("jump"), None);
    }
}
