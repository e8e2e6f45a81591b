// crates/engine_core/src/input/config.rs

use engine_shared::Action;
use tracing::warn;

use crate::input::InputMap;

/// Centralized defaults for input configuration.
pub struct InputDefaults;

impl InputDefaults {
    pub const BINDINGS: [(&'static str, Action); 9] = [
        ("w", Action::Up),
        ("s", Action::Down),
        ("a", Action::Left),
        ("d", Action::Right),
        (" ", Action::Shoot),
        ("r", Action::Reload),
        ("e", Action::Use),
        ("ArrowLeft", Action::LookLeft),
        ("ArrowRight", Action::LookRight),
    ];

    pub fn setup(input_map: &mut InputMap) {
        for (key, action) in Self::BINDINGS {
            input_map.bind(key, action);
        }
    }

    pub fn input_map() -> InputMap {
        let mut map = InputMap::default();
        Self::setup(&mut map);
        map
    }

    /// Applies `key = action` overrides on top of the defaults. Unknown
    /// action names are skipped.
    pub fn apply_overrides<'a>(
        input_map: &mut InputMap,
        overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) {
        for (key, name) in overrides {
            match Action::from_name(name) {
                Some(action) => input_map.bind(key, action),
                None => warn!(key, action = name, "unknown action in key binding"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_has_a_default_key() {
        let map = InputDefaults::input_map();
        for action in Action::ALL {
            assert!(map.keys_for(action).next().is_some(), "{action:?} unbound");
        }
        assert_eq!(map.map_signal_to_intent("w"), Some(Action::Up));
        assert_eq!(map.map_signal_to_intent("q"), None);
    }

    #[test]
    fn overrides_rebind_and_skip_unknown_actions() {
        let mut map = InputDefaults::input_map();
        InputDefaults::apply_overrides(&mut map, [("z", "up"), ("x", "jump")]);
        assert_eq!(map.map_signal_to_intent("z"), Some(Action::Up));
        assert_eq!(map.map_signal_to_intent("x"), None);
    }
}
