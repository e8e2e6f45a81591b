// crates/engine_core/src/input/map.rs
use std::collections::HashMap;

use engine_shared::Action;

/// Key name (as reported by the platform, e.g. "w", "ArrowLeft") to action.
/// A key maps to at most one action; several keys may share one.
#[derive(Default, Clone)]
pub struct InputMap {
    key_bindings: HashMap<String, Action>,
}

impl InputMap {
    pub fn bind(&mut self, key: impl Into<String>, action: Action) {
        self.key_bindings.insert(key.into(), action);
    }

    pub fn unbind(&mut self, key: &str) -> Option<Action> {
        self.key_bindings.remove(key)
    }

    pub fn map_signal_to_intent(&self, key: &str) -> Option<Action> {
        self.key_bindings.get(key).copied()
    }

    pub fn keys_for(&self, action: Action) -> impl Iterator<Item = &str> {
        self.key_bindings
            .iter()
            .filter(move |(_, a)| **a == action)
            .map(|(k, _)| k.as_str())
    }
}
