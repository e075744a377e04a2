//! Keyboard input state
//!
//! The host feeds raw key events in; entities read logical "held" flags out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Logical actions the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Fire,
}

/// Maps raw key codes to actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    keys: HashMap<u32, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        // Arrow left, arrow right, space
        Self::new([(37, Action::Left), (39, Action::Right), (32, Action::Fire)])
    }
}

impl KeyBindings {
    pub fn new(bindings: impl IntoIterator<Item = (u32, Action)>) -> Self {
        Self {
            keys: bindings.into_iter().collect(),
        }
    }

    pub fn action(&self, key_code: u32) -> Option<Action> {
        self.keys.get(&key_code).copied()
    }
}

/// Which actions are currently held down
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashMap<Action, bool>,
    bindings: KeyBindings,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            held: HashMap::new(),
            bindings,
        }
    }

    /// Record a key transition.
    ///
    /// Returns `true` if the key is bound, meaning the host should swallow
    /// the event instead of passing it on.
    pub fn handle_key(&mut self, key_code: u32, pressed: bool) -> bool {
        match self.bindings.action(key_code) {
            Some(action) => {
                self.set(action, pressed);
                true
            }
            None => false,
        }
    }

    pub fn set(&mut self, action: Action, held: bool) {
        self.held.insert(action, held);
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.get(&action).copied().unwrap_or(false)
    }

    /// Release everything
    pub fn clear(&mut self) {
        self.held.clear();
    }
}
