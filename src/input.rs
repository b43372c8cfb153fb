//! Held-key input state
//!
//! The simulation only ever asks "is this key down right now?". Edge
//! detection, where needed, is done by the reader.

use std::collections::HashSet;

/// Logical keys the game listens to (DOM `KeyboardEvent.code` names)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    KeyA,
    KeyD,
    KeyW,
    KeyS,
    KeyF,
    KeyJ,
    KeyK,
    KeyG,
    Space,
}

impl KeyCode {
    /// Map a DOM key code; codes outside the allow-list yield `None`
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "ArrowLeft" => KeyCode::ArrowLeft,
            "ArrowRight" => KeyCode::ArrowRight,
            "ArrowUp" => KeyCode::ArrowUp,
            "ArrowDown" => KeyCode::ArrowDown,
            "KeyA" => KeyCode::KeyA,
            "KeyD" => KeyCode::KeyD,
            "KeyW" => KeyCode::KeyW,
            "KeyS" => KeyCode::KeyS,
            "KeyF" => KeyCode::KeyF,
            "KeyJ" => KeyCode::KeyJ,
            "KeyK" => KeyCode::KeyK,
            "KeyG" => KeyCode::KeyG,
            "Space" => KeyCode::Space,
            _ => return None,
        })
    }
}

/// Player intents and the keys bound to them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Shoot,
    Grenade,
}

impl Action {
    pub fn bindings(&self) -> &'static [KeyCode] {
        match self {
            Action::MoveLeft => &[KeyCode::ArrowLeft, KeyCode::KeyA],
            Action::MoveRight => &[KeyCode::ArrowRight, KeyCode::KeyD],
            Action::Jump => &[KeyCode::ArrowUp, KeyCode::KeyW, KeyCode::Space],
            Action::Shoot => &[KeyCode::KeyF, KeyCode::KeyJ],
            Action::Grenade => &[KeyCode::KeyK, KeyCode::KeyG],
        }
    }
}

/// Set of currently held keys
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns false for codes the game ignores.
    pub fn key_down(&mut self, code: &str) -> bool {
        match KeyCode::from_code(code) {
            Some(key) => {
                self.keys.insert(key);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(key) = KeyCode::from_code(code) {
            self.keys.remove(&key);
        }
    }

    pub fn press(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn is_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// True while any key bound to `action` is held
    pub fn action_down(&self, action: Action) -> bool {
        action.bindings().iter().any(|key| self.is_down(*key))
    }

    /// Drop every held key (focus loss)
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
