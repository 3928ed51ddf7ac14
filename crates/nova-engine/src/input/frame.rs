use std::collections::HashSet;

use super::types::Key;

/// Key transitions that happened since the last frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn was_released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }
}
