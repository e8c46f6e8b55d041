//! Keyboard state table fed by the window layer.

use std::collections::HashMap;

/// Current key-down state keyed by normalized (lower-cased) key name.
///
/// A pure state table, not an event queue: the local avatar samples it
/// once per frame, so taps shorter than a frame are only visible if they
/// straddle an update.
#[derive(Debug, Default)]
pub struct InputTracker {
    keys: HashMap<String, bool>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition. Key names are normalized to lower case.
    pub fn set_key(&mut self, name: &str, pressed: bool) {
        self.keys.insert(name.to_lowercase(), pressed);
    }

    /// An absent key means "not pressed", never an error.
    pub fn is_pressed(&self, name: &str) -> bool {
        self.keys.get(name).copied().unwrap_or(false)
    }
}
