use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

/// Logical actions a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyBinding {
    Up,
    Down,
    Left,
    Right,
    Fire1,
    Fire2,
    Fire3,
    Fire4,
    Pause,
    Quit,
    Reset,
    Screenshot,
    Debug,
    Fullscreen,
}

pub const BINDING_COUNT: usize = 14;

impl KeyBinding {
    pub const ALL: [KeyBinding; BINDING_COUNT] = [
        KeyBinding::Up,
        KeyBinding::Down,
        KeyBinding::Left,
        KeyBinding::Right,
        KeyBinding::Fire1,
        KeyBinding::Fire2,
        KeyBinding::Fire3,
        KeyBinding::Fire4,
        KeyBinding::Pause,
        KeyBinding::Quit,
        KeyBinding::Reset,
        KeyBinding::Screenshot,
        KeyBinding::Debug,
        KeyBinding::Fullscreen,
    ];

    pub(crate) const fn index(self) -> usize {
        match self {
            KeyBinding::Up => 0,
            KeyBinding::Down => 1,
            KeyBinding::Left => 2,
            KeyBinding::Right => 3,
            KeyBinding::Fire1 => 4,
            KeyBinding::Fire2 => 5,
            KeyBinding::Fire3 => 6,
            KeyBinding::Fire4 => 7,
            KeyBinding::Pause => 8,
            KeyBinding::Quit => 9,
            KeyBinding::Reset => 10,
            KeyBinding::Screenshot => 11,
            KeyBinding::Debug => 12,
            KeyBinding::Fullscreen => 13,
        }
    }
}

/// Flat per-action pressed-state table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionStates {
    down: [bool; BINDING_COUNT],
}

impl ActionStates {
    pub fn set(&mut self, binding: KeyBinding, is_down: bool) {
        self.down[binding.index()] = is_down;
    }

    pub fn is_down(&self, binding: KeyBinding) -> bool {
        self.down[binding.index()]
    }
}

/// What one frame of the loop sees of the keyboard: held state for every
/// binding plus single-frame pressed edges for the toggle-style actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    pressed: [bool; BINDING_COUNT],
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        pressed: [bool; BINDING_COUNT],
    ) -> Self {
        Self {
            quit_requested,
            actions,
            pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, binding: KeyBinding) -> bool {
        self.actions.is_down(binding)
    }

    /// True only on the frame the key went down.
    pub fn was_pressed(&self, binding: KeyBinding) -> bool {
        self.pressed[binding.index()]
    }

    pub fn with_action_down(mut self, binding: KeyBinding, is_down: bool) -> Self {
        self.actions.set(binding, is_down);
        self
    }

    pub fn with_pressed(mut self, binding: KeyBinding) -> Self {
        self.pressed[binding.index()] = true;
        self.actions.set(binding, true);
        self
    }
}

/// Binding -> physical key map with the original framework's defaults.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<KeyBinding, KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert(KeyBinding::Up, KeyCode::ArrowUp);
        map.insert(KeyBinding::Down, KeyCode::ArrowDown);
        map.insert(KeyBinding::Left, KeyCode::ArrowLeft);
        map.insert(KeyBinding::Right, KeyCode::ArrowRight);
        map.insert(KeyBinding::Fire1, KeyCode::Numpad0);
        map.insert(KeyBinding::Fire2, KeyCode::Numpad1);
        map.insert(KeyBinding::Fire3, KeyCode::Numpad2);
        map.insert(KeyBinding::Fire4, KeyCode::Numpad3);
        map.insert(KeyBinding::Pause, KeyCode::KeyP);
        map.insert(KeyBinding::Quit, KeyCode::Escape);
        map.insert(KeyBinding::Reset, KeyCode::Delete);
        map.insert(KeyBinding::Screenshot, KeyCode::F3);
        map.insert(KeyBinding::Debug, KeyCode::KeyD);
        map.insert(KeyBinding::Fullscreen, KeyCode::F11);
        Self { map }
    }
}

impl KeyBindings {
    pub fn bind(&mut self, binding: KeyBinding, code: KeyCode) {
        self.map.insert(binding, code);
    }

    pub fn code_for(&self, binding: KeyBinding) -> Option<KeyCode> {
        self.map.get(&binding).copied()
    }

    pub fn binding_for(&self, code: KeyCode) -> Option<KeyBinding> {
        self.map
            .iter()
            .find(|(_, bound)| **bound == code)
            .map(|(binding, _)| *binding)
    }

    /// Stable string form for persistence.
    pub fn to_names(&self) -> HashMap<KeyBinding, String> {
        self.map
            .iter()
            .map(|(binding, code)| (*binding, key_code_name(*code).to_string()))
            .collect()
    }

    /// Rebuild from persisted names on top of the defaults; unknown names
    /// leave the default binding in place.
    pub fn from_names(names: &HashMap<KeyBinding, String>) -> Self {
        let mut bindings = Self::default();
        for (binding, name) in names {
            if let Some(code) = key_code_from_name(name) {
                bindings.bind(*binding, code);
            }
        }
        bindings
    }
}

/// The keys this engine knows how to persist by name.
const SUPPORTED_KEYS: &[(&str, KeyCode)] = &[
    ("A", KeyCode::KeyA),
    ("B", KeyCode::KeyB),
    ("C", KeyCode::KeyC),
    ("D", KeyCode::KeyD),
    ("E", KeyCode::KeyE),
    ("F", KeyCode::KeyF),
    ("G", KeyCode::KeyG),
    ("H", KeyCode::KeyH),
    ("I", KeyCode::KeyI),
    ("J", KeyCode::KeyJ),
    ("K", KeyCode::KeyK),
    ("L", KeyCode::KeyL),
    ("M", KeyCode::KeyM),
    ("N", KeyCode::KeyN),
    ("O", KeyCode::KeyO),
    ("P", KeyCode::KeyP),
    ("Q", KeyCode::KeyQ),
    ("R", KeyCode::KeyR),
    ("S", KeyCode::KeyS),
    ("T", KeyCode::KeyT),
    ("U", KeyCode::KeyU),
    ("V", KeyCode::KeyV),
    ("W", KeyCode::KeyW),
    ("X", KeyCode::KeyX),
    ("Y", KeyCode::KeyY),
    ("Z", KeyCode::KeyZ),
    ("0", KeyCode::Digit0),
    ("1", KeyCode::Digit1),
    ("2", KeyCode::Digit2),
    ("3", KeyCode::Digit3),
    ("4", KeyCode::Digit4),
    ("5", KeyCode::Digit5),
    ("6", KeyCode::Digit6),
    ("7", KeyCode::Digit7),
    ("8", KeyCode::Digit8),
    ("9", KeyCode::Digit9),
    ("Numpad0", KeyCode::Numpad0),
    ("Numpad1", KeyCode::Numpad1),
    ("Numpad2", KeyCode::Numpad2),
    ("Numpad3", KeyCode::Numpad3),
    ("Numpad4", KeyCode::Numpad4),
    ("Numpad5", KeyCode::Numpad5),
    ("Numpad6", KeyCode::Numpad6),
    ("Numpad7", KeyCode::Numpad7),
    ("Numpad8", KeyCode::Numpad8),
    ("Numpad9", KeyCode::Numpad9),
    ("F1", KeyCode::F1),
    ("F2", KeyCode::F2),
    ("F3", KeyCode::F3),
    ("F4", KeyCode::F4),
    ("F5", KeyCode::F5),
    ("F6", KeyCode::F6),
    ("F7", KeyCode::F7),
    ("F8", KeyCode::F8),
    ("F9", KeyCode::F9),
    ("F10", KeyCode::F10),
    ("F11", KeyCode::F11),
    ("F12", KeyCode::F12),
    ("Up", KeyCode::ArrowUp),
    ("Down", KeyCode::ArrowDown),
    ("Left", KeyCode::ArrowLeft),
    ("Right", KeyCode::ArrowRight),
    ("Space", KeyCode::Space),
    ("Enter", KeyCode::Enter),
    ("Tab", KeyCode::Tab),
    ("Escape", KeyCode::Escape),
    ("Delete", KeyCode::Delete),
    ("Backspace", KeyCode::Backspace),
];

pub fn key_code_name(code: KeyCode) -> &'static str {
    SUPPORTED_KEYS
        .iter()
        .find(|(_, candidate)| *candidate == code)
        .map(|(name, _)| *name)
        .unwrap_or("Unknown")
}

pub fn key_code_from_name(name: &str) -> Option<KeyCode> {
    SUPPORTED_KEYS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_follow_original_layout() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.code_for(KeyBinding::Quit), Some(KeyCode::Escape));
        assert_eq!(bindings.code_for(KeyBinding::Pause), Some(KeyCode::KeyP));
        assert_eq!(bindings.code_for(KeyBinding::Fire1), Some(KeyCode::Numpad0));
        assert_eq!(bindings.code_for(KeyBinding::Screenshot), Some(KeyCode::F3));
        assert_eq!(bindings.code_for(KeyBinding::Fullscreen), Some(KeyCode::F11));
    }

    #[test]
    fn binding_lookup_is_the_inverse_of_code_lookup() {
        let bindings = KeyBindings::default();
        for binding in KeyBinding::ALL {
            let code = bindings.code_for(binding).expect("bound");
            assert_eq!(bindings.binding_for(code), Some(binding));
        }
    }

    #[test]
    fn every_default_binding_has_a_persistable_name() {
        let bindings = KeyBindings::default();
        for binding in KeyBinding::ALL {
            let code = bindings.code_for(binding).expect("bound");
            assert_ne!(key_code_name(code), "Unknown");
        }
    }

    #[test]
    fn names_round_trip_through_the_table() {
        let bindings = KeyBindings::default();
        let names = bindings.to_names();
        let rebuilt = KeyBindings::from_names(&names);
        for binding in KeyBinding::ALL {
            assert_eq!(rebuilt.code_for(binding), bindings.code_for(binding));
        }
    }

    #[test]
    fn unknown_persisted_name_keeps_the_default() {
        let mut names = HashMap::new();
        names.insert(KeyBinding::Pause, "NotAKey".to_string());
        names.insert(KeyBinding::Debug, "F5".to_string());
        let bindings = KeyBindings::from_names(&names);
        assert_eq!(bindings.code_for(KeyBinding::Pause), Some(KeyCode::KeyP));
        assert_eq!(bindings.code_for(KeyBinding::Debug), Some(KeyCode::F5));
    }

    #[test]
    fn snapshot_reports_held_and_edge_state_separately() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(KeyBinding::Left, true)
            .with_pressed(KeyBinding::Pause);
        assert!(snapshot.is_down(KeyBinding::Left));
        assert!(!snapshot.was_pressed(KeyBinding::Left));
        assert!(snapshot.is_down(KeyBinding::Pause));
        assert!(snapshot.was_pressed(KeyBinding::Pause));
        assert!(!snapshot.quit_requested());
    }

    #[test]
    fn rebinding_replaces_the_physical_key() {
        let mut bindings = KeyBindings::default();
        bindings.bind(KeyBinding::Fire1, KeyCode::Space);
        assert_eq!(bindings.code_for(KeyBinding::Fire1), Some(KeyCode::Space));
        assert_eq!(bindings.binding_for(KeyCode::Space), Some(KeyBinding::Fire1));
    }
}
