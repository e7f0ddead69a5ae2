use std::collections::HashMap;
use std::path::Path;

use engine::{KeyBinding, KeyBindings};
use tracing::{info, warn};

/// Load the key map from `path`, or write the default mapping there when the
/// file does not exist yet. Any read, parse or write failure falls back to
/// the defaults; a broken key map must never stop the game from starting.
pub fn load_or_create(path: &Path) -> KeyBindings {
    if path.exists() {
        return match read_bindings(path) {
            Ok(bindings) => {
                info!(path = %path.display(), "keymap_loaded");
                bindings
            }
            Err(error) => {
                warn!(path = %path.display(), error = %error, "keymap_unreadable");
                KeyBindings::default()
            }
        };
    }

    let bindings = KeyBindings::default();
    if let Err(error) = write_bindings(path, &bindings) {
        warn!(path = %path.display(), error = %error, "keymap_write_failed");
    } else {
        info!(path = %path.display(), "keymap_created");
    }
    bindings
}

fn read_bindings(path: &Path) -> Result<KeyBindings, std::io::Error> {
    let raw = std::fs::read_to_string(path)?;
    let names: HashMap<KeyBinding, String> = serde_json::from_str(&raw)?;
    Ok(KeyBindings::from_names(&names))
}

fn write_bindings(path: &Path, bindings: &KeyBindings) -> Result<(), std::io::Error> {
    let serialized = serde_json::to_string_pretty(&bindings.to_names())?;
    std::fs::write(path, serialized)
}
