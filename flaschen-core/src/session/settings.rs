//! User settings that survive restarts, stored as a small JSON file.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::color::ColorSelection;
use crate::error::FlaschenError;

/// Longest overlay text accepted from a user.
pub const MAX_TEXT_LEN: usize = 20;

// ── Settings ─────────────────────────────────────────────────────

/// The persisted part of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rain colour; also picks the overlay colour.
    pub color: ColorSelection,
    /// Custom overlay text. Empty means "no text".
    pub text: String,
}

impl Settings {
    /// Overlay text, trimmed; `None` when there is nothing to show.
    pub fn custom_text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }
}

// ── SettingsStore ────────────────────────────────────────────────

/// JSON file backing a [`Settings`] value.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(&self) -> Settings {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                Ok(settings) => {
                    info!(
                        "loaded settings: color={}, text={:?}",
                        settings.color, settings.text
                    );
                    settings
                }
                Err(e) => {
                    warn!("invalid settings {}: {e}; using defaults", self.path.display());
                    Settings::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no settings at {}; using defaults", self.path.display());
                Settings::default()
            }
            Err(e) => {
                warn!("cannot read settings {}: {e}; using defaults", self.path.display());
                Settings::default()
            }
        }
    }

    /// Write the settings via a temporary file and a rename, so a crash
    /// never leaves a half-written file behind.
    pub fn save(&self, settings: &Settings) -> Result<(), FlaschenError> {
        let text = serde_json::to_string_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text).map_err(|e| FlaschenError::Settings(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| FlaschenError::Settings(e.to_string()))?;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("flaschen-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn save_then_load() {
        let store = SettingsStore::new(scratch_path("roundtrip"));
        let settings = Settings {
            color: ColorSelection::Fixed(Rgb::new(255, 0, 0)),
            text: "HELLO".into(),
        };
        store.save(&settings).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"red\""));
        assert_eq!(store.load(), settings);

        std::fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn missing_file_gives_defaults() {
        let store = SettingsStore::new(scratch_path("missing"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let store = SettingsStore::new(scratch_path("corrupt"));
        std::fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load(), Settings::default());
        std::fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(settings.color, ColorSelection::default());
        assert_eq!(settings.custom_text(), Some("hi"));
        assert_eq!(Settings::default().custom_text(), None);
    }
}
