//! Persisted user settings, silence-duration constants and TOML persistence.
//!
//! [`Settings`] is the one record per installation that remembers the last
//! confirmed input device, output device, voice and silence threshold.  Every
//! field is optional on disk: a missing field deserialises to its "unset"
//! value and the resolver falls back through its priority chain.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Silence-duration constants
// ---------------------------------------------------------------------------

/// Silence threshold used when nothing usable was persisted.
pub const DEFAULT_SILENCE_DURATION_MS: u64 = 700;
/// Lowest silence threshold a user may pick.
pub const MIN_SILENCE_DURATION_MS: u64 = 300;
/// Highest silence threshold a user may pick.
pub const MAX_SILENCE_DURATION_MS: u64 = 1200;

/// Returns `true` when `ms` lies inside the user-selectable range.
///
/// ```
/// use parrot_control::config::silence_in_range;
///
/// assert!(silence_in_range(300));
/// assert!(silence_in_range(1200));
/// assert!(!silence_in_range(299));
/// assert!(!silence_in_range(1201));
/// ```
pub fn silence_in_range(ms: u64) -> bool {
    (MIN_SILENCE_DURATION_MS..=MAX_SILENCE_DURATION_MS).contains(&ms)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The persisted device / voice / threshold record, serialised as
/// `settings.toml`.
///
/// `silence_duration_ms == 0` means "not recorded" and is never used as a
/// threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Input device name, exactly as enumerated by the device catalog.
    #[serde(default)]
    pub input_device: Option<String>,
    /// Output device name, exactly as enumerated by the device catalog.
    #[serde(default)]
    pub output_device: Option<String>,
    /// Voice identifier, exactly as listed by the voice catalog.
    #[serde(default)]
    pub voice_id: Option<String>,
    /// Silence threshold in milliseconds.
    #[serde(default)]
    pub silence_duration_ms: u64,
}

impl Settings {
    /// The persisted silence threshold, if one was recorded.
    pub fn silence_duration(&self) -> Option<u64> {
        (self.silence_duration_ms > 0).then_some(self.silence_duration_ms)
    }

    /// Load settings from `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist yet (first run).
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        Ok(Some(settings))
    }

    /// Save settings to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// A fully populated record survives a save / load cycle unchanged.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = Settings {
            input_device: Some("Mic-A".into()),
            output_device: Some("Speakers (USB)".into()),
            voice_id: Some("ryan".into()),
            silence_duration_ms: 900,
        };
        original.save_to(&path).expect("save");

        let loaded = Settings::load_from(&path).expect("load").expect("present");
        assert_eq!(loaded, original);
    }

    /// `load_from` on a non-existent path reports "not found" without error.
    #[test]
    fn load_missing_returns_none() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        assert!(Settings::load_from(&path).expect("should not error").is_none());
    }

    /// Fields absent from the file fall back to their unset values.
    #[test]
    fn missing_fields_are_unset() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "voice_id = \"alba\"\n").expect("write");

        let loaded = Settings::load_from(&path).expect("load").expect("present");
        assert_eq!(loaded.voice_id.as_deref(), Some("alba"));
        assert!(loaded.input_device.is_none());
        assert!(loaded.output_device.is_none());
        assert_eq!(loaded.silence_duration(), None);
    }

    /// Unset options are omitted from the file rather than written as empty.
    #[test]
    fn none_fields_round_trip_as_none() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("sparse.toml");

        let original = Settings {
            silence_duration_ms: 700,
            ..Settings::default()
        };
        original.save_to(&path).expect("save");

        let loaded = Settings::load_from(&path).expect("load").expect("present");
        assert_eq!(loaded, original);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "silence_duration_ms = \"loud\"").expect("write");

        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn zero_silence_is_not_recorded() {
        let settings = Settings::default();
        assert_eq!(settings.silence_duration(), None);

        let settings = Settings {
            silence_duration_ms: 450,
            ..Settings::default()
        };
        assert_eq!(settings.silence_duration(), Some(450));
    }

    #[test]
    fn default_is_inside_range() {
        assert!(silence_in_range(DEFAULT_SILENCE_DURATION_MS));
    }
}
