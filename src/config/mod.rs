//! Configuration module for the voice-anonymizer control surface.
//!
//! Provides [`Settings`] (the persisted device / voice / threshold record),
//! the silence-duration constants, [`AppPaths`] for cross-platform data
//! directories, and the [`SettingsStore`] seam with its TOML-file
//! implementation [`FileSettingsStore`].

pub mod paths;
pub mod settings;
pub mod store;

pub use paths::{AppPaths, SETTINGS_PATH_ENV};
pub use settings::{
    silence_in_range, Settings, DEFAULT_SILENCE_DURATION_MS, MAX_SILENCE_DURATION_MS,
    MIN_SILENCE_DURATION_MS,
};
pub use store::{FileSettingsStore, SettingsStore, StoreError};
