//! Durable storage for [`Settings`].
//!
//! [`SettingsStore`] is the seam the resolver talks to.  It only persists what
//! it is given; deciding *what* to persist is the resolver's job.
//! [`FileSettingsStore`] is the production implementation backed by a TOML
//! file; file I/O runs on the blocking thread pool.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use super::{AppPaths, Settings};

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors raised while reading or writing the settings record.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The record could not be read or parsed.
    #[error("failed to load settings: {0}")]
    Load(String),

    /// The record could not be serialised or written.
    #[error("failed to save settings: {0}")]
    Save(String),
}

// ---------------------------------------------------------------------------
// SettingsStore trait
// ---------------------------------------------------------------------------

/// Async load/save interface for the persisted settings record.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the record.  `Ok(None)` means no record exists yet.
    async fn load(&self) -> Result<Option<Settings>, StoreError>;

    /// Replace the stored record with `settings`.
    async fn save(&self, settings: &Settings) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// FileSettingsStore
// ---------------------------------------------------------------------------

/// TOML-file implementation of [`SettingsStore`].
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Store settings at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store settings at the platform-appropriate location.
    pub fn from_paths(paths: &AppPaths) -> Self {
        Self::new(paths.settings_file.clone())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<Option<Settings>, StoreError> {
        let path = self.path.clone();
        let loaded = tokio::task::spawn_blocking(move || Settings::load_from(&path))
            .await
            .map_err(|e| StoreError::Load(e.to_string()))?
            .map_err(|e| StoreError::Load(e.to_string()))?;

        match &loaded {
            Some(_) => log::info!("store: loaded settings from {}", self.path.display()),
            None => log::info!("store: no settings file at {}", self.path.display()),
        }
        Ok(loaded)
    }

    async fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let path = self.path.clone();
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || settings.save_to(&path))
            .await
            .map_err(|e| StoreError::Save(e.to_string()))?
            .map_err(|e| StoreError::Save(e.to_string()))?;

        log::debug!("store: saved settings to {}", self.path.display());
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

    #[tokio::test]
    async fn load_without_file_is_none() {
        let dir = tempdir().expect("temp dir");
        let store = FileSettingsStore::new(dir.path().join("settings.toml"));

        assert!(store.load().await.expect("load").is_none());
    }

    #[tokio::test]
    async fn save_then_load_returns_same_record() {
        let dir = tempdir().expect("temp dir");
        let store = FileSettingsStore::new(dir.path().join("nested").join("settings.toml"));

        let settings = Settings {
            input_device: Some("Mic-B".into()),
            output_device: None,
            voice_id: Some("lessac".into()),
            silence_duration_ms: 1100,
        };
        store.save(&settings).await.expect("save");

        let loaded = store.load().await.expect("load");
        assert_eq!(loaded, Some(settings));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_load_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "input_device = [").expect("write");

        let store = FileSettingsStore::new(path);
        assert!(matches!(store.load().await, Err(StoreError::Load(_))));
    }

    #[test]
    fn from_paths_uses_settings_file() {
        let paths = AppPaths::with_settings_file("/tmp/parrot/settings.toml");
        let store = FileSettingsStore::from_paths(&paths);
        assert_eq!(store.path(), std::path::Path::new("/tmp/parrot/settings.toml"));
    }

    #[test]
    fn store_is_object_safe() {
        let _: Box<dyn SettingsStore> = Box::new(FileSettingsStore::new("settings.toml"));
    }
}
