//! Error types for the control layer.
//!
//! * [`LoadError`] — a settings or catalog fetch failed.  Recovered locally:
//!   resolution continues with fallback values and the failure is logged.
//! * [`ControlError`] — a user-driven change or toggle did not take effect.
//!   Shown to the user as `"Error: <message>"`.
//! * [`StartupReport`] — everything that went wrong during startup
//!   resolution, as values rather than log lines.

use thiserror::Error;

use crate::catalog::{CatalogError, DeviceDirection};
use crate::config::{StoreError, MAX_SILENCE_DURATION_MS, MIN_SILENCE_DURATION_MS};
use crate::pipeline::CommandError;

use super::state::SettingField;

// ---------------------------------------------------------------------------
// LoadError
// ---------------------------------------------------------------------------

/// A startup fetch failed.  Never fatal.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("settings: {0}")]
    Settings(#[from] StoreError),

    #[error("{direction} devices: {source}")]
    Devices {
        direction: DeviceDirection,
        source: CatalogError,
    },

    #[error("default {direction} device: {source}")]
    DefaultDevice {
        direction: DeviceDirection,
        source: CatalogError,
    },

    #[error("voices: {0}")]
    Voices(CatalogError),
}

// ---------------------------------------------------------------------------
// ControlError
// ---------------------------------------------------------------------------

/// Why a user-driven change or start/stop toggle was not applied.
///
/// In every case the in-memory selection, the active flag and the persisted
/// record are left as they were.
#[derive(Debug, Clone, Error)]
pub enum ControlError {
    /// The pipeline rejected the command.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Devices and voices cannot be changed while the pipeline is running.
    #[error("cannot change the {0} while the pipeline is running")]
    PipelineActive(SettingField),

    /// The requested value is not in the current catalog.
    #[error("{field} not available: {value}")]
    NotInCatalog { field: SettingField, value: String },

    /// The requested silence threshold is outside the selectable range.
    #[error(
        "silence duration {0} ms is outside {min}-{max} ms",
        min = MIN_SILENCE_DURATION_MS,
        max = MAX_SILENCE_DURATION_MS
    )]
    SilenceOutOfRange(u64),
}

// ---------------------------------------------------------------------------
// StartupReport
// ---------------------------------------------------------------------------

/// Outcome of [`ConfigResolver::initialize`](super::ConfigResolver::initialize).
#[derive(Debug, Clone, Default)]
pub struct StartupReport {
    /// A settings record was found and parsed.
    pub settings_loaded: bool,
    /// Fetches that failed and were replaced by fallbacks.
    pub load_failures: Vec<LoadError>,
    /// Startup `set` commands the pipeline rejected.
    pub command_failures: Vec<CommandError>,
}

impl StartupReport {
    /// `true` when nothing failed.
    pub fn is_clean(&self) -> bool {
        self.load_failures.is_empty() && self.command_failures.is_empty()
    }
}
