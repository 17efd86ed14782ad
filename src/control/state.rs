//! The single state record shared by the resolver, the status projector and
//! the presentation layer.
//!
//! [`ControlState`] holds the catalogs fetched at startup, the confirmed
//! [`Selection`], the local belief about whether the pipeline is running, and
//! what the status line currently shows.  Nothing in [`Selection`] is set
//! until the pipeline has acknowledged the matching command.
//!
//! [`SharedState`] is an `Arc<Mutex<ControlState>>`.  Lock it for a short
//! critical section only; never hold the guard across an `.await`, so an
//! in-flight command never blocks a status event or the other way round.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::catalog::{DeviceSet, VoiceInfo, VoiceSet};
use crate::config::Settings;
use crate::pipeline::StatusToken;

// ---------------------------------------------------------------------------
// SettingField / SettingChange
// ---------------------------------------------------------------------------

/// One of the four user-adjustable settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingField {
    InputDevice,
    OutputDevice,
    Voice,
    SilenceDuration,
}

impl std::fmt::Display for SettingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SettingField::InputDevice => "input device",
            SettingField::OutputDevice => "output device",
            SettingField::Voice => "voice",
            SettingField::SilenceDuration => "silence duration",
        })
    }
}

/// A candidate new value for one setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingChange {
    InputDevice(String),
    OutputDevice(String),
    Voice(String),
    SilenceDuration(u64),
}

impl SettingChange {
    pub fn field(&self) -> SettingField {
        match self {
            SettingChange::InputDevice(_) => SettingField::InputDevice,
            SettingChange::OutputDevice(_) => SettingField::OutputDevice,
            SettingChange::Voice(_) => SettingField::Voice,
            SettingChange::SilenceDuration(_) => SettingField::SilenceDuration,
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Values the pipeline has confirmed.  `None` means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub input_device: Option<String>,
    pub output_device: Option<String>,
    pub voice_id: Option<String>,
    pub silence_duration_ms: Option<u64>,
}

impl Selection {
    /// Record a confirmed change.
    pub fn apply(&mut self, change: &SettingChange) {
        match change {
            SettingChange::InputDevice(name) => self.input_device = Some(name.clone()),
            SettingChange::OutputDevice(name) => self.output_device = Some(name.clone()),
            SettingChange::Voice(id) => self.voice_id = Some(id.clone()),
            SettingChange::SilenceDuration(ms) => self.silence_duration_ms = Some(*ms),
        }
    }
}

// ---------------------------------------------------------------------------
// DisplayStatus
// ---------------------------------------------------------------------------

/// What the status line shows: the latest pipeline status, or the latest
/// command failure.  Whichever happened last wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayStatus {
    Status(StatusToken),
    Error(String),
}

impl DisplayStatus {
    /// Text for the status line.
    ///
    /// ```
    /// use parrot_control::control::DisplayStatus;
    /// use parrot_control::pipeline::StatusToken;
    ///
    /// assert_eq!(DisplayStatus::Status(StatusToken::Listening).text(), "Listening...");
    /// assert_eq!(DisplayStatus::Error("device busy".into()).text(), "Error: device busy");
    /// ```
    pub fn text(&self) -> String {
        match self {
            DisplayStatus::Status(token) => token.label().to_string(),
            DisplayStatus::Error(message) => format!("Error: {message}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DisplayStatus::Error(_))
    }
}

impl Default for DisplayStatus {
    fn default() -> Self {
        DisplayStatus::Status(StatusToken::Stopped)
    }
}

// ---------------------------------------------------------------------------
// ControlState
// ---------------------------------------------------------------------------

/// Shared control-surface state: the single source of truth for rendering.
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    /// Confirmed device / voice / threshold values.
    pub selection: Selection,
    /// Input devices as enumerated at startup.
    pub input_devices: DeviceSet,
    /// Output devices as enumerated at startup.
    pub output_devices: DeviceSet,
    /// Voices as listed at startup.
    pub voices: VoiceSet,
    /// Local belief about the pipeline; flipped only by a confirmed start/stop.
    pub is_active: bool,
    /// Current status line.
    pub display: DisplayStatus,
    /// Most recent token received from the pipeline, if any.
    pub last_event: Option<StatusToken>,
    /// The record last read from or written to the settings store.
    pub persisted: Settings,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device and voice pickers accept input only while the pipeline is idle.
    pub fn pickers_enabled(&self) -> bool {
        !self.is_active
    }

    /// The full record to persist after `change` is confirmed.
    ///
    /// Starts from the record last persisted and overrides only the field
    /// `change` names.  Values resolved at startup are never written back, so
    /// a stale stored device survives until the user replaces it.
    pub fn settings_with(&self, change: &SettingChange) -> Settings {
        let mut record = self.persisted.clone();
        match change {
            SettingChange::InputDevice(name) => record.input_device = Some(name.clone()),
            SettingChange::OutputDevice(name) => record.output_device = Some(name.clone()),
            SettingChange::Voice(id) => record.voice_id = Some(id.clone()),
            SettingChange::SilenceDuration(ms) => record.silence_duration_ms = *ms,
        }
        record
    }

    /// Replace an error on the status line with the latest known status.
    ///
    /// Without any event yet, the status follows the active flag.
    pub fn clear_error(&mut self) {
        if self.display.is_error() {
            let token = self.last_event.clone().unwrap_or(if self.is_active {
                StatusToken::Listening
            } else {
                StatusToken::Stopped
            });
            self.display = DisplayStatus::Status(token);
        }
    }

    /// A serialisable view for rendering or dumping.
    pub fn snapshot(&self) -> ControlSnapshot {
        let voice_name = self
            .selection
            .voice_id
            .as_deref()
            .and_then(|id| self.voices.display_name(id))
            .map(str::to_string);

        ControlSnapshot {
            selection: self.selection.clone(),
            voice_name,
            input_devices: self.input_devices.available.clone(),
            output_devices: self.output_devices.available.clone(),
            voices: self.voices.available.clone(),
            is_active: self.is_active,
            pickers_enabled: self.pickers_enabled(),
            status: self.display.text(),
            last_event: self.last_event.as_ref().map(|t| t.as_str().to_string()),
        }
    }
}

/// Owned, serialisable copy of what the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlSnapshot {
    pub selection: Selection,
    pub voice_name: Option<String>,
    pub input_devices: Vec<String>,
    pub output_devices: Vec<String>,
    pub voices: Vec<VoiceInfo>,
    pub is_active: bool,
    pub pickers_enabled: bool,
    pub status: String,
    pub last_event: Option<String>,
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`ControlState`].
///
/// Cheap to clone (`Arc` clone).
pub type SharedState = Arc<Mutex<ControlState>>;

/// Construct a new [`SharedState`] wrapping a default [`ControlState`].
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(ControlState::new()))
}

/// Lock `state`, recovering the guard if a previous holder panicked.
///
/// Every writer leaves the record consistent between statements, so a
/// poisoned lock still guards valid data.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, ControlState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
