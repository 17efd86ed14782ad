//! Configuration resolver — reconciles persisted settings, system defaults
//! and live catalogs, and drives every configuration change through the
//! pipeline.
//!
//! # Startup
//!
//! ```text
//! SettingsStore::load ──(failure = no settings)──┐
//!                                                ▼
//! join!(input devices, output devices, voices)   resolve each field
//!                                                ▼
//! join!(set input, set output, select voice, set silence)
//!        └─ Ok  → Selection updated
//!        └─ Err → "Error: …" shown, other fields unaffected
//! ```
//!
//! Startup never writes to the settings store.
//!
//! # User-driven changes
//!
//! Command first, then confirm: the pipeline must acknowledge before the
//! selection changes, and only then is a full [`Settings`] record saved.  A
//! rejected command leaves selection and storage untouched.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::catalog::{DeviceCatalog, DeviceDirection, DeviceSet, VoiceCatalog, VoiceSet};
use crate::config::{
    silence_in_range, Settings, SettingsStore, DEFAULT_SILENCE_DURATION_MS,
};
use crate::pipeline::{CommandError, PipelineController, StatusToken};

use super::error::{ControlError, LoadError, StartupReport};
use super::resolve::{resolve_device, resolve_voice};
use super::state::{lock_state, ControlState, DisplayStatus, SettingChange, SharedState};

// ---------------------------------------------------------------------------
// ConfigResolver
// ---------------------------------------------------------------------------

/// Owns the command-then-confirm flow for devices, voice, silence threshold
/// and pipeline start/stop.
///
/// All methods take `&self`, so independent changes may be in flight at the
/// same time; each is its own round trip with no ordering between them.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use parrot_control::catalog::SystemDeviceCatalog;
/// use parrot_control::config::FileSettingsStore;
/// use parrot_control::control::{new_shared_state, ConfigResolver};
/// use parrot_control::pipeline::LoopbackPipeline;
///
/// # async fn example() {
/// let devices = Arc::new(SystemDeviceCatalog::new());
/// let pipeline = Arc::new(LoopbackPipeline::with_stock_voices(devices.clone()));
/// let resolver = ConfigResolver::new(
///     new_shared_state(),
///     Arc::new(FileSettingsStore::new("settings.toml")),
///     devices,
///     pipeline.clone(),
///     pipeline,
/// );
///
/// let report = resolver.initialize().await;
/// assert!(report.command_failures.is_empty());
/// resolver.toggle_pipeline().await.unwrap();
/// # }
/// ```
pub struct ConfigResolver {
    state: SharedState,
    /// Device and voice changes hold it shared from the idle check until
    /// the command is confirmed; start/stop holds it exclusively.
    transition: RwLock<()>,
    store: Arc<dyn SettingsStore>,
    devices: Arc<dyn DeviceCatalog>,
    voices: Arc<dyn VoiceCatalog>,
    pipeline: Arc<dyn PipelineController>,
}

impl ConfigResolver {
    /// Create a resolver.
    ///
    /// # Arguments
    ///
    /// * `state`    — shared state, also read by the presentation layer and
    ///   written by the status projector.
    /// * `store`    — durable settings record.
    /// * `devices`  — input/output device catalog.
    /// * `voices`   — voice catalog.
    /// * `pipeline` — command interface of the audio pipeline.
    pub fn new(
        state: SharedState,
        store: Arc<dyn SettingsStore>,
        devices: Arc<dyn DeviceCatalog>,
        voices: Arc<dyn VoiceCatalog>,
        pipeline: Arc<dyn PipelineController>,
    ) -> Self {
        Self {
            state,
            transition: RwLock::new(()),
            store,
            devices,
            voices,
            pipeline,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    // -----------------------------------------------------------------------
    // Startup resolution
    // -----------------------------------------------------------------------

    /// Load settings and catalogs, resolve a working selection and apply it
    /// to the pipeline.
    ///
    /// Never fails: every problem is recovered with a fallback and listed in
    /// the returned [`StartupReport`].
    pub async fn initialize(&self) -> StartupReport {
        let mut report = StartupReport::default();

        // ── 1. Persisted settings ────────────────────────────────────────
        let persisted = match self.store.load().await {
            Ok(Some(settings)) => {
                report.settings_loaded = true;
                Some(settings)
            }
            Ok(None) => {
                log::info!("resolver: no saved settings, using fallbacks");
                None
            }
            Err(e) => {
                log::warn!("resolver: {e}; continuing without saved settings");
                report.load_failures.push(LoadError::Settings(e));
                None
            }
        };

        // ── 2. Catalogs (independent fetches, all awaited) ───────────────
        let ((inputs, input_errors), (outputs, output_errors), (voices, voice_errors)) = tokio::join!(
            self.fetch_devices(DeviceDirection::Input),
            self.fetch_devices(DeviceDirection::Output),
            self.fetch_voices(),
        );
        report.load_failures.extend(input_errors);
        report.load_failures.extend(output_errors);
        report.load_failures.extend(voice_errors);

        // ── 3–5. Resolve each field ──────────────────────────────────────
        let saved = persisted.as_ref();
        let input = resolve_device(saved.and_then(|s| s.input_device.as_deref()), &inputs);
        let output = resolve_device(saved.and_then(|s| s.output_device.as_deref()), &outputs);
        let voice = resolve_voice(saved.and_then(|s| s.voice_id.as_deref()), &voices);
        let silence = saved
            .and_then(Settings::silence_duration)
            .unwrap_or(DEFAULT_SILENCE_DURATION_MS);

        log::info!(
            "resolver: resolved input={input:?} output={output:?} voice={voice:?} silence={silence}ms"
        );

        {
            let mut st = lock_state(&self.state);
            st.input_devices = inputs;
            st.output_devices = outputs;
            st.voices = voices;
            st.persisted = persisted.unwrap_or_default();
        }

        // ── 6. Apply; each field stands alone ────────────────────────────
        let results = tokio::join!(
            self.apply_resolved(input.map(SettingChange::InputDevice)),
            self.apply_resolved(output.map(SettingChange::OutputDevice)),
            self.apply_resolved(voice.map(SettingChange::Voice)),
            self.apply_resolved(Some(SettingChange::SilenceDuration(silence))),
        );
        report.command_failures.extend(
            [results.0, results.1, results.2, results.3]
                .into_iter()
                .flatten(),
        );

        report
    }

    async fn fetch_devices(&self, direction: DeviceDirection) -> (DeviceSet, Vec<LoadError>) {
        let (available, system_default) = tokio::join!(
            self.devices.list_devices(direction),
            self.devices.default_device(direction),
        );

        let mut errors = Vec::new();
        let available = available.unwrap_or_else(|source| {
            log::warn!("resolver: listing {direction} devices failed: {source}");
            errors.push(LoadError::Devices { direction, source });
            Vec::new()
        });
        let system_default = system_default.unwrap_or_else(|source| {
            log::warn!("resolver: default {direction} device lookup failed: {source}");
            errors.push(LoadError::DefaultDevice { direction, source });
            None
        });

        (
            DeviceSet {
                available,
                system_default,
            },
            errors,
        )
    }

    async fn fetch_voices(&self) -> (VoiceSet, Vec<LoadError>) {
        match self.voices.list_voices().await {
            Ok(available) => (VoiceSet { available }, Vec::new()),
            Err(e) => {
                log::warn!("resolver: listing voices failed: {e}");
                (VoiceSet::default(), vec![LoadError::Voices(e)])
            }
        }
    }

    async fn apply_resolved(&self, change: Option<SettingChange>) -> Option<CommandError> {
        let change = change?;
        match self.confirm(&change).await {
            Ok(()) => None,
            Err(e) => {
                log::error!("resolver: startup {} rejected: {e}", change.field());
                self.show_error(e.to_string());
                Some(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // User-driven changes
    // -----------------------------------------------------------------------

    pub async fn change_input_device(&self, name: impl Into<String>) -> Result<(), ControlError> {
        self.apply_change(SettingChange::InputDevice(name.into()))
            .await
    }

    pub async fn change_output_device(&self, name: impl Into<String>) -> Result<(), ControlError> {
        self.apply_change(SettingChange::OutputDevice(name.into()))
            .await
    }

    pub async fn change_voice(&self, voice_id: impl Into<String>) -> Result<(), ControlError> {
        self.apply_change(SettingChange::Voice(voice_id.into()))
            .await
    }

    pub async fn change_silence_duration(&self, ms: u64) -> Result<(), ControlError> {
        self.apply_change(SettingChange::SilenceDuration(ms)).await
    }

    /// Send `change` to the pipeline; on acknowledgement update the selection
    /// and persist the full settings record.
    ///
    /// On any error the selection and the stored record are unchanged and
    /// the status line shows the error.  A confirmed change clears an error
    /// left on the status line by an earlier attempt.
    ///
    /// Device and voice changes cannot overlap a start/stop: the pipeline is
    /// known to be idle for the whole round trip.
    pub async fn apply_change(&self, change: SettingChange) -> Result<(), ControlError> {
        let _idle = match &change {
            SettingChange::SilenceDuration(_) => None,
            _ => Some(self.transition.read().await),
        };

        let checked = {
            let st = lock_state(&self.state);
            validate(&st, &change)
        };
        if let Err(e) = checked {
            log::warn!("resolver: {} change refused: {e}", change.field());
            self.show_error(e.to_string());
            return Err(e);
        }

        if let Err(e) = self.confirm(&change).await {
            log::error!("resolver: {} change rejected: {e}", change.field());
            self.show_error(e.to_string());
            return Err(e.into());
        }

        let record = {
            let mut st = lock_state(&self.state);
            st.clear_error();
            st.settings_with(&change)
        };
        match self.store.save(&record).await {
            Ok(()) => lock_state(&self.state).persisted = record,
            Err(e) => {
                // The pipeline already runs with the new value; only durability is lost.
                log::warn!("resolver: {e}; {} change not persisted", change.field());
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Start / stop
    // -----------------------------------------------------------------------

    /// Start the pipeline if it is believed idle, stop it otherwise.
    ///
    /// Returns the new active flag.  On failure the flag is unchanged.
    pub async fn toggle_pipeline(&self) -> Result<bool, ControlError> {
        let _transition = self.transition.write().await;
        let active = lock_state(&self.state).is_active;

        let (result, now_active, status) = if active {
            (self.pipeline.stop().await, false, StatusToken::Stopped)
        } else {
            (self.pipeline.start().await, true, StatusToken::Listening)
        };

        match result {
            Ok(()) => {
                log::info!(
                    "resolver: pipeline {}",
                    if now_active { "started" } else { "stopped" }
                );
                let mut st = lock_state(&self.state);
                st.is_active = now_active;
                st.display = DisplayStatus::Status(status);
                Ok(now_active)
            }
            Err(e) => {
                log::error!("resolver: {} failed: {e}", e.command);
                self.show_error(e.to_string());
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Issue the command for `change`; record it in the selection on success.
    async fn confirm(&self, change: &SettingChange) -> Result<(), CommandError> {
        match change {
            SettingChange::InputDevice(name) => self.pipeline.set_input_device(name).await?,
            SettingChange::OutputDevice(name) => self.pipeline.set_output_device(name).await?,
            SettingChange::Voice(id) => self.pipeline.select_voice(id).await?,
            SettingChange::SilenceDuration(ms) => self.pipeline.set_silence_duration(*ms).await?,
        }
        lock_state(&self.state).selection.apply(change);
        Ok(())
    }

    fn show_error(&self, message: String) {
        lock_state(&self.state).display = DisplayStatus::Error(message);
    }
}

/// Local checks made before a change is sent to the pipeline.
fn validate(state: &ControlState, change: &SettingChange) -> Result<(), ControlError> {
    let (value, listed) = match change {
        SettingChange::SilenceDuration(ms) => {
            return if silence_in_range(*ms) {
                Ok(())
            } else {
                Err(ControlError::SilenceOutOfRange(*ms))
            };
        }
        SettingChange::InputDevice(name) => (name, state.input_devices.contains(name)),
        SettingChange::OutputDevice(name) => (name, state.output_devices.contains(name)),
        SettingChange::Voice(id) => (id, state.voices.contains(id)),
    };

    if state.is_active {
        return Err(ControlError::PipelineActive(change.field()));
    }
    if !listed {
        return Err(ControlError::NotInCatalog {
            field: change.field(),
            value: value.clone(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
