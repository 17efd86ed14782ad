//! Test double standing in for every external collaborator at once.
//!
//! [`MockBackend`] implements [`SettingsStore`], [`DeviceCatalog`],
//! [`VoiceCatalog`] and [`PipelineController`], records every pipeline
//! command and every save, and can be told to reject individual commands.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::catalog::{CatalogError, DeviceCatalog, DeviceDirection, VoiceCatalog, VoiceInfo};
use crate::config::{Settings, SettingsStore, StoreError};
use crate::pipeline::{CommandError, PipelineCommand, PipelineController, StatusBroadcaster};

/// Catalog contents for one direction; `None` makes the fetch fail.
#[derive(Debug, Clone, Default)]
struct DeviceFixture {
    available: Option<Vec<String>>,
    system_default: Option<Option<String>>,
}

pub struct MockBackend {
    stored: Mutex<Option<Settings>>,
    fail_load: bool,
    fail_save: Mutex<bool>,
    inputs: DeviceFixture,
    outputs: DeviceFixture,
    voices: Option<Vec<VoiceInfo>>,
    failing: Mutex<HashMap<PipelineCommand, String>>,
    delays: Mutex<HashMap<PipelineCommand, Duration>>,
    calls: Mutex<Vec<(PipelineCommand, String)>>,
    saves: Mutex<Vec<Settings>>,
    pub status: StatusBroadcaster,
}

impl MockBackend {
    /// Empty catalogs, no stored settings, every command accepted.
    pub fn new() -> Self {
        Self {
            stored: Mutex::new(None),
            fail_load: false,
            fail_save: Mutex::new(false),
            inputs: DeviceFixture {
                available: Some(Vec::new()),
                system_default: Some(None),
            },
            outputs: DeviceFixture {
                available: Some(Vec::new()),
                system_default: Some(None),
            },
            voices: Some(Vec::new()),
            failing: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            saves: Mutex::new(Vec::new()),
            status: StatusBroadcaster::new(),
        }
    }

    // ---- Builders ---

    pub fn with_stored(self, settings: Settings) -> Self {
        *self.stored.lock().unwrap() = Some(settings);
        self
    }

    pub fn with_inputs(mut self, names: &[&str], system_default: Option<&str>) -> Self {
        self.inputs = fixture(names, system_default);
        self
    }

    pub fn with_outputs(mut self, names: &[&str], system_default: Option<&str>) -> Self {
        self.outputs = fixture(names, system_default);
        self
    }

    pub fn with_voices(mut self, voices: &[(&str, &str)]) -> Self {
        self.voices = Some(
            voices
                .iter()
                .map(|(id, name)| VoiceInfo::new(*id, *name))
                .collect(),
        );
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn failing_outputs(mut self) -> Self {
        self.outputs.available = None;
        self
    }

    pub fn failing_input_default(mut self) -> Self {
        self.inputs.system_default = None;
        self
    }

    pub fn failing_voices(mut self) -> Self {
        self.voices = None;
        self
    }

    // ---- Runtime controls ---

    /// Reject `command` with `message` until [`recover`](Self::recover).
    pub fn fail(&self, command: PipelineCommand, message: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(command, message.to_string());
    }

    pub fn recover(&self, command: PipelineCommand) {
        self.failing.lock().unwrap().remove(&command);
    }

    /// Make `command` take `delay` before it is recorded and answered.
    pub fn delay(&self, command: PipelineCommand, delay: Duration) {
        self.delays.lock().unwrap().insert(command, delay);
    }

    pub fn set_save_failure(&self, fail: bool) {
        *self.fail_save.lock().unwrap() = fail;
    }

    // ---- Inspection ---

    /// Every pipeline command answered, in completion order, with its
    /// argument rendered as text.
    pub fn calls(&self) -> Vec<(PipelineCommand, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Every record successfully saved, oldest first.
    pub fn saves(&self) -> Vec<Settings> {
        self.saves.lock().unwrap().clone()
    }

    /// The record currently in storage.
    pub fn stored(&self) -> Option<Settings> {
        self.stored.lock().unwrap().clone()
    }

    async fn command(
        &self,
        command: PipelineCommand,
        arg: impl ToString,
    ) -> Result<(), CommandError> {
        let arg = arg.to_string();
        let delay = self.delays.lock().unwrap().get(&command).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.calls.lock().unwrap().push((command, arg));
        let failure = self.failing.lock().unwrap().get(&command).cloned();
        match failure {
            Some(message) => Err(CommandError::new(command, message)),
            None => Ok(()),
        }
    }

    fn fixture_for(&self, direction: DeviceDirection) -> &DeviceFixture {
        match direction {
            DeviceDirection::Input => &self.inputs,
            DeviceDirection::Output => &self.outputs,
        }
    }
}

fn fixture(names: &[&str], system_default: Option<&str>) -> DeviceFixture {
    DeviceFixture {
        available: Some(names.iter().map(|s| s.to_string()).collect()),
        system_default: Some(system_default.map(str::to_string)),
    }
}

#[async_trait]
impl SettingsStore for MockBackend {
    async fn load(&self) -> Result<Option<Settings>, StoreError> {
        if self.fail_load {
            return Err(StoreError::Load("permission denied".into()));
        }
        Ok(self.stored())
    }

    async fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        if *self.fail_save.lock().unwrap() {
            return Err(StoreError::Save("disk full".into()));
        }
        *self.stored.lock().unwrap() = Some(settings.clone());
        self.saves.lock().unwrap().push(settings.clone());
        Ok(())
    }
}

#[async_trait]
impl DeviceCatalog for MockBackend {
    async fn list_devices(&self, direction: DeviceDirection) -> Result<Vec<String>, CatalogError> {
        self.fixture_for(direction)
            .available
            .clone()
            .ok_or_else(|| CatalogError::Unavailable(format!("{direction} host gone")))
    }

    async fn default_device(
        &self,
        direction: DeviceDirection,
    ) -> Result<Option<String>, CatalogError> {
        self.fixture_for(direction)
            .system_default
            .clone()
            .ok_or_else(|| CatalogError::Unavailable(format!("{direction} default unknown")))
    }
}

#[async_trait]
impl VoiceCatalog for MockBackend {
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, CatalogError> {
        self.voices
            .clone()
            .ok_or_else(|| CatalogError::Unavailable("voice registry missing".into()))
    }
}

#[async_trait]
impl PipelineController for MockBackend {
    async fn set_input_device(&self, name: &str) -> Result<(), CommandError> {
        self.command(PipelineCommand::SetInputDevice, name).await
    }

    async fn set_output_device(&self, name: &str) -> Result<(), CommandError> {
        self.command(PipelineCommand::SetOutputDevice, name).await
    }

    async fn select_voice(&self, voice_id: &str) -> Result<(), CommandError> {
        self.command(PipelineCommand::SelectVoice, voice_id).await
    }

    async fn set_silence_duration(&self, ms: u64) -> Result<(), CommandError> {
        self.command(PipelineCommand::SetSilenceDuration, ms).await
    }

    async fn start(&self) -> Result<(), CommandError> {
        self.command(PipelineCommand::Start, "").await
    }

    async fn stop(&self) -> Result<(), CommandError> {
        self.command(PipelineCommand::Stop, "").await
    }

    fn subscribe_status(&self) -> broadcast::Receiver<String> {
        self.status.subscribe()
    }
}
