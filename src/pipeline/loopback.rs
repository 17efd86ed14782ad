//! In-process stand-in for the external audio pipeline.
//!
//! [`LoopbackPipeline`] accepts the same commands as the real pipeline and
//! applies the same validation (devices must be enumerable, voices must be
//! registered) but performs no audio work.  Start and stop publish the
//! `listening` / `stopped` tokens the real pipeline would, and
//! [`LoopbackPipeline::emit`] lets a driver inject any other token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::catalog::{CatalogError, DeviceCatalog, DeviceDirection, VoiceCatalog, VoiceInfo};

use super::controller::{CommandError, PipelineCommand, PipelineController};
use super::status::{StatusBroadcaster, StatusToken};

/// Silence threshold the pipeline uses until told otherwise.
const INITIAL_SILENCE_DURATION_MS: u64 = 700;

/// The voices shipped with the application bundle.
pub fn stock_voices() -> Vec<VoiceInfo> {
    vec![
        VoiceInfo::new("lessac", "Lessac (Neutral)"),
        VoiceInfo::new("ryan", "Ryan (Male)"),
        VoiceInfo::new("alba", "Alba (Female)"),
    ]
}

/// Configuration the pipeline has accepted so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopbackConfig {
    pub input_device: Option<String>,
    pub output_device: Option<String>,
    pub voice_id: Option<String>,
    pub silence_duration_ms: u64,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            input_device: None,
            output_device: None,
            voice_id: None,
            silence_duration_ms: INITIAL_SILENCE_DURATION_MS,
        }
    }
}

/// Command-accepting pipeline with no audio path behind it.
pub struct LoopbackPipeline {
    devices: Arc<dyn DeviceCatalog>,
    voices: Vec<VoiceInfo>,
    config: Mutex<LoopbackConfig>,
    running: AtomicBool,
    status: StatusBroadcaster,
}

impl LoopbackPipeline {
    /// Build a pipeline that validates devices against `devices` and offers
    /// `voices` for selection.
    pub fn new(devices: Arc<dyn DeviceCatalog>, voices: Vec<VoiceInfo>) -> Self {
        Self {
            devices,
            voices,
            config: Mutex::new(LoopbackConfig::default()),
            running: AtomicBool::new(false),
            status: StatusBroadcaster::new(),
        }
    }

    /// Build a pipeline offering [`stock_voices`].
    pub fn with_stock_voices(devices: Arc<dyn DeviceCatalog>) -> Self {
        Self::new(devices, stock_voices())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Snapshot of the accepted configuration.
    pub fn config(&self) -> LoopbackConfig {
        self.config
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Publish `token` on the status channel as if the pipeline had emitted it.
    pub fn emit(&self, token: &StatusToken) {
        self.status.emit(token);
    }

    /// Number of live status subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.status.subscriber_count()
    }

    async fn require_device(
        &self,
        command: PipelineCommand,
        direction: DeviceDirection,
        name: &str,
    ) -> Result<(), CommandError> {
        let devices = self
            .devices
            .list_devices(direction)
            .await
            .map_err(|e| CommandError::new(command, e.to_string()))?;

        if devices.iter().any(|d| d == name) {
            Ok(())
        } else {
            let side = match direction {
                DeviceDirection::Input => "Input",
                DeviceDirection::Output => "Output",
            };
            Err(CommandError::new(
                command,
                format!("{side} device not found: {name}"),
            ))
        }
    }

    fn update(
        &self,
        command: PipelineCommand,
        apply: impl FnOnce(&mut LoopbackConfig),
    ) -> Result<(), CommandError> {
        let mut config = self
            .config
            .lock()
            .map_err(|e| CommandError::new(command, e.to_string()))?;
        apply(&mut config);
        Ok(())
    }
}

#[async_trait]
impl VoiceCatalog for LoopbackPipeline {
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, CatalogError> {
        Ok(self.voices.clone())
    }
}

#[async_trait]
impl PipelineController for LoopbackPipeline {
    async fn set_input_device(&self, name: &str) -> Result<(), CommandError> {
        let command = PipelineCommand::SetInputDevice;
        self.require_device(command, DeviceDirection::Input, name)
            .await?;
        self.update(command, |c| c.input_device = Some(name.to_string()))
    }

    async fn set_output_device(&self, name: &str) -> Result<(), CommandError> {
        let command = PipelineCommand::SetOutputDevice;
        self.require_device(command, DeviceDirection::Output, name)
            .await?;
        self.update(command, |c| c.output_device = Some(name.to_string()))
    }

    async fn select_voice(&self, voice_id: &str) -> Result<(), CommandError> {
        let command = PipelineCommand::SelectVoice;
        if !self.voices.iter().any(|v| v.id == voice_id) {
            return Err(CommandError::new(
                command,
                format!("Voice not found: {voice_id}"),
            ));
        }
        self.update(command, |c| c.voice_id = Some(voice_id.to_string()))
    }

    async fn set_silence_duration(&self, ms: u64) -> Result<(), CommandError> {
        self.update(PipelineCommand::SetSilenceDuration, |c| {
            c.silence_duration_ms = ms
        })
    }

    async fn start(&self) -> Result<(), CommandError> {
        // Starting a running pipeline is acknowledged without side effects.
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        log::info!("loopback: pipeline started");
        self.status.emit(&StatusToken::Listening);
        Ok(())
    }

    async fn stop(&self) -> Result<(), CommandError> {
        self.running.store(false, Ordering::SeqCst);
        log::info!("loopback: pipeline stopped");
        self.status.emit(&StatusToken::Stopped);
        Ok(())
    }

    fn subscribe_status(&self) -> broadcast::Receiver<String> {
        self.status.subscribe()
    }
}
