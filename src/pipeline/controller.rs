//! Command interface of the external audio pipeline.
//!
//! Every command is an independent, fallible round trip.  A rejected command
//! comes back as a [`CommandError`] carrying the pipeline's own message.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PipelineCommand
// ---------------------------------------------------------------------------

/// The configuration and lifecycle commands the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineCommand {
    SetInputDevice,
    SetOutputDevice,
    SelectVoice,
    SetSilenceDuration,
    Start,
    Stop,
}

impl PipelineCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineCommand::SetInputDevice => "set_input_device",
            PipelineCommand::SetOutputDevice => "set_output_device",
            PipelineCommand::SelectVoice => "select_voice",
            PipelineCommand::SetSilenceDuration => "set_silence_duration",
            PipelineCommand::Start => "start_pipeline",
            PipelineCommand::Stop => "stop_pipeline",
        }
    }
}

impl std::fmt::Display for PipelineCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CommandError
// ---------------------------------------------------------------------------

/// The pipeline rejected a command.
///
/// Displays as the pipeline's message alone so it can be shown to the user
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CommandError {
    pub command: PipelineCommand,
    pub message: String,
}

impl CommandError {
    pub fn new(command: PipelineCommand, message: impl Into<String>) -> Self {
        Self {
            command,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineController trait
// ---------------------------------------------------------------------------

/// Async command surface of the pipeline plus its status subscription.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn PipelineController>`.
#[async_trait]
pub trait PipelineController: Send + Sync {
    async fn set_input_device(&self, name: &str) -> Result<(), CommandError>;

    async fn set_output_device(&self, name: &str) -> Result<(), CommandError>;

    async fn select_voice(&self, voice_id: &str) -> Result<(), CommandError>;

    async fn set_silence_duration(&self, ms: u64) -> Result<(), CommandError>;

    async fn start(&self) -> Result<(), CommandError>;

    async fn stop(&self) -> Result<(), CommandError>;

    /// Open a new receiver on the status channel.
    ///
    /// Raw tokens arrive in emission order.  Dropping the receiver releases
    /// the subscription.
    fn subscribe_status(&self) -> broadcast::Receiver<String>;
}

// Compile-time assertion: Box<dyn PipelineController> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn PipelineController>) {}
};
