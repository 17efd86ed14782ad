//! The external audio pipeline as seen from the control surface.
//!
//! The capture → voice-conversion → playback process runs elsewhere.  This
//! module only describes how to talk to it:
//!
//! ```text
//! ConfigResolver ──commands──▶ PipelineController   (request / ack, fallible)
//!                                      │
//!                              "pipeline-status"    (broadcast, one-way)
//!                                      │
//!                                      ▼
//!                               StatusProjector
//! ```
//!
//! [`LoopbackPipeline`] is an in-process implementation used when no audio
//! backend is attached.

pub mod controller;
pub mod loopback;
pub mod status;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{CommandError, PipelineCommand, PipelineController};
pub use loopback::{stock_voices, LoopbackConfig, LoopbackPipeline};
pub use status::{StatusBroadcaster, StatusToken, STATUS_CHANNEL};
