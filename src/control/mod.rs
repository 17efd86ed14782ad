//! Configuration resolution and live status synchronisation.
//!
//! # Architecture
//!
//! ```text
//! Presentation ──intent──▶ ConfigResolver ──command──▶ PipelineController
//!                               │   ▲                         │
//!                          save │   │ load              "pipeline-status"
//!                               ▼   │                         │
//!                           SettingsStore                     ▼
//!                                                     StatusProjector
//!                                                             │
//! SharedState (Arc<Mutex<ControlState>>) ◀────────────────────┘
//!        ▲  written by ConfigResolver after each confirmed command
//!        └─ read by the presentation layer
//! ```
//!
//! [`ConfigResolver`] and [`StatusProjector`] write the same record but never
//! wait for one another: the lock is only held for individual field writes,
//! never across a command round trip.

pub mod error;
pub mod projector;
pub mod resolve;
pub mod resolver;
pub mod state;

#[cfg(test)]
pub mod mock;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use error::{ControlError, LoadError, StartupReport};
pub use projector::{StatusProjector, StatusSubscription};
pub use resolve::{resolve_device, resolve_voice, resolve_with_fallback};
pub use resolver::ConfigResolver;
pub use state::{
    lock_state, new_shared_state, ControlSnapshot, ControlState, DisplayStatus, Selection,
    SettingChange, SettingField, SharedState,
};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
