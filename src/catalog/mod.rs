//! Device and voice catalogs.
//!
//! A catalog is a point-in-time snapshot of what can be selected.  Both are
//! fetched once at startup and are not live-updated afterwards.
//!
//! * [`DeviceCatalog`] — input/output audio devices plus the OS default for
//!   each direction.
//! * [`VoiceCatalog`] — synthetic voices as `(id, display name)` pairs.
//! * [`SystemDeviceCatalog`] — `cpal`-backed [`DeviceCatalog`].

pub mod system;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use system::SystemDeviceCatalog;

// ---------------------------------------------------------------------------
// CatalogError
// ---------------------------------------------------------------------------

/// A catalog fetch failed.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The collaborator could not produce the list.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// DeviceDirection
// ---------------------------------------------------------------------------

/// Which side of the audio pipeline a device feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceDirection {
    Input,
    Output,
}

impl DeviceDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceDirection::Input => "input",
            DeviceDirection::Output => "output",
        }
    }
}

impl std::fmt::Display for DeviceDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DeviceSet / VoiceSet
// ---------------------------------------------------------------------------

/// Devices available in one direction, in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceSet {
    pub available: Vec<String>,
    pub system_default: Option<String>,
}

impl DeviceSet {
    pub fn contains(&self, name: &str) -> bool {
        self.available.iter().any(|d| d == name)
    }
}

/// One selectable voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
}

impl VoiceInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Voices available for selection, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoiceSet {
    pub available: Vec<VoiceInfo>,
}

impl VoiceSet {
    pub fn contains(&self, voice_id: &str) -> bool {
        self.available.iter().any(|v| v.id == voice_id)
    }

    /// Display name for `voice_id`, if the voice is listed.
    pub fn display_name(&self, voice_id: &str) -> Option<&str> {
        self.available
            .iter()
            .find(|v| v.id == voice_id)
            .map(|v| v.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Catalog traits
// ---------------------------------------------------------------------------

/// Enumerates audio devices and reports the OS default for each direction.
#[async_trait]
pub trait DeviceCatalog: Send + Sync {
    /// Device names for `direction`, in enumeration order.
    async fn list_devices(&self, direction: DeviceDirection) -> Result<Vec<String>, CatalogError>;

    /// The OS default device for `direction`, if there is one.
    async fn default_device(
        &self,
        direction: DeviceDirection,
    ) -> Result<Option<String>, CatalogError>;
}

/// Enumerates the synthetic voices the pipeline can speak with.
#[async_trait]
pub trait VoiceCatalog: Send + Sync {
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, CatalogError>;
}
