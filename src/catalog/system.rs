//! Audio device enumeration via `cpal`.
//!
//! Every call opens the default host on the blocking thread pool, so no cpal
//! handle is held across `.await` points or shared between threads.

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait};

use super::{CatalogError, DeviceCatalog, DeviceDirection};

/// [`DeviceCatalog`] backed by the platform's default `cpal` host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDeviceCatalog;

impl SystemDeviceCatalog {
    pub fn new() -> Self {
        Self
    }
}

fn enumerate(direction: DeviceDirection) -> Result<Vec<String>, CatalogError> {
    let host = cpal::default_host();
    let devices = match direction {
        DeviceDirection::Input => host.input_devices(),
        DeviceDirection::Output => host.output_devices(),
    }
    .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

    // Devices whose name cannot be read are skipped rather than failing the list.
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

fn default_name(direction: DeviceDirection) -> Option<String> {
    let host = cpal::default_host();
    let device = match direction {
        DeviceDirection::Input => host.default_input_device(),
        DeviceDirection::Output => host.default_output_device(),
    };
    device.and_then(|d| d.name().ok())
}

#[async_trait]
impl DeviceCatalog for SystemDeviceCatalog {
    async fn list_devices(&self, direction: DeviceDirection) -> Result<Vec<String>, CatalogError> {
        tokio::task::spawn_blocking(move || enumerate(direction))
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?
    }

    async fn default_device(
        &self,
        direction: DeviceDirection,
    ) -> Result<Option<String>, CatalogError> {
        tokio::task::spawn_blocking(move || default_name(direction))
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))
    }
}
