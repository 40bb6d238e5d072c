//! Device ports: snapshot access and command primitives.
//!
//! The MELCloud transport (HTTP client, session handling, polling) lives
//! behind [`AtwDevice`] and [`AtaDevice`]. [`LocalAtwDevice`] and
//! [`LocalAtaDevice`] are snapshot-backed implementations; the ATW one applies
//! commands to its own copy of the status.

use std::future::Future;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;

use crate::ata::{AtaDevice, AtaEntry};
use crate::error::MelcloudError;
use crate::snapshot::{AtwState, DeviceEntry, TankOperationMode, ZoneIndex, ZoneOperationMode};

/// One air-to-water device as seen by the integration.
///
/// Commands resolve once the device acknowledged them; a failure is returned
/// unchanged and never retried here.
pub trait AtwDevice: Send + Sync {
    /// Latest polled snapshot.
    fn snapshot(&self) -> Arc<DeviceEntry>;

    fn set_power(&self, on: bool) -> impl Future<Output = Result<(), MelcloudError>> + Send;

    fn set_target_tank_temperature(
        &self,
        value: f64,
    ) -> impl Future<Output = Result<(), MelcloudError>> + Send;

    /// Select the hot-water tank operation mode.
    fn set_operation_mode(
        &self,
        mode: TankOperationMode,
    ) -> impl Future<Output = Result<(), MelcloudError>> + Send;

    /// Set the thermostat setpoint of a zone.
    fn set_zone_target_temperature(
        &self,
        zone: ZoneIndex,
        value: f64,
    ) -> impl Future<Output = Result<(), MelcloudError>> + Send;

    /// Set the flow setpoint of a zone.
    fn set_zone_target_flow_temperature(
        &self,
        zone: ZoneIndex,
        value: f64,
    ) -> impl Future<Output = Result<(), MelcloudError>> + Send;

    fn set_zone_operation_mode(
        &self,
        zone: ZoneIndex,
        mode: ZoneOperationMode,
    ) -> impl Future<Output = Result<(), MelcloudError>> + Send;
}

/// Snapshot-backed device.
///
/// Commands are applied to the held snapshot immediately. A poller can swap
/// in fresh snapshots with [`replace_snapshot`](Self::replace_snapshot).
#[derive(Debug)]
pub struct LocalDevice<E> {
    entry: RwLock<Arc<E>>,
}

/// Snapshot-backed air-to-water heat pump.
pub type LocalAtwDevice = LocalDevice<DeviceEntry>;

/// Snapshot-backed air-to-air unit.
pub type LocalAtaDevice = LocalDevice<AtaEntry>;

impl<E: DeserializeOwned> LocalDevice<E> {
    #[must_use]
    pub fn new(entry: E) -> Self {
        Self {
            entry: RwLock::new(Arc::new(entry)),
        }
    }

    /// Build a device from a MELCloud listing entry in JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MelcloudError::SnapshotParse`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, MelcloudError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Build a device from a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`MelcloudError::Io`] if the file cannot be read and
    /// [`MelcloudError::SnapshotParse`] if it is not valid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MelcloudError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Re-read the snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file). The held snapshot is kept on error.
    pub fn reload_file(&self, path: impl AsRef<Path>) -> Result<(), MelcloudError> {
        let json = std::fs::read_to_string(path)?;
        self.replace_snapshot(serde_json::from_str(&json)?);
        Ok(())
    }

    /// Swap in a freshly polled snapshot.
    pub fn replace_snapshot(&self, entry: E) {
        *self.entry.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(entry);
    }

    fn current(&self) -> Arc<E> {
        Arc::clone(&self.entry.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl LocalAtwDevice {
    fn update(&self, apply: impl FnOnce(&mut AtwState)) {
        let mut guard = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut Arc::make_mut(&mut guard).device);
    }
}

impl AtaDevice for LocalAtaDevice {
    fn snapshot(&self) -> Arc<AtaEntry> {
        self.current()
    }
}

impl AtwDevice for LocalAtwDevice {
    fn snapshot(&self) -> Arc<DeviceEntry> {
        self.current()
    }

    async fn set_power(&self, on: bool) -> Result<(), MelcloudError> {
        self.update(|state| state.power = on);
        Ok(())
    }

    async fn set_target_tank_temperature(&self, value: f64) -> Result<(), MelcloudError> {
        self.update(|state| state.set_tank_water_temperature = Some(value));
        Ok(())
    }

    async fn set_operation_mode(&self, mode: TankOperationMode) -> Result<(), MelcloudError> {
        self.update(|state| {
            state.forced_hot_water_mode = mode == TankOperationMode::ForceHotWater;
        });
        Ok(())
    }

    async fn set_zone_target_temperature(
        &self,
        zone: ZoneIndex,
        value: f64,
    ) -> Result<(), MelcloudError> {
        self.update(|state| state.set_zone_target_temperature(zone, value));
        Ok(())
    }

    async fn set_zone_target_flow_temperature(
        &self,
        zone: ZoneIndex,
        value: f64,
    ) -> Result<(), MelcloudError> {
        self.update(|state| state.set_zone_target_flow_temperature(zone, value));
        Ok(())
    }

    async fn set_zone_operation_mode(
        &self,
        zone: ZoneIndex,
        mode: ZoneOperationMode,
    ) -> Result<(), MelcloudError> {
        self.update(|state| state.set_zone_operation_mode(zone, mode));
        Ok(())
    }
}
