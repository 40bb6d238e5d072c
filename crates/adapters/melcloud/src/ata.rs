//! Air-to-air (ATA) units.
//!
//! MELCloud lists air conditioners next to heat pumps. They are exposed as
//! read-only sensors (see [`AtaSensorKey`](crate::sensor::AtaSensorKey));
//! the listing layout is the same as for ATW devices, with a smaller status.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::snapshot::{lenient_bool, lenient_int, lenient_number};

/// One air-to-air unit as listed by MELCloud.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AtaEntry {
    pub device_name: String,
    pub serial_number: String,
    pub mac_address: String,
    pub device: AtaState,
}

impl AtaEntry {
    /// Integration-scoped unique id (`<serial>-<mac>`).
    #[must_use]
    pub fn unique_id(&self) -> String {
        format!("{}-{}", self.serial_number, self.mac_address)
    }
}

/// Live status of an air-to-air unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AtaState {
    #[serde(deserialize_with = "lenient_bool")]
    pub has_energy_consumed_meter: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub power: bool,
    #[serde(deserialize_with = "lenient_number")]
    pub room_temperature: Option<f64>,
    #[serde(deserialize_with = "lenient_int")]
    pub wifi_signal_strength: Option<i64>,
    /// Lifetime meter reading in Wh.
    #[serde(deserialize_with = "lenient_number")]
    pub current_energy_consumed: Option<f64>,
    /// Energy used today in kWh, from the daily energy report.
    #[serde(deserialize_with = "lenient_number")]
    pub daily_energy_consumed: Option<f64>,
}

impl AtaState {
    /// Lifetime consumption in kWh, `None` without a meter reading.
    #[must_use]
    pub fn total_energy_consumed(&self) -> Option<f64> {
        self.current_energy_consumed.map(|wh| wh / 1000.0)
    }
}

/// One air-to-air unit as seen by the integration.
pub trait AtaDevice: Send + Sync {
    /// Latest polled snapshot.
    fn snapshot(&self) -> Arc<AtaEntry>;
}
