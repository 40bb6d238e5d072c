//! MELCloud integration configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the MELCloud integration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MelcloudConfig {
    /// JSON device snapshots to load, one MELCloud listing entry per file.
    pub snapshot_files: Vec<PathBuf>,
    /// Lower tank setpoint bound when the device reports none.
    pub tank_min_temperature: f64,
    /// Upper setpoint bound when the device reports none.
    pub max_temperature: f64,
    /// Lower zone setpoint bound.
    pub zone_min_temperature: f64,
}

impl Default for MelcloudConfig {
    fn default() -> Self {
        Self {
            snapshot_files: Vec::new(),
            tank_min_temperature: 10.0,
            max_temperature: 60.0,
            zone_min_temperature: 10.0,
        }
    }
}
