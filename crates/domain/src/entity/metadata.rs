//! Presentation metadata for entities: device classes, state classes,
//! categories, and units.

use serde::{Deserialize, Serialize};

/// What a sensor measures. Drives the default icon and unit handling in UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorDeviceClass {
    Energy,
    Frequency,
    PowerFactor,
    SignalStrength,
    Temperature,
    Timestamp,
}

impl SensorDeviceClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Frequency => "frequency",
            Self::PowerFactor => "power_factor",
            Self::SignalStrength => "signal_strength",
            Self::Temperature => "temperature",
            Self::Timestamp => "timestamp",
        }
    }
}

/// How successive sensor values relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    /// A point-in-time reading.
    Measurement,
    /// A counter that only grows, except for resets.
    TotalIncreasing,
}

impl StateClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Measurement => "measurement",
            Self::TotalIncreasing => "total_increasing",
        }
    }
}

/// Classification of a non-primary entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    /// Changes the configuration of a device.
    Config,
    /// Exposes diagnostics of a device without allowing changes (RSSI, error codes).
    Diagnostic,
}

impl EntityCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Diagnostic => "diagnostic",
        }
    }
}

/// Units of measurement.
pub mod unit {
    pub const CELSIUS: &str = "\u{b0}C";
    pub const KILO_WATT_HOUR: &str = "kWh";
    pub const HERTZ: &str = "Hz";
    pub const PERCENTAGE: &str = "%";
    pub const DECIBELS_MILLIWATT: &str = "dBm";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_device_class_in_snake_case() {
        let json = serde_json::to_string(&SensorDeviceClass::PowerFactor).unwrap();
        assert_eq!(json, "\"power_factor\"");
        assert_eq!(SensorDeviceClass::PowerFactor.as_str(), "power_factor");
    }

    #[test]
    fn should_match_serde_names_for_state_class() {
        for class in [StateClass::Measurement, StateClass::TotalIncreasing] {
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{}\"", class.as_str()));
        }
    }

    #[test]
    fn should_render_diagnostic_category() {
        assert_eq!(EntityCategory::Diagnostic.as_str(), "diagnostic");
    }
}
