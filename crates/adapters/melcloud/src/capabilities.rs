//! Static capability flags of an air-to-water device.

use crate::snapshot::{AtwState, ZoneIndex};

/// Value MELCloud reports for `MixingTankWaterTemperature` when no mixing
/// tank is fitted.
pub const MIXING_TANK_UNSET: f64 = 25.0;

/// Capability flags, captured once from the device configuration at setup.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceCapabilities {
    pub has_hot_water_tank: bool,
    pub has_zone2: bool,
    pub has_thermostat_zone1: bool,
    pub has_thermostat_zone2: bool,
    pub can_heat: bool,
    pub can_cool: bool,
    pub can_set_tank_temperature: bool,
    pub mixing_tank_water_temperature: Option<f64>,
}

impl DeviceCapabilities {
    /// Snapshot the capability flags of `state`.
    #[must_use]
    pub fn from_state(state: &AtwState) -> Self {
        Self {
            has_hot_water_tank: state.has_hot_water_tank,
            has_zone2: state.has_zone2,
            has_thermostat_zone1: state.has_thermostat_zone1,
            has_thermostat_zone2: state.has_thermostat_zone2,
            can_heat: state.can_heat,
            can_cool: state.can_cool,
            can_set_tank_temperature: state.can_set_tank_temperature,
            mixing_tank_water_temperature: state.mixing_tank_water_temperature,
        }
    }

    /// Zone 1 is always present.
    #[must_use]
    pub const fn has_zone1(&self) -> bool {
        true
    }

    /// Whether a mixing tank reading is reported and is not the "unset" sentinel.
    #[must_use]
    pub fn has_mixing_tank(&self) -> bool {
        self.mixing_tank_water_temperature
            .is_some_and(|value| (value - MIXING_TANK_UNSET).abs() > f64::EPSILON)
    }

    /// Whether zone-2 thermostat readings exist. Both flags are required.
    #[must_use]
    pub const fn has_thermostat_zone2_readings(&self) -> bool {
        self.has_thermostat_zone2 && self.has_zone2
    }

    /// Whether the device exposes a settable hot-water tank.
    #[must_use]
    pub const fn has_controllable_tank(&self) -> bool {
        self.has_hot_water_tank && self.can_set_tank_temperature
    }

    /// Zones present on the device.
    #[must_use]
    pub fn zones(&self) -> Vec<ZoneIndex> {
        if self.has_zone2 {
            vec![ZoneIndex::One, ZoneIndex::Two]
        } else {
            vec![ZoneIndex::One]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_capture_flags_from_state() {
        let state = AtwState {
            has_hot_water_tank: true,
            can_heat: true,
            mixing_tank_water_temperature: Some(31.0),
            ..AtwState::default()
        };
        let caps = DeviceCapabilities::from_state(&state);
        assert!(caps.has_hot_water_tank);
        assert!(caps.can_heat);
        assert!(!caps.can_cool);
        assert!(caps.has_mixing_tank());
    }

    #[test]
    fn should_treat_sentinel_as_no_mixing_tank() {
        let caps = DeviceCapabilities {
            mixing_tank_water_temperature: Some(25.0),
            ..DeviceCapabilities::default()
        };
        assert!(!caps.has_mixing_tank());
    }

    #[test]
    fn should_treat_missing_reading_as_no_mixing_tank() {
        assert!(!DeviceCapabilities::default().has_mixing_tank());
    }

    #[test]
    fn should_accept_readings_below_sentinel() {
        let caps = DeviceCapabilities {
            mixing_tank_water_temperature: Some(12.0),
            ..DeviceCapabilities::default()
        };
        assert!(caps.has_mixing_tank());
    }

    #[test]
    fn should_require_both_flags_for_zone2_readings() {
        let mut caps = DeviceCapabilities {
            has_thermostat_zone2: true,
            ..DeviceCapabilities::default()
        };
        assert!(!caps.has_thermostat_zone2_readings());
        caps.has_zone2 = true;
        assert!(caps.has_thermostat_zone2_readings());
    }

    #[test]
    fn should_always_have_zone1() {
        let caps = DeviceCapabilities::default();
        assert!(caps.has_zone1());
        assert_eq!(caps.zones(), vec![ZoneIndex::One]);
    }
}
