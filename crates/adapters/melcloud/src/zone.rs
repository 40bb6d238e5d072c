//! Mode-dependent value selection for zones.
//!
//! A zone is either flow-controlled (the heat pump regulates its water
//! temperature) or thermostat-controlled (it regulates the room
//! temperature). Which pair of readings represents "current" and "target"
//! follows the live [`ZoneOperationMode`].

use melhub_domain::water_heater::WaterHeaterFeatures;

use crate::device::AtwDevice;
use crate::error::MelcloudError;
use crate::snapshot::{ZoneIndex, ZoneOperationMode, ZoneSnapshot};

/// Which readings drive a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneControl {
    /// heat-flow, cool-flow: device flow temperature and zone flow setpoint.
    Flow,
    /// heat-thermostat, cool-thermostat: room temperature and room setpoint.
    Thermostat,
    /// Any other mode. No temperature applies.
    Unsupported(ZoneOperationMode),
}

impl ZoneControl {
    #[must_use]
    pub fn of(mode: ZoneOperationMode) -> Self {
        match mode {
            ZoneOperationMode::HeatFlow | ZoneOperationMode::CoolFlow => Self::Flow,
            ZoneOperationMode::HeatThermostat | ZoneOperationMode::CoolThermostat => {
                Self::Thermostat
            }
            other => Self::Unsupported(other),
        }
    }

    #[must_use]
    pub fn current_temperature(self, zone: &ZoneSnapshot<'_>) -> Option<f64> {
        match self {
            Self::Flow => zone.flow_temperature(),
            Self::Thermostat => zone.room_temperature(),
            Self::Unsupported(_) => None,
        }
    }

    #[must_use]
    pub fn target_temperature(self, zone: &ZoneSnapshot<'_>) -> Option<f64> {
        match self {
            Self::Flow => zone.target_flow_temperature(),
            Self::Thermostat => zone.target_temperature(),
            Self::Unsupported(_) => None,
        }
    }

    #[must_use]
    pub fn supported_features(self) -> WaterHeaterFeatures {
        match self {
            Self::Flow | Self::Thermostat => {
                WaterHeaterFeatures::TARGET_TEMPERATURE | WaterHeaterFeatures::OPERATION_MODE
            }
            Self::Unsupported(_) => WaterHeaterFeatures::OPERATION_MODE,
        }
    }
}

/// Temperature currently measured for the zone, if its mode defines one.
#[must_use]
pub fn current_temperature(zone: &ZoneSnapshot<'_>) -> Option<f64> {
    ZoneControl::of(zone.operation_mode()).current_temperature(zone)
}

/// Temperature the zone is regulated towards, if its mode defines one.
#[must_use]
pub fn target_temperature(zone: &ZoneSnapshot<'_>) -> Option<f64> {
    ZoneControl::of(zone.operation_mode()).target_temperature(zone)
}

#[must_use]
pub fn supported_features(zone: &ZoneSnapshot<'_>) -> WaterHeaterFeatures {
    ZoneControl::of(zone.operation_mode()).supported_features()
}

/// Set the zone's target through the setter matching its current mode.
///
/// Without a `value` the current target is written back unchanged.
///
/// # Errors
///
/// - [`MelcloudError::UnsupportedMode`] when the mode has no target.
/// - [`MelcloudError::NoTargetTemperature`] when `value` is omitted and the
///   zone reports no target.
/// - Any command failure from `device`, unchanged.
pub async fn set_target_temperature<D: AtwDevice>(
    device: &D,
    zone: ZoneIndex,
    value: Option<f64>,
) -> Result<(), MelcloudError> {
    let (control, value) = {
        let entry = device.snapshot();
        let snapshot = entry.device.zone(zone);
        let control = ZoneControl::of(snapshot.operation_mode());
        (control, value.or_else(|| control.target_temperature(&snapshot)))
    };

    tracing::debug!(%zone, ?control, ?value, "setting zone target temperature");
    match control {
        ZoneControl::Flow => {
            let value = value.ok_or(MelcloudError::NoTargetTemperature)?;
            device.set_zone_target_flow_temperature(zone, value).await
        }
        ZoneControl::Thermostat => {
            let value = value.ok_or(MelcloudError::NoTargetTemperature)?;
            device.set_zone_target_temperature(zone, value).await
        }
        ZoneControl::Unsupported(mode) => Err(MelcloudError::UnsupportedMode(mode)),
    }
}
