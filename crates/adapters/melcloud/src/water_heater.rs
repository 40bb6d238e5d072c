//! Water-heater entities: the domestic hot-water tank and one per zone.
//!
//! State is the current operation mode. Attributes follow the usual
//! water-heater shape: `current_temperature`, `temperature` (target),
//! `min_temp`, `max_temp`, `operation_mode`, `operation_list`,
//! `supported_features`, `unit`.

use melhub_domain::entity::{AttributeValue, EntityBuilder, EntityState, unit};
use melhub_domain::error::{HubError, ValidationError};
use melhub_domain::water_heater::WaterHeaterFeatures;

use crate::config::MelcloudConfig;
use crate::device::AtwDevice;
use crate::error::MelcloudError;
use crate::snapshot::{AtwState, TankOperationMode, ZoneIndex, ZoneOperationMode};
use crate::zone::{self, ZoneControl};

/// Render the hot-water tank.
#[must_use]
pub fn render_tank(state: &AtwState, config: &MelcloudConfig, entity: EntityBuilder) -> EntityBuilder {
    let mode = state.tank_operation_mode();
    let operations = TankOperationMode::ALL.map(TankOperationMode::as_str);
    let features = WaterHeaterFeatures::TARGET_TEMPERATURE | WaterHeaterFeatures::OPERATION_MODE;

    common(
        entity,
        mode.as_str(),
        &operations,
        features,
        (
            reported_or(state.min_set_temperature, config.tank_min_temperature),
            reported_or(state.max_set_temperature, config.max_temperature),
        ),
    )
    .maybe_attribute(
        "current_temperature",
        state.tank_water_temperature.map(AttributeValue::Float),
    )
    .maybe_attribute(
        "temperature",
        state.set_tank_water_temperature.map(AttributeValue::Float),
    )
    .attribute("status", AttributeValue::from(state.status().as_str()))
}

/// Render the water heater of one zone.
#[must_use]
pub fn render_zone(
    state: &AtwState,
    index: ZoneIndex,
    config: &MelcloudConfig,
    entity: EntityBuilder,
) -> EntityBuilder {
    let zone = state.zone(index);
    let mode = zone.operation_mode();
    let control = ZoneControl::of(mode);
    let operations = ZoneOperationMode::SELECTABLE.map(ZoneOperationMode::as_str);

    common(
        entity,
        mode.as_str(),
        &operations,
        control.supported_features(),
        (
            config.zone_min_temperature,
            reported_or(state.max_set_temperature, config.max_temperature),
        ),
    )
    .maybe_attribute(
        "current_temperature",
        control.current_temperature(&zone).map(AttributeValue::Float),
    )
    .maybe_attribute(
        "temperature",
        control.target_temperature(&zone).map(AttributeValue::Float),
    )
}

/// Handle a service call on the tank.
///
/// # Errors
///
/// Returns [`ValidationError::UnsupportedService`] for unknown services,
/// [`ValidationError::InvalidServiceData`] for malformed payloads, and the
/// device error if the command fails.
pub async fn call_tank<D: AtwDevice>(
    device: &D,
    entity_id: &str,
    service: &str,
    data: &serde_json::Value,
) -> Result<(), HubError> {
    match service {
        "set_temperature" => {
            let value = match temperature_arg(data)? {
                Some(value) => value,
                None => device
                    .snapshot()
                    .device
                    .set_tank_water_temperature
                    .ok_or(MelcloudError::NoTargetTemperature)?,
            };
            device.set_target_tank_temperature(value).await?;
        }
        "set_operation_mode" => {
            let mode = operation_mode_arg(data)?.parse::<TankOperationMode>()?;
            device.set_operation_mode(mode).await?;
        }
        "turn_on" => device.set_power(true).await?,
        "turn_off" => device.set_power(false).await?,
        _ => return Err(unsupported(entity_id, service)),
    }
    Ok(())
}

/// Handle a service call on a zone.
///
/// # Errors
///
/// Same as [`call_tank`]. Setting a temperature while the zone is in a mode
/// without target fails with [`MelcloudError::UnsupportedMode`].
pub async fn call_zone<D: AtwDevice>(
    device: &D,
    index: ZoneIndex,
    entity_id: &str,
    service: &str,
    data: &serde_json::Value,
) -> Result<(), HubError> {
    match service {
        "set_temperature" => {
            zone::set_target_temperature(device, index, temperature_arg(data)?).await?;
        }
        "set_operation_mode" => {
            let mode = operation_mode_arg(data)?.parse::<ZoneOperationMode>()?;
            device.set_zone_operation_mode(index, mode).await?;
        }
        _ => return Err(unsupported(entity_id, service)),
    }
    Ok(())
}

fn common(
    entity: EntityBuilder,
    operation: &str,
    operations: &[&str],
    features: WaterHeaterFeatures,
    (min, max): (f64, f64),
) -> EntityBuilder {
    entity
        .state(EntityState::Custom(operation.to_string()))
        .attribute("operation_mode", AttributeValue::from(operation))
        .attribute(
            "operation_list",
            AttributeValue::Json(serde_json::json!(operations)),
        )
        .attribute(
            "supported_features",
            AttributeValue::Int(i64::from(features.bits())),
        )
        .attribute("min_temp", AttributeValue::Float(min))
        .attribute("max_temp", AttributeValue::Float(max))
        .attribute("unit", AttributeValue::from(unit::CELSIUS))
}

/// Device-reported bound, falling back when absent or zero.
fn reported_or(reported: Option<f64>, fallback: f64) -> f64 {
    reported
        .filter(|value| value.abs() > f64::EPSILON)
        .unwrap_or(fallback)
}

fn temperature_arg(data: &serde_json::Value) -> Result<Option<f64>, ValidationError> {
    match data.get("temperature") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(ValidationError::InvalidServiceData {
                field: "temperature",
                reason: "must be a number",
            }),
    }
}

fn operation_mode_arg(data: &serde_json::Value) -> Result<&str, ValidationError> {
    data.get("operation_mode")
        .and_then(serde_json::Value::as_str)
        .ok_or(ValidationError::InvalidServiceData {
            field: "operation_mode",
            reason: "must be a string",
        })
}

fn unsupported(entity_id: &str, service: &str) -> HubError {
    ValidationError::UnsupportedService {
        entity_id: entity_id.to_string(),
        service: service.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::LocalAtwDevice;
    use crate::snapshot::DeviceEntry;
    use melhub_domain::entity::Entity;
    use serde_json::json;

    const TANK_ID: &str = "water_heater.heat_pump_hot_water_accumulator";

    fn tank_state() -> AtwState {
        AtwState {
            has_hot_water_tank: true,
            can_set_tank_temperature: true,
            tank_water_temperature: Some(47.5),
            set_tank_water_temperature: Some(50.0),
            operation_mode: Some(1),
            max_set_temperature: Some(0.0),
            ..AtwState::default()
        }
    }

    fn device(state: AtwState) -> LocalAtwDevice {
        LocalAtwDevice::new(DeviceEntry {
            device: state,
            ..DeviceEntry::default()
        })
    }

    fn tank_entity(state: &AtwState) -> Entity {
        let builder = Entity::builder()
            .entity_id(TANK_ID)
            .friendly_name("Heat pump Hot water Accumulator");
        render_tank(state, &MelcloudConfig::default(), builder)
            .build()
            .unwrap()
    }

    fn zone_entity(state: &AtwState) -> Entity {
        let builder = Entity::builder()
            .entity_id("water_heater.heat_pump_zone_1_heating_water_accumulator")
            .friendly_name("Heat pump Zone 1 Heating water Accumulator");
        render_zone(state, ZoneIndex::One, &MelcloudConfig::default(), builder)
            .build()
            .unwrap()
    }

    #[test]
    fn should_render_tank_state() {
        let entity = tank_entity(&tank_state());
        assert_eq!(entity.state, EntityState::Custom("auto".to_string()));
        assert_eq!(
            entity.get_attribute("current_temperature"),
            Some(&AttributeValue::Float(47.5))
        );
        assert_eq!(
            entity.get_attribute("temperature"),
            Some(&AttributeValue::Float(50.0))
        );
        assert_eq!(
            entity.get_attribute("status"),
            Some(&AttributeValue::from("heat_water"))
        );
        assert_eq!(
            entity.get_attribute("operation_list"),
            Some(&AttributeValue::Json(json!(["auto", "force_hot_water"])))
        );
        assert_eq!(
            entity.get_attribute("supported_features"),
            Some(&AttributeValue::Int(3))
        );
    }

    #[test]
    fn should_fall_back_to_default_bounds_for_tank() {
        let entity = tank_entity(&tank_state());
        assert_eq!(entity.get_attribute("min_temp"), Some(&AttributeValue::Float(10.0)));
        assert_eq!(entity.get_attribute("max_temp"), Some(&AttributeValue::Float(60.0)));
    }

    #[test]
    fn should_use_reported_tank_bounds() {
        let state = AtwState {
            min_set_temperature: Some(30.0),
            max_set_temperature: Some(55.0),
            ..tank_state()
        };
        let entity = tank_entity(&state);
        assert_eq!(entity.get_attribute("min_temp"), Some(&AttributeValue::Float(30.0)));
        assert_eq!(entity.get_attribute("max_temp"), Some(&AttributeValue::Float(55.0)));
    }

    #[test]
    fn should_render_zone_in_thermostat_mode() {
        let state = AtwState {
            operation_mode_zone1: Some(0),
            room_temperature_zone1: Some(20.5),
            set_temperature_zone1: Some(21.0),
            min_set_temperature: Some(30.0),
            ..AtwState::default()
        };
        let entity = zone_entity(&state);
        assert_eq!(entity.state, EntityState::Custom("heat-thermostat".to_string()));
        assert_eq!(
            entity.get_attribute("current_temperature"),
            Some(&AttributeValue::Float(20.5))
        );
        assert_eq!(
            entity.get_attribute("temperature"),
            Some(&AttributeValue::Float(21.0))
        );
        assert_eq!(entity.get_attribute("min_temp"), Some(&AttributeValue::Float(10.0)));
    }

    #[test]
    fn should_render_zone_in_curve_mode_without_temperatures() {
        let state = AtwState {
            operation_mode_zone1: Some(2),
            flow_temperature: Some(38.0),
            ..AtwState::default()
        };
        let entity = zone_entity(&state);
        assert_eq!(entity.state, EntityState::Custom("curve".to_string()));
        assert!(entity.get_attribute("current_temperature").is_none());
        assert!(entity.get_attribute("temperature").is_none());
        assert_eq!(
            entity.get_attribute("supported_features"),
            Some(&AttributeValue::Int(2))
        );
    }

    #[tokio::test]
    async fn should_set_tank_temperature() {
        let device = device(tank_state());
        call_tank(&device, TANK_ID, "set_temperature", &json!({"temperature": 55.0}))
            .await
            .unwrap();
        assert_eq!(device.snapshot().device.set_tank_water_temperature, Some(55.0));
    }

    #[tokio::test]
    async fn should_reassert_tank_target_when_temperature_omitted() {
        let device = device(tank_state());
        call_tank(&device, TANK_ID, "set_temperature", &json!({}))
            .await
            .unwrap();
        assert_eq!(device.snapshot().device.set_tank_water_temperature, Some(50.0));
    }

    #[tokio::test]
    async fn should_reject_non_numeric_temperature() {
        let device = device(tank_state());
        let result = call_tank(&device, TANK_ID, "set_temperature", &json!({"temperature": "hot"})).await;
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::InvalidServiceData {
                field: "temperature",
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn should_force_hot_water() {
        let device = device(tank_state());
        call_tank(
            &device,
            TANK_ID,
            "set_operation_mode",
            &json!({"operation_mode": "force_hot_water"}),
        )
        .await
        .unwrap();
        assert!(device.snapshot().device.forced_hot_water_mode);
    }

    #[tokio::test]
    async fn should_reject_unknown_tank_mode() {
        let device = device(tank_state());
        let result = call_tank(
            &device,
            TANK_ID,
            "set_operation_mode",
            &json!({"operation_mode": "eco"}),
        )
        .await;
        assert!(matches!(result, Err(HubError::Integration(_))));
    }

    #[tokio::test]
    async fn should_switch_power_from_tank() {
        let device = device(tank_state());
        call_tank(&device, TANK_ID, "turn_on", &json!({})).await.unwrap();
        assert!(device.snapshot().device.power);
        call_tank(&device, TANK_ID, "turn_off", &json!({})).await.unwrap();
        assert!(!device.snapshot().device.power);
    }

    #[tokio::test]
    async fn should_reject_unknown_tank_service() {
        let device = device(tank_state());
        let result = call_tank(&device, TANK_ID, "boost", &json!({})).await;
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::UnsupportedService { .. }))
        ));
    }

    #[tokio::test]
    async fn should_change_zone_operation_mode() {
        let device = device(AtwState {
            operation_mode_zone1: Some(0),
            ..AtwState::default()
        });
        call_zone(
            &device,
            ZoneIndex::One,
            "water_heater.heat_pump_zone_1_heating_water_accumulator",
            "set_operation_mode",
            &json!({"operation_mode": "heat-flow"}),
        )
        .await
        .unwrap();
        assert_eq!(device.snapshot().device.operation_mode_zone1, Some(1));
    }

    #[tokio::test]
    async fn should_surface_unsupported_mode_as_integration_error() {
        let device = device(AtwState {
            operation_mode_zone1: Some(2),
            ..AtwState::default()
        });
        let result = call_zone(
            &device,
            ZoneIndex::One,
            "water_heater.heat_pump_zone_1_heating_water_accumulator",
            "set_temperature",
            &json!({"temperature": 35.0}),
        )
        .await;
        assert!(matches!(result, Err(HubError::Integration(_))));
    }
}
