//! End-to-end tests for the melhubd wiring.
//!
//! Each test assembles the same stack as the daemon (event bus, registry,
//! MELCloud integration over snapshot-backed devices) and drives it through
//! the integration port.

use std::path::PathBuf;

use melhub_adapter_melcloud::{
    DeviceKind, LocalAtaDevice, LocalAtwDevice, MelcloudConfig, MelcloudIntegration,
};
use melhub_app::event_bus::InProcessEventBus;
use melhub_app::ports::Integration;
use melhub_app::registry::InMemoryRegistry;
use melhub_domain::entity::{AttributeValue, EntityState};
use melhub_domain::event::EventType;
use serde_json::json;

const TWO_ZONES_COOLING: &str = r#"{
    "DeviceName": "Maison",
    "SerialNumber": "1900042",
    "MacAddress": "00:11:22:33:44:55",
    "Device": {
        "HasHotWaterTank": true,
        "CanSetTankTemperature": true,
        "CanHeat": true,
        "CanCool": true,
        "HasZone2": true,
        "HasThermostatZone1": true,
        "HasThermostatZone2": false,
        "MixingTankWaterTemperature": 31.5,
        "Power": true,
        "OperationMode": 3,
        "OperationModeZone1": 0,
        "OperationModeZone2": 2,
        "FlowTemperature": 22.0,
        "RoomTemperatureZone1": 24.5,
        "RoomTemperatureZone2": 23.0,
        "SetTemperatureZone1": 22.0,
        "SetTemperatureZone2": 21.0,
        "SetHeatFlowTemperatureZone2": 35.0,
        "TankWaterTemperature": 44.0,
        "SetTankWaterTemperature": 48.0,
        "MinSetTemperature": 30,
        "MaxSetTemperature": 55,
        "OutdoorTemperature": 29.84
    }
}"#;

const LIVING_ROOM_AC: &str = r#"{
    "DeviceName": "Salon",
    "SerialNumber": "1700077",
    "MacAddress": "66:55:44:33:22:11",
    "Device": {
        "DeviceType": 0,
        "HasEnergyConsumedMeter": false,
        "RoomTemperature": 23.5,
        "WifiSignalStrength": -70,
        "DailyEnergyConsumed": 1.8
    }
}"#;

type Registry = InMemoryRegistry<InProcessEventBus>;

async fn stack(json: &str) -> (MelcloudIntegration<LocalAtwDevice>, Registry, InProcessEventBus) {
    let bus = InProcessEventBus::new(256);
    let registry = InMemoryRegistry::new(bus.clone());
    let device = LocalAtwDevice::from_json(json).expect("fixture should parse");
    let mut integration = MelcloudIntegration::new(MelcloudConfig::default(), vec![device]);
    integration
        .setup(&registry)
        .await
        .expect("setup should succeed");
    (integration, registry, bus)
}

async fn mixed_stack(
    atw: &[&str],
    ata: &[&str],
) -> (MelcloudIntegration<LocalAtwDevice, LocalAtaDevice>, Registry) {
    let registry = InMemoryRegistry::new(InProcessEventBus::new(256));
    let atw = atw
        .iter()
        .map(|json| LocalAtwDevice::from_json(json).expect("fixture should parse"))
        .collect();
    let ata = ata
        .iter()
        .map(|json| LocalAtaDevice::from_json(json).expect("fixture should parse"))
        .collect();
    let mut integration =
        MelcloudIntegration::new(MelcloudConfig::default(), atw).with_ata_devices(ata);
    integration
        .setup(&registry)
        .await
        .expect("setup should succeed");
    (integration, registry)
}

fn snapshot_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("melhubd-{}-{name}.json", std::process::id()))
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_register_one_device() {
    let (_integration, registry, _bus) = stack(TWO_ZONES_COOLING).await;
    let devices = registry.devices();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].name, "Maison");
    assert_eq!(devices[0].integration, "melcloud");
}

#[tokio::test]
async fn should_expose_capability_gated_entities() {
    let (_integration, registry, _bus) = stack(TWO_ZONES_COOLING).await;

    assert!(registry.entity("sensor.maison_daily_cooling_energy_consumed").is_some());
    assert!(registry.entity("sensor.maison_mixing_tank_water_temperature").is_some());
    assert!(registry.entity("sensor.maison_zone_2_flow_temperature").is_none());
    assert!(registry.entity("water_heater.maison_zone_2_heating_water_accumulator").is_some());
    assert!(registry.entity("sensor.maison_zone_2_room_temperature").is_none());
    assert!(registry.entity("sensor.maison_zone_1_room_temperature").is_some());
}

#[tokio::test]
async fn should_render_zones_by_operation_mode() {
    let (_integration, registry, _bus) = stack(TWO_ZONES_COOLING).await;

    let zone1 = registry
        .entity("water_heater.maison_zone_1_heating_water_accumulator")
        .unwrap();
    assert_eq!(zone1.state, EntityState::Custom("heat-thermostat".to_string()));
    assert_eq!(
        zone1.get_attribute("current_temperature"),
        Some(&AttributeValue::Float(24.5))
    );
    assert_eq!(zone1.get_attribute("temperature"), Some(&AttributeValue::Float(22.0)));

    let zone2 = registry
        .entity("water_heater.maison_zone_2_heating_water_accumulator")
        .unwrap();
    assert_eq!(zone2.state, EntityState::Custom("curve".to_string()));
    assert_eq!(zone2.get_attribute("current_temperature"), None);
    assert_eq!(zone2.get_attribute("temperature"), None);
    assert_eq!(zone2.get_attribute("supported_features"), Some(&AttributeValue::Int(2)));
}

#[tokio::test]
async fn should_use_device_reported_tank_limits() {
    let (_integration, registry, _bus) = stack(TWO_ZONES_COOLING).await;
    let tank = registry
        .entity("water_heater.maison_hot_water_accumulator")
        .unwrap();
    assert_eq!(tank.get_attribute("min_temp"), Some(&AttributeValue::Float(30.0)));
    assert_eq!(tank.get_attribute("max_temp"), Some(&AttributeValue::Float(55.0)));
}

#[tokio::test]
async fn should_register_air_to_air_unit_next_to_heat_pump() {
    assert_eq!(DeviceKind::of_json(LIVING_ROOM_AC).unwrap(), DeviceKind::Ata);
    let (_integration, registry) = mixed_stack(&[TWO_ZONES_COOLING], &[LIVING_ROOM_AC]).await;

    assert_eq!(registry.devices().len(), 2);
    let room = registry.entity("sensor.salon_room_temperature").unwrap();
    assert_eq!(room.state, EntityState::Custom("23.5".to_string()));
    assert_eq!(room.friendly_name, "Salon Room Temperature");
    assert!(registry.entity("sensor.salon_wifi_signal").is_some());
    assert!(registry.entity("sensor.salon_daily_energy_consumed").is_some());
    assert!(registry.entity("sensor.salon_energy").is_none());
}

#[tokio::test]
async fn should_register_same_name_heat_pumps_separately() {
    let other = TWO_ZONES_COOLING.replace("1900042", "1900043");
    let (integration, registry) = mixed_stack(&[TWO_ZONES_COOLING, other.as_str()], &[]).await;

    assert_eq!(registry.devices().len(), 2);
    let first = registry.entity("switch.maison_power").unwrap();
    let second = registry.entity("switch.maison_2_power").unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(integration.capabilities().len(), 2);
}

#[tokio::test]
async fn should_skip_unnamed_heat_pump() {
    let unnamed = TWO_ZONES_COOLING
        .replace("1900042", "1900044")
        .replace("\"Maison\"", "\"  \"");
    let (_integration, registry) = mixed_stack(&[unnamed.as_str(), TWO_ZONES_COOLING], &[]).await;

    assert_eq!(registry.devices().len(), 1);
    assert!(registry.entity("switch.maison_power").is_some());
}

// ---------------------------------------------------------------------------
// Service calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_set_zone_temperature_and_publish_change() {
    let (integration, registry, bus) = stack(TWO_ZONES_COOLING).await;
    let mut events = bus.subscribe();
    let zone1 = registry
        .entity("water_heater.maison_zone_1_heating_water_accumulator")
        .unwrap();

    let updated = integration
        .handle_service_call(zone1.id, "set_temperature", json!({ "temperature": 20.5 }))
        .await
        .unwrap();
    assert_eq!(updated.get_attribute("temperature"), Some(&AttributeValue::Float(20.5)));

    integration.refresh(&registry).await.unwrap();
    let stored = registry
        .entity("water_heater.maison_zone_1_heating_water_accumulator")
        .unwrap();
    assert_eq!(stored.get_attribute("temperature"), Some(&AttributeValue::Float(20.5)));

    let event = events.recv().await.unwrap();
    assert_eq!(event.event_type, EventType::AttributeChanged);
}

#[tokio::test]
async fn should_reject_temperature_for_curve_zone() {
    let (integration, registry, _bus) = stack(TWO_ZONES_COOLING).await;
    let zone2 = registry
        .entity("water_heater.maison_zone_2_heating_water_accumulator")
        .unwrap();

    let result = integration
        .handle_service_call(zone2.id, "set_temperature", json!({ "temperature": 36.0 }))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn should_switch_power_off() {
    let (integration, registry, _bus) = stack(TWO_ZONES_COOLING).await;
    let power = registry.entity("switch.maison_power").unwrap();

    let updated = integration
        .handle_service_call(power.id, "turn_off", json!({}))
        .await
        .unwrap();
    assert_eq!(updated.state, EntityState::Off);
}

#[tokio::test]
async fn should_reject_service_call_on_sensor() {
    let (integration, registry, _bus) = stack(TWO_ZONES_COOLING).await;
    let outdoor = registry.entity("sensor.maison_outside_temperature").unwrap();

    let result = integration
        .handle_service_call(outdoor.id, "turn_on", json!({}))
        .await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_pick_up_reloaded_snapshot_on_refresh() {
    let (integration, registry, _bus) = stack(TWO_ZONES_COOLING).await;
    let path = snapshot_path("reload");
    let warmer = TWO_ZONES_COOLING.replace("\"OutdoorTemperature\": 29.84", "\"OutdoorTemperature\": 31.2");
    std::fs::write(&path, warmer).unwrap();

    integration.devices()[0].reload_file(&path).unwrap();
    integration.refresh(&registry).await.unwrap();
    std::fs::remove_file(&path).unwrap();

    let outdoor = registry.entity("sensor.maison_outside_temperature").unwrap();
    assert_eq!(outdoor.state, EntityState::Custom("31.2".to_string()));
}

#[tokio::test]
async fn should_keep_entity_set_after_capability_change() {
    let (integration, registry, _bus) = stack(TWO_ZONES_COOLING).await;
    let path = snapshot_path("capabilities");
    let no_cooling = TWO_ZONES_COOLING.replace("\"CanCool\": true", "\"CanCool\": false");
    std::fs::write(&path, no_cooling).unwrap();

    integration.devices()[0].reload_file(&path).unwrap();
    integration.refresh(&registry).await.unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(registry.entity("sensor.maison_daily_cooling_energy_consumed").is_some());
    assert!(integration.capabilities()[0].can_cool);
}

#[tokio::test]
async fn should_pick_up_reloaded_air_to_air_snapshot() {
    let (integration, registry) = mixed_stack(&[], &[LIVING_ROOM_AC]).await;
    let path = snapshot_path("reload-ata");
    std::fs::write(&path, LIVING_ROOM_AC.replace("23.5", "25.0")).unwrap();

    integration.ata_devices()[0].reload_file(&path).unwrap();
    integration.refresh(&registry).await.unwrap();
    std::fs::remove_file(&path).unwrap();

    let room = registry.entity("sensor.salon_room_temperature").unwrap();
    assert_eq!(room.state, EntityState::Custom("25".to_string()));
}

#[tokio::test]
async fn should_clear_bindings_on_teardown() {
    let (mut integration, registry, _bus) = stack(TWO_ZONES_COOLING).await;
    let power = registry.entity("switch.maison_power").unwrap();

    integration.teardown().await.unwrap();
    assert!(!integration.owns_entity(power.id));
}
