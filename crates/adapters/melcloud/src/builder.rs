//! Capability-gated entity builder.
//!
//! [`build_entity_specs`] decides which sensors exist for a device and
//! [`build_control_specs`] which controllable entities (power switch, water
//! heaters) do. Both are pure functions of [`DeviceCapabilities`]: the same
//! capabilities always produce the same specs, in the same order.
//! [`build_ata_specs`] covers air-to-air units.

use std::collections::HashSet;

use crate::ata::AtaState;
use crate::capabilities::DeviceCapabilities;
use crate::sensor::{AtaSensorKey, SensorKey, ZoneSensorKey};
use crate::snapshot::ZoneIndex;

/// Which entity to instantiate for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntitySpec {
    Sensor(SensorKey),
    ZoneSensor(ZoneSensorKey, ZoneIndex),
    PowerSwitch,
    TankWaterHeater,
    ZoneWaterHeater(ZoneIndex),
    AtaSensor(AtaSensorKey),
}

impl EntitySpec {
    /// Entity platform (the part of the entity id before the dot).
    #[must_use]
    pub const fn platform(&self) -> &'static str {
        match self {
            Self::Sensor(_) | Self::ZoneSensor(..) | Self::AtaSensor(_) => "sensor",
            Self::PowerSwitch => "switch",
            Self::TankWaterHeater | Self::ZoneWaterHeater(_) => "water_heater",
        }
    }

    /// Key unique within a device, e.g. `zone_1_flow_temperature`.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Sensor(key) => key.description().slug.to_string(),
            Self::ZoneSensor(key, zone) => key.description().slug_for(*zone),
            Self::PowerSwitch => "power".to_string(),
            Self::TankWaterHeater => "hot_water_accumulator".to_string(),
            Self::ZoneWaterHeater(zone) => {
                format!("zone_{}_heating_water_accumulator", zone.number())
            }
            Self::AtaSensor(key) => key.description().slug.to_string(),
        }
    }

    /// Display name, without the device name prefix.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Sensor(key) => key.description().name.to_string(),
            Self::ZoneSensor(key, zone) => key.description().name_for(*zone),
            Self::PowerSwitch => "Power".to_string(),
            Self::TankWaterHeater => "Hot water Accumulator".to_string(),
            Self::ZoneWaterHeater(zone) => {
                format!("Zone {} Heating water Accumulator", zone.number())
            }
            Self::AtaSensor(key) => key.description().name.to_string(),
        }
    }

    /// Entity id string, `<platform>.<device slug>_<key>`.
    #[must_use]
    pub fn entity_id(&self, device_slug: &str) -> String {
        format!("{}.{device_slug}_{}", self.platform(), self.key())
    }
}

/// Sensors that should exist for a device with `capabilities`.
#[must_use]
pub fn build_entity_specs(capabilities: DeviceCapabilities) -> Vec<EntitySpec> {
    let mut specs: Vec<EntitySpec> = [
        SensorKey::LastUpdate,
        SensorKey::CondensingTemperature,
        SensorKey::OutdoorTemperature,
        SensorKey::FlowTemperature,
        SensorKey::ReturnTemperature,
        SensorKey::DefrostMode,
        SensorKey::WaterPump1Status,
        SensorKey::BoosterHeater1Status,
        SensorKey::BoosterHeater2Status,
        SensorKey::DemandPercentage,
        SensorKey::HeatPumpFrequency,
        SensorKey::OperationMode,
        SensorKey::WifiSignal,
        SensorKey::ErrorCode,
        SensorKey::ErrorMessage,
        SensorKey::CurrentEnergyConsumed,
        SensorKey::CurrentEnergyProduced,
    ]
    .into_iter()
    .map(EntitySpec::Sensor)
    .collect();

    if capabilities.can_heat {
        specs.push(EntitySpec::Sensor(SensorKey::DailyHeatingEnergyConsumed));
        specs.push(EntitySpec::Sensor(SensorKey::DailyHeatingEnergyProduced));
    }

    if capabilities.can_cool {
        specs.push(EntitySpec::Sensor(SensorKey::DailyCoolingEnergyConsumed));
        specs.push(EntitySpec::Sensor(SensorKey::DailyCoolingEnergyProduced));
    }

    if capabilities.has_hot_water_tank {
        specs.extend(
            [
                SensorKey::DailyHotWaterEnergyConsumed,
                SensorKey::DailyHotWaterEnergyProduced,
                SensorKey::ForcedHotWaterMode,
                SensorKey::TankWaterTemperature,
            ]
            .map(EntitySpec::Sensor),
        );
    }

    if capabilities.has_thermostat_zone1 {
        push_zone_sensors(&mut specs, ZoneIndex::One);
        specs.push(EntitySpec::Sensor(SensorKey::WaterPump2Status));
    }

    if capabilities.has_thermostat_zone2_readings() {
        push_zone_sensors(&mut specs, ZoneIndex::Two);
        specs.push(EntitySpec::Sensor(SensorKey::WaterPump3Status));
    }

    if capabilities.has_hot_water_tank && capabilities.has_thermostat_zone1 {
        specs.push(EntitySpec::Sensor(SensorKey::ValveStatus3Way));
    }

    if capabilities.has_mixing_tank() {
        specs.push(EntitySpec::Sensor(SensorKey::MixingTankWaterTemperature));
    }

    specs
}

/// Controllable entities that should exist for a device with `capabilities`.
#[must_use]
pub fn build_control_specs(capabilities: DeviceCapabilities) -> Vec<EntitySpec> {
    let mut specs = vec![EntitySpec::PowerSwitch];
    if capabilities.has_controllable_tank() {
        specs.push(EntitySpec::TankWaterHeater);
    }
    if capabilities.can_heat {
        specs.extend(capabilities.zones().into_iter().map(EntitySpec::ZoneWaterHeater));
    }
    specs
}

/// Sensors that should exist for an air-to-air unit in `state`.
#[must_use]
pub fn build_ata_specs(state: &AtaState) -> Vec<EntitySpec> {
    AtaSensorKey::ALL
        .into_iter()
        .filter(|key| (key.description().enabled)(state))
        .map(EntitySpec::AtaSensor)
        .collect()
}

fn push_zone_sensors(specs: &mut Vec<EntitySpec>, zone: ZoneIndex) {
    specs.extend(
        ZoneSensorKey::ALL
            .into_iter()
            .map(|key| EntitySpec::ZoneSensor(key, zone)),
    );
}

/// Lowercase `name` and join its alphanumeric runs with underscores.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let trimmed = slug.trim_end_matches('_');
    if trimmed.is_empty() {
        "melcloud".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Slug for `name` that is not in `taken`, suffixed `_2`, `_3`, ... on clashes.
///
/// The returned slug is added to `taken`.
pub fn unique_slug(taken: &mut HashSet<String>, name: &str) -> String {
    let base = slugify(name);
    let mut slug = base.clone();
    let mut suffix = 2;
    while !taken.insert(slug.clone()) {
        slug = format!("{base}_{suffix}");
        suffix += 1;
    }
    slug
}
