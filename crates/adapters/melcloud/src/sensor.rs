//! Read-only sensors rendered from a static description table.
//!
//! Each row of [`SENSORS`] describes one device-level sensor: its key, name,
//! presentation metadata, and how to read its value from an [`AtwState`].
//! [`ZONE_SENSORS`] does the same for per-zone readings and [`ATA_SENSORS`]
//! for air-to-air units.

use melhub_domain::entity::{
    AttributeValue, EntityBuilder, EntityCategory, EntityState, SensorDeviceClass, StateClass,
    unit,
};
use melhub_domain::time::{Timestamp, parse_utc};

use crate::ata::AtaState;
use crate::capabilities::MIXING_TANK_UNSET;
use crate::snapshot::{AtwState, ZoneIndex, ZoneSnapshot};

/// Device-level sensors, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKey {
    LastUpdate,
    CondensingTemperature,
    OutdoorTemperature,
    FlowTemperature,
    ReturnTemperature,
    DefrostMode,
    WaterPump1Status,
    BoosterHeater1Status,
    BoosterHeater2Status,
    DemandPercentage,
    HeatPumpFrequency,
    OperationMode,
    WifiSignal,
    ErrorCode,
    ErrorMessage,
    CurrentEnergyConsumed,
    CurrentEnergyProduced,
    DailyHeatingEnergyConsumed,
    DailyHeatingEnergyProduced,
    DailyCoolingEnergyConsumed,
    DailyCoolingEnergyProduced,
    DailyHotWaterEnergyConsumed,
    DailyHotWaterEnergyProduced,
    ForcedHotWaterMode,
    TankWaterTemperature,
    WaterPump2Status,
    WaterPump3Status,
    ValveStatus3Way,
    MixingTankWaterTemperature,
}

impl SensorKey {
    #[must_use]
    pub fn description(self) -> &'static SensorDescription {
        &SENSORS[self as usize]
    }
}

/// Per-zone sensors, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneSensorKey {
    TargetHcTemperature,
    FlowTemperature,
    ReturnTemperature,
    RoomTemperature,
}

impl ZoneSensorKey {
    pub const ALL: [Self; 4] = [
        Self::TargetHcTemperature,
        Self::FlowTemperature,
        Self::ReturnTemperature,
        Self::RoomTemperature,
    ];

    #[must_use]
    pub fn description(self) -> &'static ZoneSensorDescription {
        &ZONE_SENSORS[self as usize]
    }
}

/// Air-to-air sensors, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtaSensorKey {
    WifiSignal,
    RoomTemperature,
    Energy,
    DailyEnergyConsumed,
}

impl AtaSensorKey {
    pub const ALL: [Self; 4] = [
        Self::WifiSignal,
        Self::RoomTemperature,
        Self::Energy,
        Self::DailyEnergyConsumed,
    ];

    #[must_use]
    pub fn description(self) -> &'static AtaSensorDescription {
        &ATA_SENSORS[self as usize]
    }
}

/// How a sensor reads and formats its value.
#[derive(Debug, Clone, Copy)]
pub enum Reading {
    Number(fn(&AtwState) -> Option<f64>),
    /// Number rounded to one decimal.
    Rounded(fn(&AtwState) -> Option<f64>),
    Integer(fn(&AtwState) -> Option<i64>),
    Text(fn(&AtwState) -> Option<String>),
    Flag {
        read: fn(&AtwState) -> bool,
        on: &'static str,
        off: &'static str,
    },
    Timestamp(fn(&AtwState) -> Option<Timestamp>),
}

/// Icon shown next to a sensor.
#[derive(Debug, Clone, Copy)]
pub enum Icon {
    Fixed(&'static str),
    /// Follows a [`Reading::Flag`]: `on` while the flag is set.
    Toggle { on: &'static str, off: &'static str },
}

/// Presentation metadata shared by device and zone sensors.
#[derive(Debug, Clone, Copy)]
pub struct Presentation {
    pub icon: Icon,
    pub unit: Option<&'static str>,
    pub device_class: Option<SensorDeviceClass>,
    pub state_class: Option<StateClass>,
    pub category: Option<EntityCategory>,
}

/// One row of the device sensor table.
#[derive(Debug, Clone, Copy)]
pub struct SensorDescription {
    pub key: SensorKey,
    /// Object-id suffix, also used for the unique id.
    pub slug: &'static str,
    pub name: &'static str,
    pub presentation: Presentation,
    pub reading: Reading,
    pub available: fn(&AtwState) -> bool,
}

/// One row of the zone sensor table.
#[derive(Debug, Clone, Copy)]
pub struct ZoneSensorDescription {
    pub key: ZoneSensorKey,
    /// Object-id suffix after `zone_<n>_`.
    pub slug: &'static str,
    /// Name after `Zone <n> `.
    pub name: &'static str,
    pub read: fn(&ZoneSnapshot<'_>) -> Option<f64>,
}

impl ZoneSensorDescription {
    #[must_use]
    pub fn slug_for(&self, zone: ZoneIndex) -> String {
        format!("zone_{}_{}", zone.number(), self.slug)
    }

    #[must_use]
    pub fn name_for(&self, zone: ZoneIndex) -> String {
        format!("Zone {} {}", zone.number(), self.name)
    }
}

/// One row of the air-to-air sensor table.
#[derive(Debug, Clone, Copy)]
pub struct AtaSensorDescription {
    pub key: AtaSensorKey,
    pub slug: &'static str,
    pub name: &'static str,
    pub presentation: Presentation,
    pub read: fn(&AtaState) -> Option<SensorValue>,
    /// Whether the sensor is created at all for a unit.
    pub enabled: fn(&AtaState) -> bool,
}

impl AtaSensorDescription {
    #[must_use]
    pub fn render(&self, state: &AtaState, entity: EntityBuilder) -> EntityBuilder {
        let icon = match self.presentation.icon {
            Icon::Fixed(icon) | Icon::Toggle { on: icon, .. } => icon,
        };
        apply(entity, &self.presentation, icon, (self.read)(state))
    }
}

/// A rendered sensor value.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    Number(f64),
    Integer(i64),
    Text(String),
    Timestamp(Timestamp),
}

impl SensorValue {
    fn state(&self) -> String {
        match self {
            Self::Number(v) => v.to_string(),
            Self::Integer(v) => v.to_string(),
            Self::Text(v) => v.clone(),
            Self::Timestamp(v) => v.to_rfc3339(),
        }
    }

    fn attribute(&self) -> AttributeValue {
        match self {
            Self::Number(v) => AttributeValue::Float(*v),
            Self::Integer(v) => AttributeValue::Int(*v),
            Self::Text(v) => AttributeValue::String(v.clone()),
            Self::Timestamp(v) => AttributeValue::String(v.to_rfc3339()),
        }
    }
}

impl Reading {
    #[must_use]
    pub fn read(&self, state: &AtwState) -> Option<SensorValue> {
        match self {
            Self::Number(read) => read(state).map(SensorValue::Number),
            Self::Rounded(read) => read(state).map(|v| SensorValue::Number(round1(v))),
            Self::Integer(read) => read(state).map(SensorValue::Integer),
            Self::Text(read) => read(state).map(SensorValue::Text),
            Self::Flag { read, on, off } => {
                let text = if read(state) { on } else { off };
                Some(SensorValue::Text((*text).to_string()))
            }
            Self::Timestamp(read) => read(state).map(SensorValue::Timestamp),
        }
    }

    fn flag(&self, state: &AtwState) -> Option<bool> {
        match self {
            Self::Flag { read, .. } => Some(read(state)),
            _ => None,
        }
    }
}

impl SensorDescription {
    /// Current value, `None` when the sensor is unavailable or has no reading.
    #[must_use]
    pub fn value(&self, state: &AtwState) -> Option<SensorValue> {
        if (self.available)(state) {
            self.reading.read(state)
        } else {
            None
        }
    }

    /// Fill state and attributes of a sensor entity from `state`.
    #[must_use]
    pub fn render(&self, state: &AtwState, entity: EntityBuilder) -> EntityBuilder {
        let icon = match self.presentation.icon {
            Icon::Fixed(icon) => icon,
            Icon::Toggle { on, off } => match self.reading.flag(state) {
                Some(false) => off,
                _ => on,
            },
        };
        apply(entity, &self.presentation, icon, self.value(state))
    }
}

impl ZoneSensorDescription {
    #[must_use]
    pub fn render(&self, zone: &ZoneSnapshot<'_>, entity: EntityBuilder) -> EntityBuilder {
        let value = (self.read)(zone).map(SensorValue::Number);
        apply(entity, &THERMOMETER, "mdi:thermometer", value)
    }
}

fn apply(
    entity: EntityBuilder,
    presentation: &Presentation,
    icon: &'static str,
    value: Option<SensorValue>,
) -> EntityBuilder {
    let state = value
        .as_ref()
        .map_or(EntityState::Unavailable, |v| EntityState::Custom(v.state()));
    entity
        .state(state)
        .maybe_attribute("value", value.as_ref().map(SensorValue::attribute))
        .attribute("icon", AttributeValue::from(icon))
        .maybe_attribute("unit", presentation.unit.map(AttributeValue::from))
        .maybe_attribute(
            "device_class",
            presentation
                .device_class
                .map(|class| AttributeValue::from(class.as_str())),
        )
        .maybe_attribute(
            "state_class",
            presentation
                .state_class
                .map(|class| AttributeValue::from(class.as_str())),
        )
        .maybe_attribute(
            "entity_category",
            presentation
                .category
                .map(|category| AttributeValue::from(category.as_str())),
        )
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn always(_: &AtwState) -> bool {
    true
}

const THERMOMETER: Presentation = Presentation {
    icon: Icon::Fixed("mdi:thermometer"),
    unit: Some(unit::CELSIUS),
    device_class: Some(SensorDeviceClass::Temperature),
    state_class: Some(StateClass::Measurement),
    category: None,
};

const fn plain(icon: &'static str) -> Presentation {
    Presentation {
        icon: Icon::Fixed(icon),
        unit: None,
        device_class: None,
        state_class: None,
        category: None,
    }
}

const fn diagnostic(icon: &'static str) -> Presentation {
    Presentation {
        category: Some(EntityCategory::Diagnostic),
        ..plain(icon)
    }
}

const fn energy(state_class: StateClass) -> Presentation {
    Presentation {
        icon: Icon::Fixed("mdi:factory"),
        unit: Some(unit::KILO_WATT_HOUR),
        device_class: Some(SensorDeviceClass::Energy),
        state_class: Some(state_class),
        category: None,
    }
}

const PUMP: Presentation = Presentation {
    icon: Icon::Toggle {
        on: "mdi:pump",
        off: "mdi:pump-off",
    },
    ..plain("mdi:pump")
};

const fn row(
    key: SensorKey,
    slug: &'static str,
    name: &'static str,
    presentation: Presentation,
    reading: Reading,
) -> SensorDescription {
    SensorDescription {
        key,
        slug,
        name,
        presentation,
        reading,
        available: always,
    }
}

const fn on_off(read: fn(&AtwState) -> bool) -> Reading {
    Reading::Flag {
        read,
        on: "On",
        off: "Off",
    }
}

/// Device sensor table, indexed by [`SensorKey`].
pub static SENSORS: [SensorDescription; 29] = [
    row(
        SensorKey::LastUpdate,
        "last_update",
        "Last Update",
        Presentation {
            device_class: Some(SensorDeviceClass::Timestamp),
            ..diagnostic("mdi:update")
        },
        Reading::Timestamp(|s| s.last_time_stamp.as_deref().and_then(parse_utc)),
    ),
    row(
        SensorKey::CondensingTemperature,
        "condensing_temperature",
        "Condensing Temperature",
        THERMOMETER,
        Reading::Rounded(|s| s.condensing_temperature),
    ),
    row(
        SensorKey::OutdoorTemperature,
        "outside_temperature",
        "Outside Temperature",
        THERMOMETER,
        Reading::Rounded(|s| s.outdoor_temperature),
    ),
    row(
        SensorKey::FlowTemperature,
        "flow_temperature",
        "Flow Temperature",
        THERMOMETER,
        Reading::Number(|s| s.flow_temperature),
    ),
    row(
        SensorKey::ReturnTemperature,
        "return_temperature",
        "Return Temperature",
        THERMOMETER,
        Reading::Number(|s| s.return_temperature),
    ),
    row(
        SensorKey::DefrostMode,
        "defrost_mode",
        "Defrost Mode",
        plain("mdi:snowflake-melt"),
        Reading::Integer(|s| s.defrost_mode),
    ),
    row(
        SensorKey::WaterPump1Status,
        "water_pump_1_status",
        "Water Pump 1 Status",
        PUMP,
        on_off(|s| s.water_pump1_status),
    ),
    row(
        SensorKey::BoosterHeater1Status,
        "booster_heater_1_status",
        "Booster Heater 1 Status",
        plain("mdi:lightning-bolt"),
        on_off(|s| s.booster_heater1_status),
    ),
    row(
        SensorKey::BoosterHeater2Status,
        "booster_heater_2_status",
        "Booster Heater 2 Status",
        plain("mdi:lightning-bolt"),
        on_off(|s| s.booster_heater2_status),
    ),
    row(
        SensorKey::DemandPercentage,
        "demand_percentage",
        "Demand percentage",
        Presentation {
            unit: Some(unit::PERCENTAGE),
            device_class: Some(SensorDeviceClass::PowerFactor),
            state_class: Some(StateClass::Measurement),
            ..plain("mdi:sine-wave")
        },
        Reading::Number(|s| s.demand_percentage),
    ),
    row(
        SensorKey::HeatPumpFrequency,
        "heat_pump_frequency",
        "Heat Pump Frequency",
        Presentation {
            unit: Some(unit::HERTZ),
            device_class: Some(SensorDeviceClass::Frequency),
            state_class: Some(StateClass::Measurement),
            ..plain("mdi:sine-wave")
        },
        Reading::Number(|s| s.heat_pump_frequency),
    ),
    row(
        SensorKey::OperationMode,
        "heat_pump_operation_mode",
        "Operation Mode",
        plain("mdi:list-box"),
        Reading::Text(|s| Some(s.status().as_str().to_string())),
    ),
    row(
        SensorKey::WifiSignal,
        "wifi_signal",
        "WiFi Signal",
        Presentation {
            unit: Some(unit::DECIBELS_MILLIWATT),
            device_class: Some(SensorDeviceClass::SignalStrength),
            state_class: Some(StateClass::Measurement),
            ..diagnostic("mdi:signal")
        },
        Reading::Integer(|s| s.wifi_signal_strength),
    ),
    row(
        SensorKey::ErrorCode,
        "error_code",
        "Error Code",
        diagnostic("mdi:alert-circle"),
        Reading::Integer(|s| s.error_code),
    ),
    row(
        SensorKey::ErrorMessage,
        "error_message",
        "Error Message",
        diagnostic("mdi:alert-circle"),
        Reading::Text(|s| s.error_message.clone()),
    ),
    row(
        SensorKey::CurrentEnergyConsumed,
        "current_energy_consumed",
        "Current Energy Consumed",
        energy(StateClass::Measurement),
        Reading::Number(|s| s.current_energy_consumed),
    ),
    row(
        SensorKey::CurrentEnergyProduced,
        "current_energy_produced",
        "Current Energy Produced",
        energy(StateClass::Measurement),
        Reading::Number(|s| s.current_energy_produced),
    ),
    row(
        SensorKey::DailyHeatingEnergyConsumed,
        "daily_heating_energy_consumed",
        "Daily Heating Energy Consumed",
        energy(StateClass::TotalIncreasing),
        Reading::Number(|s| s.daily_heating_energy_consumed),
    ),
    row(
        SensorKey::DailyHeatingEnergyProduced,
        "daily_heating_energy_produced",
        "Daily Heating Energy Produced",
        energy(StateClass::Measurement),
        Reading::Number(|s| s.daily_heating_energy_produced),
    ),
    row(
        SensorKey::DailyCoolingEnergyConsumed,
        "daily_cooling_energy_consumed",
        "Daily Cooling Energy Consumed",
        energy(StateClass::Measurement),
        Reading::Number(|s| s.daily_cooling_energy_consumed),
    ),
    row(
        SensorKey::DailyCoolingEnergyProduced,
        "daily_cooling_energy_produced",
        "Daily Cooling Energy Produced",
        energy(StateClass::Measurement),
        Reading::Number(|s| s.daily_cooling_energy_produced),
    ),
    row(
        SensorKey::DailyHotWaterEnergyConsumed,
        "daily_hot_water_energy_consumed",
        "Daily Hot Water Energy Consumed",
        energy(StateClass::Measurement),
        Reading::Number(|s| s.daily_hot_water_energy_consumed),
    ),
    row(
        SensorKey::DailyHotWaterEnergyProduced,
        "daily_hot_water_energy_produced",
        "Daily Hot Water Energy Produced",
        energy(StateClass::Measurement),
        Reading::Number(|s| s.daily_hot_water_energy_produced),
    ),
    row(
        SensorKey::ForcedHotWaterMode,
        "forced_hot_water_mode",
        "Forced Hot Water Mode",
        plain("mdi:thermometer-water"),
        on_off(|s| s.forced_hot_water_mode),
    ),
    SensorDescription {
        available: |s| s.has_hot_water_tank,
        ..row(
            SensorKey::TankWaterTemperature,
            "tank_temperature",
            "Tank Temperature",
            THERMOMETER,
            Reading::Number(|s| s.tank_water_temperature),
        )
    },
    row(
        SensorKey::WaterPump2Status,
        "water_pump_2_status",
        "Water Pump 2 Status",
        PUMP,
        on_off(|s| s.water_pump2_status),
    ),
    row(
        SensorKey::WaterPump3Status,
        "water_pump_3_status",
        "Water Pump 3 Status",
        PUMP,
        on_off(|s| s.water_pump3_status),
    ),
    row(
        SensorKey::ValveStatus3Way,
        "valve_status_3_way",
        "3 Way Valve",
        plain("mdi:pipe-valve"),
        Reading::Flag {
            read: |s| s.valve_status3_way,
            on: "ECS",
            off: "Chauffage",
        },
    ),
    SensorDescription {
        available: |s| {
            s.mixing_tank_water_temperature
                .is_some_and(|v| v > MIXING_TANK_UNSET)
        },
        ..row(
            SensorKey::MixingTankWaterTemperature,
            "mixing_tank_water_temperature",
            "Mixing Tank Water Temperature",
            THERMOMETER,
            Reading::Rounded(|s| s.mixing_tank_water_temperature),
        )
    },
];

/// Zone sensor table, indexed by [`ZoneSensorKey`].
pub static ZONE_SENSORS: [ZoneSensorDescription; 4] = [
    ZoneSensorDescription {
        key: ZoneSensorKey::TargetHcTemperature,
        slug: "target_hc_temperature",
        name: "Target Temperature",
        read: |z| z.target_hc_temperature(),
    },
    ZoneSensorDescription {
        key: ZoneSensorKey::FlowTemperature,
        slug: "flow_temperature",
        name: "Flow Temperature",
        read: |z| z.zone_flow_temperature(),
    },
    ZoneSensorDescription {
        key: ZoneSensorKey::ReturnTemperature,
        slug: "return_temperature",
        name: "Return Temperature",
        read: |z| z.zone_return_temperature(),
    },
    ZoneSensorDescription {
        key: ZoneSensorKey::RoomTemperature,
        slug: "room_temperature",
        name: "Room Temperature",
        read: |z| z.room_temperature(),
    },
];

/// Air-to-air sensor table, indexed by [`AtaSensorKey`].
pub static ATA_SENSORS: [AtaSensorDescription; 4] = [
    AtaSensorDescription {
        key: AtaSensorKey::WifiSignal,
        slug: "wifi_signal",
        name: "WiFi Signal",
        presentation: Presentation {
            unit: Some(unit::DECIBELS_MILLIWATT),
            device_class: Some(SensorDeviceClass::SignalStrength),
            state_class: Some(StateClass::Measurement),
            ..plain("mdi:signal")
        },
        read: |s| s.wifi_signal_strength.map(SensorValue::Integer),
        enabled: |_| true,
    },
    AtaSensorDescription {
        key: AtaSensorKey::RoomTemperature,
        slug: "room_temperature",
        name: "Room Temperature",
        presentation: THERMOMETER,
        read: |s| s.room_temperature.map(SensorValue::Number),
        enabled: |_| true,
    },
    AtaSensorDescription {
        key: AtaSensorKey::Energy,
        slug: "energy",
        name: "Energy",
        presentation: energy(StateClass::TotalIncreasing),
        read: |s| s.total_energy_consumed().map(SensorValue::Number),
        enabled: |s| s.has_energy_consumed_meter,
    },
    AtaSensorDescription {
        key: AtaSensorKey::DailyEnergyConsumed,
        slug: "daily_energy_consumed",
        name: "Daily Energy Consumed",
        presentation: Presentation {
            state_class: None,
            ..energy(StateClass::Measurement)
        },
        read: |s| s.daily_energy_consumed.map(SensorValue::Number),
        enabled: |_| true,
    },
];
