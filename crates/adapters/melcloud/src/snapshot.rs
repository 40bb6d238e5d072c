//! Device snapshot — the polled MELCloud status of an air-to-water device.
//!
//! The JSON layout mirrors a MELCloud device listing entry: device metadata at
//! the top level and the live status under `Device`, all in `PascalCase`.
//! Every field is optional; flags that are missing, `null`, or not booleans
//! read as `false`, and numbers that are not numbers read as absent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MelcloudError;

/// One device as listed by MELCloud.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeviceEntry {
    pub device_name: String,
    pub serial_number: String,
    pub mac_address: String,
    pub device: AtwState,
}

impl DeviceEntry {
    /// Integration-scoped unique id (`<serial>-<mac>`).
    #[must_use]
    pub fn unique_id(&self) -> String {
        format!("{}-{}", self.serial_number, self.mac_address)
    }
}

/// Live status of an air-to-water heat pump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AtwState {
    // capability flags
    #[serde(deserialize_with = "lenient_bool")]
    pub has_hot_water_tank: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub has_zone2: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub has_thermostat_zone1: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub has_thermostat_zone2: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub can_heat: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub can_cool: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub can_set_tank_temperature: bool,
    #[serde(deserialize_with = "lenient_number")]
    pub mixing_tank_water_temperature: Option<f64>,

    // operation
    #[serde(deserialize_with = "lenient_bool")]
    pub power: bool,
    #[serde(deserialize_with = "lenient_int")]
    pub operation_mode: Option<i64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub forced_hot_water_mode: bool,
    #[serde(deserialize_with = "lenient_int")]
    pub operation_mode_zone1: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    pub operation_mode_zone2: Option<i64>,

    // heat pump temperatures
    #[serde(deserialize_with = "lenient_number")]
    pub condensing_temperature: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub outdoor_temperature: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub flow_temperature: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub return_temperature: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub tank_water_temperature: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub set_tank_water_temperature: Option<f64>,

    // zone temperatures
    #[serde(deserialize_with = "lenient_number")]
    pub flow_temperature_zone1: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub flow_temperature_zone2: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub return_temperature_zone1: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub return_temperature_zone2: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub room_temperature_zone1: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub room_temperature_zone2: Option<f64>,
    #[serde(rename = "TargetHCTemperatureZone1", deserialize_with = "lenient_number")]
    pub target_hc_temperature_zone1: Option<f64>,
    #[serde(rename = "TargetHCTemperatureZone2", deserialize_with = "lenient_number")]
    pub target_hc_temperature_zone2: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub set_temperature_zone1: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub set_temperature_zone2: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub set_heat_flow_temperature_zone1: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub set_heat_flow_temperature_zone2: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub set_cool_flow_temperature_zone1: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub set_cool_flow_temperature_zone2: Option<f64>,

    // hydraulics
    #[serde(deserialize_with = "lenient_bool")]
    pub water_pump1_status: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub water_pump2_status: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub water_pump3_status: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub booster_heater1_status: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub booster_heater2_status: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub valve_status3_way: bool,
    #[serde(deserialize_with = "lenient_int")]
    pub defrost_mode: Option<i64>,
    #[serde(deserialize_with = "lenient_number")]
    pub demand_percentage: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub heat_pump_frequency: Option<f64>,

    // energy
    #[serde(deserialize_with = "lenient_number")]
    pub current_energy_consumed: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub current_energy_produced: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub daily_heating_energy_consumed: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub daily_heating_energy_produced: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub daily_cooling_energy_consumed: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub daily_cooling_energy_produced: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub daily_hot_water_energy_consumed: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub daily_hot_water_energy_produced: Option<f64>,

    // limits and diagnostics
    #[serde(deserialize_with = "lenient_number")]
    pub min_set_temperature: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub max_set_temperature: Option<f64>,
    #[serde(deserialize_with = "lenient_int")]
    pub wifi_signal_strength: Option<i64>,
    pub last_time_stamp: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
}

impl AtwState {
    /// Read-only view of one zone.
    #[must_use]
    pub fn zone(&self, index: ZoneIndex) -> ZoneSnapshot<'_> {
        ZoneSnapshot { state: self, index }
    }

    /// What the heat pump is currently doing.
    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        DeviceStatus::from_code(self.operation_mode)
    }

    /// Operation mode of the hot-water tank.
    #[must_use]
    pub fn tank_operation_mode(&self) -> TankOperationMode {
        if self.forced_hot_water_mode {
            TankOperationMode::ForceHotWater
        } else {
            TankOperationMode::Auto
        }
    }

    pub(crate) fn set_zone_target_temperature(&mut self, index: ZoneIndex, value: f64) {
        match index {
            ZoneIndex::One => self.set_temperature_zone1 = Some(value),
            ZoneIndex::Two => self.set_temperature_zone2 = Some(value),
        }
    }

    /// Writes the cool or heat flow setpoint depending on the zone's mode.
    pub(crate) fn set_zone_target_flow_temperature(&mut self, index: ZoneIndex, value: f64) {
        let cooling = self.zone(index).operation_mode() == ZoneOperationMode::CoolFlow;
        let slot = match (index, cooling) {
            (ZoneIndex::One, false) => &mut self.set_heat_flow_temperature_zone1,
            (ZoneIndex::One, true) => &mut self.set_cool_flow_temperature_zone1,
            (ZoneIndex::Two, false) => &mut self.set_heat_flow_temperature_zone2,
            (ZoneIndex::Two, true) => &mut self.set_cool_flow_temperature_zone2,
        };
        *slot = Some(value);
    }

    pub(crate) fn set_zone_operation_mode(&mut self, index: ZoneIndex, mode: ZoneOperationMode) {
        let code = mode.code();
        match index {
            ZoneIndex::One => self.operation_mode_zone1 = code,
            ZoneIndex::Two => self.operation_mode_zone2 = code,
        }
    }
}

/// Heating/cooling circuit number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZoneIndex {
    One,
    Two,
}

impl ZoneIndex {
    /// 1-based zone number as shown to users.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl fmt::Display for ZoneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Read-only view of a zone inside an [`AtwState`].
#[derive(Debug, Clone, Copy)]
pub struct ZoneSnapshot<'a> {
    state: &'a AtwState,
    index: ZoneIndex,
}

impl ZoneSnapshot<'_> {
    #[must_use]
    pub fn index(&self) -> ZoneIndex {
        self.index
    }

    #[must_use]
    pub fn operation_mode(&self) -> ZoneOperationMode {
        ZoneOperationMode::from_code(self.pick(
            self.state.operation_mode_zone1,
            self.state.operation_mode_zone2,
        ))
    }

    /// Flow temperature measured at the heat pump outlet (shared by all zones).
    #[must_use]
    pub fn flow_temperature(&self) -> Option<f64> {
        self.state.flow_temperature
    }

    #[must_use]
    pub fn room_temperature(&self) -> Option<f64> {
        self.pick(
            self.state.room_temperature_zone1,
            self.state.room_temperature_zone2,
        )
    }

    /// Thermostat setpoint.
    #[must_use]
    pub fn target_temperature(&self) -> Option<f64> {
        self.pick(
            self.state.set_temperature_zone1,
            self.state.set_temperature_zone2,
        )
    }

    /// Flow setpoint; the cooling setpoint while in cool-flow, the heating one otherwise.
    #[must_use]
    pub fn target_flow_temperature(&self) -> Option<f64> {
        if self.operation_mode() == ZoneOperationMode::CoolFlow {
            self.pick(
                self.state.set_cool_flow_temperature_zone1,
                self.state.set_cool_flow_temperature_zone2,
            )
        } else {
            self.pick(
                self.state.set_heat_flow_temperature_zone1,
                self.state.set_heat_flow_temperature_zone2,
            )
        }
    }

    /// Flow temperature measured on the zone's circuit.
    #[must_use]
    pub fn zone_flow_temperature(&self) -> Option<f64> {
        self.pick(
            self.state.flow_temperature_zone1,
            self.state.flow_temperature_zone2,
        )
    }

    #[must_use]
    pub fn zone_return_temperature(&self) -> Option<f64> {
        self.pick(
            self.state.return_temperature_zone1,
            self.state.return_temperature_zone2,
        )
    }

    /// Heating/cooling target computed by the controller.
    #[must_use]
    pub fn target_hc_temperature(&self) -> Option<f64> {
        self.pick(
            self.state.target_hc_temperature_zone1,
            self.state.target_hc_temperature_zone2,
        )
    }

    fn pick<T>(&self, zone1: T, zone2: T) -> T {
        match self.index {
            ZoneIndex::One => zone1,
            ZoneIndex::Two => zone2,
        }
    }
}

/// Control mode of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneOperationMode {
    HeatThermostat,
    HeatFlow,
    Curve,
    CoolThermostat,
    CoolFlow,
    /// A code this integration does not know about, or no code at all.
    Unknown,
}

impl ZoneOperationMode {
    /// Modes a user can select.
    pub const SELECTABLE: [Self; 5] = [
        Self::HeatThermostat,
        Self::HeatFlow,
        Self::Curve,
        Self::CoolThermostat,
        Self::CoolFlow,
    ];

    #[must_use]
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => Self::HeatThermostat,
            Some(1) => Self::HeatFlow,
            Some(2) => Self::Curve,
            Some(3) => Self::CoolThermostat,
            Some(4) => Self::CoolFlow,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn code(self) -> Option<i64> {
        match self {
            Self::HeatThermostat => Some(0),
            Self::HeatFlow => Some(1),
            Self::Curve => Some(2),
            Self::CoolThermostat => Some(3),
            Self::CoolFlow => Some(4),
            Self::Unknown => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeatThermostat => "heat-thermostat",
            Self::HeatFlow => "heat-flow",
            Self::Curve => "curve",
            Self::CoolThermostat => "cool-thermostat",
            Self::CoolFlow => "cool-flow",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ZoneOperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneOperationMode {
    type Err = MelcloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SELECTABLE
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| MelcloudError::InvalidOperationMode(s.to_string()))
    }
}

/// Operation mode of the hot-water tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TankOperationMode {
    Auto,
    ForceHotWater,
}

impl TankOperationMode {
    pub const ALL: [Self; 2] = [Self::Auto, Self::ForceHotWater];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::ForceHotWater => "force_hot_water",
        }
    }
}

impl FromStr for TankOperationMode {
    type Err = MelcloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| MelcloudError::InvalidOperationMode(s.to_string()))
    }
}

/// What the heat pump is currently doing, from the device `OperationMode` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
    Idle,
    HeatWater,
    HeatZones,
    Cool,
    Defrost,
    Standby,
    Legionella,
    Unknown,
}

impl DeviceStatus {
    #[must_use]
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => Self::Idle,
            Some(1) => Self::HeatWater,
            Some(2) => Self::HeatZones,
            Some(3) => Self::Cool,
            Some(4) => Self::Defrost,
            Some(5) => Self::Standby,
            Some(6) => Self::Legionella,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::HeatWater => "heat_water",
            Self::HeatZones => "heat_zones",
            Self::Cool => "cool",
            Self::Defrost => "defrost",
            Self::Standby => "standby",
            Self::Legionella => "legionella",
            Self::Unknown => "unknown",
        }
    }
}

/// Unit family of a listing entry, from `Device.DeviceType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Air-to-air unit, type 0.
    Ata,
    /// Air-to-water heat pump, type 1. Entries without a type are read as ATW.
    Atw,
    Other(i64),
}

impl DeviceKind {
    #[must_use]
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => Self::Ata,
            None | Some(1) => Self::Atw,
            Some(other) => Self::Other(other),
        }
    }

    /// Read the kind of a JSON listing entry without parsing its status.
    ///
    /// # Errors
    ///
    /// Returns [`MelcloudError::SnapshotParse`] if the JSON is malformed.
    pub fn of_json(json: &str) -> Result<Self, MelcloudError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "PascalCase")]
        struct Listing {
            #[serde(default)]
            device: TypeOnly,
        }

        #[derive(Default, Deserialize)]
        #[serde(rename_all = "PascalCase")]
        struct TypeOnly {
            #[serde(default, deserialize_with = "lenient_int")]
            device_type: Option<i64>,
        }

        let listing: Listing = serde_json::from_str(json)?;
        Ok(Self::from_code(listing.device.device_type))
    }
}

pub(crate) fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

pub(crate) fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .or_else(|| value.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: &str) -> DeviceEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn should_detect_device_kind_from_listing() {
        let ata = r#"{"DeviceName": "Bedroom", "Device": {"DeviceType": 0}}"#;
        let atw = r#"{"DeviceName": "Heat pump", "Device": {"DeviceType": 1}}"#;
        let erv = r#"{"DeviceName": "Ventilation", "Device": {"DeviceType": 3}}"#;
        assert_eq!(DeviceKind::of_json(ata).unwrap(), DeviceKind::Ata);
        assert_eq!(DeviceKind::of_json(atw).unwrap(), DeviceKind::Atw);
        assert_eq!(DeviceKind::of_json(erv).unwrap(), DeviceKind::Other(3));
    }

    #[test]
    fn should_read_untyped_listing_as_atw() {
        assert_eq!(
            DeviceKind::of_json(r#"{"Device": {"Power": true}}"#).unwrap(),
            DeviceKind::Atw
        );
        assert_eq!(DeviceKind::of_json("{}").unwrap(), DeviceKind::Atw);
    }

    #[test]
    fn should_reject_malformed_listing_kind() {
        assert!(matches!(
            DeviceKind::of_json("[1, 2"),
            Err(MelcloudError::SnapshotParse(_))
        ));
    }

    #[test]
    fn should_parse_listing_entry() {
        let entry = entry(
            r#"{
                "DeviceName": "Heat pump",
                "SerialNumber": "2201234",
                "MacAddress": "aa:bb:cc:dd:ee:ff",
                "Device": {
                    "HasHotWaterTank": true,
                    "TargetHCTemperatureZone1": 32.5,
                    "ValveStatus3Way": true,
                    "WaterPump2Status": true,
                    "OperationModeZone1": 1
                }
            }"#,
        );
        assert_eq!(entry.unique_id(), "2201234-aa:bb:cc:dd:ee:ff");
        assert!(entry.device.has_hot_water_tank);
        assert_eq!(entry.device.target_hc_temperature_zone1, Some(32.5));
        assert!(entry.device.valve_status3_way);
        assert!(entry.device.water_pump2_status);
        assert_eq!(
            entry.device.zone(ZoneIndex::One).operation_mode(),
            ZoneOperationMode::HeatFlow
        );
    }

    #[test]
    fn should_treat_null_and_malformed_flags_as_false() {
        let entry = entry(r#"{"Device": {"HasZone2": null, "CanHeat": "yes", "CanCool": 1}}"#);
        assert!(!entry.device.has_zone2);
        assert!(!entry.device.can_heat);
        assert!(!entry.device.can_cool);
    }

    #[test]
    fn should_treat_non_numeric_readings_as_absent() {
        let entry = entry(r#"{"Device": {"FlowTemperature": "n/a", "OutdoorTemperature": 4.25}}"#);
        assert_eq!(entry.device.flow_temperature, None);
        assert_eq!(entry.device.outdoor_temperature, Some(4.25));
    }

    #[test]
    fn should_accept_integral_floats_as_codes() {
        let entry = entry(r#"{"Device": {"OperationMode": 2.0, "OperationModeZone1": 0.5}}"#);
        assert_eq!(entry.device.status(), DeviceStatus::HeatZones);
        assert_eq!(entry.device.operation_mode_zone1, None);
    }

    #[test]
    fn should_read_zone_fields_by_index() {
        let state = AtwState {
            room_temperature_zone1: Some(20.5),
            room_temperature_zone2: Some(18.0),
            set_temperature_zone2: Some(19.0),
            ..AtwState::default()
        };
        assert_eq!(state.zone(ZoneIndex::One).room_temperature(), Some(20.5));
        assert_eq!(state.zone(ZoneIndex::Two).room_temperature(), Some(18.0));
        assert_eq!(state.zone(ZoneIndex::Two).target_temperature(), Some(19.0));
        assert_eq!(state.zone(ZoneIndex::One).target_temperature(), None);
    }

    #[test]
    fn should_read_cool_flow_setpoint_in_cool_flow_mode() {
        let mut state = AtwState {
            operation_mode_zone1: Some(4),
            set_heat_flow_temperature_zone1: Some(40.0),
            set_cool_flow_temperature_zone1: Some(18.0),
            ..AtwState::default()
        };
        assert_eq!(state.zone(ZoneIndex::One).target_flow_temperature(), Some(18.0));

        state.operation_mode_zone1 = Some(1);
        assert_eq!(state.zone(ZoneIndex::One).target_flow_temperature(), Some(40.0));
    }

    #[test]
    fn should_write_flow_setpoint_matching_mode() {
        let mut state = AtwState {
            operation_mode_zone2: Some(4),
            ..AtwState::default()
        };
        state.set_zone_target_flow_temperature(ZoneIndex::Two, 17.0);
        assert_eq!(state.set_cool_flow_temperature_zone2, Some(17.0));
        assert_eq!(state.set_heat_flow_temperature_zone2, None);
    }

    #[test]
    fn should_map_unknown_zone_codes_to_unknown() {
        assert_eq!(ZoneOperationMode::from_code(Some(9)), ZoneOperationMode::Unknown);
        assert_eq!(ZoneOperationMode::from_code(None), ZoneOperationMode::Unknown);
    }

    #[test]
    fn should_parse_selectable_mode_names() {
        for mode in ZoneOperationMode::SELECTABLE {
            assert_eq!(mode.as_str().parse::<ZoneOperationMode>().unwrap(), mode);
            assert_eq!(ZoneOperationMode::from_code(mode.code()), mode);
        }
        assert!("unknown".parse::<ZoneOperationMode>().is_err());
    }

    #[test]
    fn should_derive_tank_mode_from_forced_flag() {
        let mut state = AtwState::default();
        assert_eq!(state.tank_operation_mode(), TankOperationMode::Auto);
        state.forced_hot_water_mode = true;
        assert_eq!(state.tank_operation_mode(), TankOperationMode::ForceHotWater);
    }
}
