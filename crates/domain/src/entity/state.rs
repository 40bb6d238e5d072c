//! Entity state — the current operational state of an entity.

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Operational state of an entity.
///
/// Switch-like entities use [`On`](Self::On)/[`Off`](Self::Off); sensors and
/// water heaters carry their rendered value in [`Custom`](Self::Custom).
/// Serialized as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EntityState {
    On,
    Off,
    #[default]
    Unknown,
    Unavailable,
    Custom(String),
}

impl EntityState {
    /// Whether the entity is reachable (anything but [`Unavailable`](Self::Unavailable)).
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// `On` when `value` is true, `Off` otherwise.
    #[must_use]
    pub fn from_bool(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Unknown => f.write_str("unknown"),
            Self::Unavailable => f.write_str("unavailable"),
            Self::Custom(value) => f.write_str(value),
        }
    }
}

impl FromStr for EntityState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "on" => Self::On,
            "off" => Self::Off,
            "unknown" => Self::Unknown,
            "unavailable" => Self::Unavailable,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl Serialize for EntityState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let Ok(state) = text.parse::<EntityState>();
        Ok(state)
    }
}
