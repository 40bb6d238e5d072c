//! Typed identifier newtypes backed by UUIDs.
//!
//! Integrations that expose hardware derive ids from a stable unique id
//! (serial number, MAC address, entity key) with [`EntityId::stable`] so the
//! same physical sensor keeps its id across restarts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Namespace for name-based (v5) identifiers.
const STABLE_NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x6d65_6c68_7562_4000_8000_6964_6e73_0001);

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Derive an identifier from a stable unique id.
            ///
            /// The same input always yields the same identifier.
            #[must_use]
            pub fn stable(unique_id: &str) -> Self {
                Self(uuid::Uuid::new_v5(&STABLE_NAMESPACE, unique_id.as_bytes()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an [`Entity`](crate::entity::Entity).
    EntityId
);

define_id!(
    /// Unique identifier for a [`Device`](crate::device::Device).
    DeviceId
);

define_id!(
    /// Unique identifier for an [`Event`](crate::event::Event).
    EventId
);
