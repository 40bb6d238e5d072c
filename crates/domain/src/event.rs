//! Event — an immutable record of something that happened.
//!
//! Events are produced when entities are registered or their state changes.

use serde::{Deserialize, Serialize};

use crate::id::{EntityId, EventId};
use crate::time::{Timestamp, now};

/// Kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// An entity was registered for the first time.
    EntityCreated,
    /// An entity's state changed.
    StateChanged,
    /// An entity's attributes changed while its state stayed the same.
    AttributeChanged,
    /// A device was registered or its metadata updated.
    DeviceRegistered,
}

/// An immutable record of something that happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub entity_id: Option<EntityId>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, entity_id: Option<EntityId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            entity_id,
            data,
            timestamp: now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_event_with_fresh_id() {
        let a = Event::new(EventType::StateChanged, None, serde_json::json!({}));
        let b = Event::new(EventType::StateChanged, None, serde_json::json!({}));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn should_serialize_event_type_in_snake_case() {
        let json = serde_json::to_string(&EventType::StateChanged).unwrap();
        assert_eq!(json, "\"state_changed\"");
    }
}
