//! In-memory device/entity registry implementing [`IntegrationContext`].
//!
//! Devices are keyed by `(integration, unique_id)` and entities by their
//! `entity_id` string, so repeated discoveries update records in place
//! instead of duplicating them. Every change is published on the event bus.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use melhub_domain::device::Device;
use melhub_domain::entity::Entity;
use melhub_domain::error::HubError;
use melhub_domain::event::{Event, EventType};
use melhub_domain::time::now;

use crate::ports::{EventPublisher, IntegrationContext};

#[derive(Default)]
struct Store {
    devices: Mutex<HashMap<(String, String), Device>>,
    entities: Mutex<HashMap<String, Entity>>,
}

/// Registry of everything integrations have discovered.
///
/// Cheap to clone; clones share the same store and publisher.
pub struct InMemoryRegistry<EP> {
    store: Arc<Store>,
    publisher: EP,
}

impl<EP> InMemoryRegistry<EP> {
    /// Create an empty registry publishing changes through `publisher`.
    pub fn new(publisher: EP) -> Self {
        Self {
            store: Arc::new(Store::default()),
            publisher,
        }
    }

    /// All registered devices, sorted by name.
    #[must_use]
    pub fn devices(&self) -> Vec<Device> {
        let mut devices: Vec<Device> = lock(&self.store.devices).values().cloned().collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices
    }

    /// All registered entities, sorted by entity id.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = lock(&self.store.entities).values().cloned().collect();
        entities.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        entities
    }

    /// Look up an entity by its `entity_id` string.
    #[must_use]
    pub fn entity(&self, entity_id: &str) -> Option<Entity> {
        lock(&self.store.entities).get(entity_id).cloned()
    }
}

impl<EP: Clone> Clone for InMemoryRegistry<EP> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            publisher: self.publisher.clone(),
        }
    }
}

impl<EP> IntegrationContext for InMemoryRegistry<EP>
where
    EP: EventPublisher + Send + Sync,
{
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name))]
    async fn upsert_device(&self, device: Device) -> Result<Device, HubError> {
        device.validate()?;
        let stored = {
            let mut devices = lock(&self.store.devices);
            let key = (device.integration.clone(), device.unique_id.clone());
            match devices.entry(key) {
                Entry::Occupied(mut slot) => {
                    let updated = Device {
                        id: slot.get().id,
                        ..device
                    };
                    slot.insert(updated.clone());
                    updated
                }
                Entry::Vacant(slot) => slot.insert(device).clone(),
            }
        };
        self.publisher
            .publish(Event::new(
                EventType::DeviceRegistered,
                None,
                serde_json::json!({
                    "device_id": stored.id.to_string(),
                    "name": stored.name,
                    "integration": stored.integration,
                }),
            ))
            .await?;
        Ok(stored)
    }

    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.entity_id))]
    async fn upsert_entity(&self, entity: Entity) -> Result<Entity, HubError> {
        entity.validate()?;
        let (stored, event) = {
            let mut entities = lock(&self.store.entities);
            match entities.entry(entity.entity_id.clone()) {
                Entry::Occupied(mut slot) => {
                    let existing = slot.get_mut();
                    let previous = existing.state.clone();
                    let attributes_changed = existing.attributes != entity.attributes;

                    existing.device_id = entity.device_id;
                    existing.friendly_name = entity.friendly_name;
                    existing.attributes = entity.attributes;
                    existing.update_state(entity.state, now());

                    let event = if previous != existing.state {
                        Some(Event::new(
                            EventType::StateChanged,
                            Some(existing.id),
                            serde_json::json!({
                                "entity_id": existing.entity_id,
                                "from": previous.to_string(),
                                "to": existing.state.to_string(),
                            }),
                        ))
                    } else if attributes_changed {
                        Some(Event::new(
                            EventType::AttributeChanged,
                            Some(existing.id),
                            serde_json::json!({ "entity_id": existing.entity_id }),
                        ))
                    } else {
                        None
                    };
                    (existing.clone(), event)
                }
                Entry::Vacant(slot) => {
                    let created = slot.insert(entity).clone();
                    let event = Event::new(
                        EventType::EntityCreated,
                        Some(created.id),
                        serde_json::json!({
                            "entity_id": created.entity_id,
                            "state": created.state.to_string(),
                        }),
                    );
                    (created, Some(event))
                }
            }
        };

        if let Some(event) = event {
            tracing::debug!(event_type = ?event.event_type, "entity changed");
            self.publisher.publish(event).await?;
        }
        Ok(stored)
    }

    async fn publish(&self, event: Event) -> Result<(), HubError> {
        self.publisher.publish(event).await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
