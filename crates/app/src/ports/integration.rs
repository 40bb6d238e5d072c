//! Integration port — lifecycle and service-call handling for device integrations.
//!
//! An integration bridges an external system (MELCloud, …) into melhub. It
//! registers devices/entities on setup and handles service calls directed at
//! entities it owns.

use std::future::Future;

use melhub_domain::device::Device;
use melhub_domain::entity::Entity;
use melhub_domain::error::HubError;
use melhub_domain::event::Event;
use melhub_domain::id::EntityId;

/// Context provided to integrations for persisting discoveries.
///
/// This is a **port** — adapters call it to persist devices and entities
/// they discover. [`InMemoryRegistry`](crate::registry::InMemoryRegistry)
/// is the in-process implementation.
pub trait IntegrationContext: Send + Sync {
    /// Persist a discovered device (create or update by `integration`+`unique_id`).
    fn upsert_device(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send;

    /// Persist a discovered entity (create or update by `entity_id` string).
    ///
    /// Also publishes `EntityCreated` / `StateChanged` / `AttributeChanged`
    /// events when appropriate.
    fn upsert_entity(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Publish a domain event to the event bus.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Convenience: persist a full [`DiscoveredDevice`] (device + all entities).
    fn persist_discovered(
        &self,
        dd: DiscoveredDevice,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        async move {
            self.upsert_device(dd.device).await?;
            for entity in dd.entities {
                self.upsert_entity(entity).await?;
            }
            Ok(())
        }
    }
}

/// A pluggable device integration.
///
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup) — initialise and persist discoveries
/// 2. (the hub runs, forwarding service calls via [`handle_service_call`](Self::handle_service_call))
/// 3. [`teardown`](Self::teardown) — clean up resources
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"melcloud"`).
    fn name(&self) -> &'static str;

    /// Register every device and entity the integration exposes through `ctx`.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Handle a service call (e.g. `turn_on`, `set_temperature`) for an
    /// entity owned by this integration.
    ///
    /// Returns the new [`Entity`] state after handling the call.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Called on graceful shutdown. Clean up any background tasks or connections.
    fn teardown(&mut self) -> impl Future<Output = Result<(), HubError>> + Send;
}

/// A device and its associated entities discovered during integration setup.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub device: Device,
    pub entities: Vec<Entity>,
}
