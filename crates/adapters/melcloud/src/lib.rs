//! # melhub-adapter-melcloud
//!
//! MELCloud integration exposing Mitsubishi Electric air-to-water (ATW) heat
//! pumps as sensor, switch, and water-heater entities, and air-to-air (ATA)
//! units as sensors.
//!
//! ## Provided entities
//!
//! | Platform | Entity | Present when |
//! |----------|--------|--------------|
//! | `sensor` | temperatures, pump/heater statuses, energy counters, diagnostics | always, or gated by capability flags |
//! | `sensor` | zone target/flow/return/room temperature | the zone has a thermostat |
//! | `switch` | power | always |
//! | `water_heater` | hot-water accumulator | the device has a settable tank |
//! | `water_heater` | zone heating-water accumulator | the device can heat, one per zone |
//! | `sensor` | ATA WiFi signal, room temperature, daily energy | always |
//! | `sensor` | ATA lifetime energy | the unit has an energy meter |
//!
//! Which entities exist is decided once at setup from the device
//! capabilities (see [`builder`]). Their values are re-rendered from the
//! latest device snapshot on every [`MelcloudIntegration::refresh`] and after
//! every service call.
//!
//! Devices whose names slugify to the same object id get `_2`, `_3`, ...
//! suffixes in discovery order, ATW devices first.
//!
//! ## Dependency rule
//!
//! Depends on `melhub-app` (port traits) and `melhub-domain` only. Talking to
//! the MELCloud service is the job of an [`AtwDevice`] or [`AtaDevice`]
//! implementation.

pub mod ata;
pub mod builder;
pub mod capabilities;
pub mod config;
pub mod device;
pub mod error;
pub mod sensor;
pub mod snapshot;
pub mod switch;
pub mod water_heater;
pub mod zone;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use melhub_app::ports::{DiscoveredDevice, Integration, IntegrationContext};
use melhub_domain::device::Device;
use melhub_domain::entity::{Entity, EntityState};
use melhub_domain::error::{HubError, NotFoundError, ValidationError};
use melhub_domain::id::{DeviceId, EntityId};

pub use ata::{AtaDevice, AtaEntry, AtaState};
pub use builder::{EntitySpec, build_ata_specs, build_control_specs, build_entity_specs};
pub use capabilities::DeviceCapabilities;
pub use config::MelcloudConfig;
pub use device::{AtwDevice, LocalAtaDevice, LocalAtwDevice, LocalDevice};
pub use error::MelcloudError;
pub use snapshot::{AtwState, DeviceEntry, DeviceKind, ZoneIndex, ZoneOperationMode, ZoneSnapshot};

const INTEGRATION: &str = "melcloud";
const MANUFACTURER: &str = "Mitsubishi Electric";

/// Which device list a binding points into.
#[derive(Debug, Clone, Copy)]
enum Source {
    Atw {
        index: usize,
        capabilities: DeviceCapabilities,
    },
    Ata(usize),
}

impl Source {
    const fn model(self) -> &'static str {
        match self {
            Self::Atw { .. } => "ATW",
            Self::Ata(_) => "ATA",
        }
    }
}

/// What setup learned about one device.
#[derive(Debug, Clone)]
struct DeviceBinding {
    device_id: DeviceId,
    name: String,
    slug: String,
    unique_id: String,
    source: Source,
    specs: Vec<EntitySpec>,
}

/// Where an entity comes from.
#[derive(Debug, Clone, Copy)]
struct EntityBinding {
    device: usize,
    spec: EntitySpec,
}

enum Snapshot {
    Atw(Arc<DeviceEntry>),
    Ata(Arc<AtaEntry>),
}

/// A device seen in a snapshot, before it is validated and bound.
struct Candidate {
    name: String,
    unique_id: String,
    source: Source,
    specs: Vec<EntitySpec>,
    snapshot: Snapshot,
}

/// MELCloud integration over a set of ATW devices and ATA units.
pub struct MelcloudIntegration<D, A = LocalAtaDevice> {
    config: MelcloudConfig,
    devices: Vec<D>,
    ata_devices: Vec<A>,
    bound: Vec<DeviceBinding>,
    entities: HashMap<EntityId, EntityBinding>,
}

impl<D: AtwDevice> MelcloudIntegration<D> {
    #[must_use]
    pub fn new(config: MelcloudConfig, devices: Vec<D>) -> Self {
        Self {
            config,
            devices,
            ata_devices: Vec::new(),
            bound: Vec::new(),
            entities: HashMap::new(),
        }
    }
}

impl<D: AtwDevice, A: AtaDevice> MelcloudIntegration<D, A> {
    /// Replace the air-to-air units exposed next to the ATW devices.
    #[must_use]
    pub fn with_ata_devices<B: AtaDevice>(self, ata_devices: Vec<B>) -> MelcloudIntegration<D, B> {
        MelcloudIntegration {
            config: self.config,
            devices: self.devices,
            ata_devices,
            bound: Vec::new(),
            entities: HashMap::new(),
        }
    }

    /// Build devices and entities from the current snapshots.
    ///
    /// Capabilities are captured here; the entity set does not change until
    /// the next discovery. A device that fails validation (e.g. an empty
    /// name) is skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity of a valid device cannot be built.
    pub fn discover(&mut self) -> Result<Vec<DiscoveredDevice>, HubError> {
        self.bound.clear();
        self.entities.clear();

        let atw = self.devices.iter().enumerate().map(|(index, api)| {
            let entry = api.snapshot();
            let capabilities = DeviceCapabilities::from_state(&entry.device);
            let mut specs = build_entity_specs(capabilities);
            specs.extend(build_control_specs(capabilities));
            Candidate {
                name: entry.device_name.clone(),
                unique_id: entry.unique_id(),
                source: Source::Atw {
                    index,
                    capabilities,
                },
                specs,
                snapshot: Snapshot::Atw(entry),
            }
        });
        let ata = self.ata_devices.iter().enumerate().map(|(index, api)| {
            let entry = api.snapshot();
            Candidate {
                name: entry.device_name.clone(),
                unique_id: entry.unique_id(),
                source: Source::Ata(index),
                specs: build_ata_specs(&entry.device),
                snapshot: Snapshot::Ata(entry),
            }
        });
        let candidates: Vec<Candidate> = atw.chain(ata).collect();

        let mut slugs = HashSet::new();
        let mut discovered = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let device = match Device::builder()
                .id(DeviceId::stable(&candidate.unique_id))
                .name(candidate.name.as_str())
                .manufacturer(MANUFACTURER)
                .model(candidate.source.model())
                .integration(INTEGRATION)
                .unique_id(candidate.unique_id.as_str())
                .build()
            {
                Ok(device) => device,
                Err(err) => {
                    tracing::warn!(
                        unique_id = %candidate.unique_id,
                        error = %err,
                        "skipping invalid MELCloud device"
                    );
                    continue;
                }
            };

            tracing::info!(
                device = %device.name,
                unique_id = %candidate.unique_id,
                entities = candidate.specs.len(),
                source = ?candidate.source,
                "discovered MELCloud device"
            );

            let binding = DeviceBinding {
                device_id: device.id,
                slug: builder::unique_slug(&mut slugs, &device.name),
                name: device.name.clone(),
                unique_id: candidate.unique_id,
                source: candidate.source,
                specs: candidate.specs,
            };
            let index = self.bound.len();
            let mut entities = Vec::with_capacity(binding.specs.len());
            for spec in &binding.specs {
                let entity = render(&self.config, &binding, *spec, &candidate.snapshot)?;
                self.entities.insert(
                    entity.id,
                    EntityBinding {
                        device: index,
                        spec: *spec,
                    },
                );
                entities.push(entity);
            }
            self.bound.push(binding);
            discovered.push(DiscoveredDevice { device, entities });
        }
        Ok(discovered)
    }

    /// Re-render every entity from the latest snapshots and upsert it.
    ///
    /// # Errors
    ///
    /// Returns the first error from rendering or from `ctx`.
    #[tracing::instrument(skip_all, fields(integration = INTEGRATION))]
    pub async fn refresh(&self, ctx: &impl IntegrationContext) -> Result<(), HubError> {
        for binding in &self.bound {
            let snapshot = self.snapshot(binding.source);
            for spec in &binding.specs {
                let entity = render(&self.config, binding, *spec, &snapshot)?;
                ctx.upsert_entity(entity).await?;
            }
        }
        tracing::debug!(devices = self.bound.len(), "refreshed MELCloud entities");
        Ok(())
    }

    /// Check whether this integration owns the given entity.
    #[must_use]
    pub fn owns_entity(&self, entity_id: EntityId) -> bool {
        self.entities.contains_key(&entity_id)
    }

    /// Capabilities captured at setup for each bound ATW device, in device order.
    #[must_use]
    pub fn capabilities(&self) -> Vec<DeviceCapabilities> {
        self.bound
            .iter()
            .filter_map(|binding| match binding.source {
                Source::Atw { capabilities, .. } => Some(capabilities),
                Source::Ata(_) => None,
            })
            .collect()
    }

    /// Access the underlying ATW devices, e.g. to feed them polled snapshots.
    #[must_use]
    pub fn devices(&self) -> &[D] {
        &self.devices
    }

    /// Access the underlying air-to-air units.
    #[must_use]
    pub fn ata_devices(&self) -> &[A] {
        &self.ata_devices
    }

    fn snapshot(&self, source: Source) -> Snapshot {
        match source {
            Source::Atw { index, .. } => Snapshot::Atw(self.devices[index].snapshot()),
            Source::Ata(index) => Snapshot::Ata(self.ata_devices[index].snapshot()),
        }
    }
}

impl<D: AtwDevice, A: AtaDevice> Integration for MelcloudIntegration<D, A> {
    fn name(&self) -> &'static str {
        INTEGRATION
    }

    #[tracing::instrument(skip_all, fields(integration = INTEGRATION))]
    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), HubError> {
        let discovered = self.discover()?;
        let count = discovered.len();
        for dd in discovered {
            ctx.persist_discovered(dd).await?;
        }
        tracing::info!(devices = count, entities = self.entities.len(), "MELCloud integration ready");
        Ok(())
    }

    #[tracing::instrument(skip(self, data), fields(integration = INTEGRATION))]
    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, HubError> {
        let target = *self.entities.get(&entity_id).ok_or_else(|| NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        })?;
        let binding = &self.bound[target.device];
        let object_id = target.spec.entity_id(&binding.slug);
        let unsupported = || ValidationError::UnsupportedService {
            entity_id: object_id.clone(),
            service: service.to_string(),
        };

        let Source::Atw { index, .. } = binding.source else {
            return Err(unsupported().into());
        };
        let api = &self.devices[index];
        match target.spec {
            EntitySpec::Sensor(_) | EntitySpec::ZoneSensor(..) | EntitySpec::AtaSensor(_) => {
                return Err(unsupported().into());
            }
            EntitySpec::PowerSwitch => switch::call(api, &object_id, service).await?,
            EntitySpec::TankWaterHeater => {
                water_heater::call_tank(api, &object_id, service, &data).await?;
            }
            EntitySpec::ZoneWaterHeater(zone) => {
                water_heater::call_zone(api, zone, &object_id, service, &data).await?;
            }
        }

        render(&self.config, binding, target.spec, &Snapshot::Atw(api.snapshot()))
    }

    async fn teardown(&mut self) -> Result<(), HubError> {
        tracing::info!(entities = self.entities.len(), "tearing down MELCloud integration");
        self.entities.clear();
        self.bound.clear();
        Ok(())
    }
}

fn render(
    config: &MelcloudConfig,
    binding: &DeviceBinding,
    spec: EntitySpec,
    snapshot: &Snapshot,
) -> Result<Entity, HubError> {
    let key = spec.key();
    let entity = Entity::builder()
        .id(EntityId::stable(&format!("{}-{key}", binding.unique_id)))
        .device_id(binding.device_id)
        .entity_id(spec.entity_id(&binding.slug))
        .friendly_name(format!("{} {}", binding.name, spec.name()));

    let entity = match (spec, snapshot) {
        (EntitySpec::Sensor(key), Snapshot::Atw(entry)) => key.description().render(&entry.device, entity),
        (EntitySpec::ZoneSensor(key, zone), Snapshot::Atw(entry)) => {
            key.description().render(&entry.device.zone(zone), entity)
        }
        (EntitySpec::PowerSwitch, Snapshot::Atw(entry)) => switch::render(&entry.device, entity),
        (EntitySpec::TankWaterHeater, Snapshot::Atw(entry)) => {
            water_heater::render_tank(&entry.device, config, entity)
        }
        (EntitySpec::ZoneWaterHeater(zone), Snapshot::Atw(entry)) => {
            water_heater::render_zone(&entry.device, zone, config, entity)
        }
        (EntitySpec::AtaSensor(key), Snapshot::Ata(entry)) => key.description().render(&entry.device, entity),
        // bindings only pair specs with their own device kind
        (_, _) => entity.state(EntityState::Unavailable),
    };
    entity.build()
}
