//! # melhubd — MELCloud hub daemon
//!
//! Composition root that wires the MELCloud integration to the registry and
//! the event bus.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize logging
//! - Load ATW and ATA device snapshots and set up the integration
//! - Re-read snapshots on a fixed interval and refresh entity states
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context;
use melhub_adapter_melcloud::{DeviceKind, LocalAtaDevice, LocalAtwDevice, MelcloudIntegration};
use melhub_app::event_bus::InProcessEventBus;
use melhub_app::ports::{EventPublisher, Integration};
use melhub_app::registry::InMemoryRegistry;
use melhub_domain::event::Event;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    // Event bus and registry
    let event_bus = InProcessEventBus::new(256);
    let registry = InMemoryRegistry::new(event_bus.clone());
    let event_log = tokio::spawn(log_events(event_bus.subscribe()));

    if !config.integrations.melcloud_enabled {
        tracing::warn!("MELCloud integration disabled, nothing to do");
        event_log.abort();
        return Ok(());
    }
    if config.melcloud.snapshot_files.is_empty() {
        tracing::warn!("no snapshot_files configured, the integration will expose no devices");
    }

    // Devices
    let fleet = load_devices(&config.melcloud.snapshot_files)?;
    let mut integration = MelcloudIntegration::new(config.melcloud.clone(), fleet.atw)
        .with_ata_devices(fleet.ata);
    integration
        .setup(&registry)
        .await
        .context("failed to set up MELCloud integration")?;
    tracing::info!(
        devices = registry.devices().len(),
        entities = registry.entities().len(),
        "melhubd running"
    );

    let mut ticker = tokio::time::interval(config.poll_interval());
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                poll(&integration, &fleet.paths, &registry).await;
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for shutdown signal")?;
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    integration
        .teardown()
        .await
        .context("failed to tear down MELCloud integration")?;
    event_log.abort();
    Ok(())
}

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Snapshot-backed devices, split by kind.
struct Fleet {
    atw: Vec<LocalAtwDevice>,
    ata: Vec<LocalAtaDevice>,
    paths: SnapshotPaths,
}

/// Snapshot file of each device, in the integration's device order.
#[derive(Default)]
struct SnapshotPaths {
    atw: Vec<PathBuf>,
    ata: Vec<PathBuf>,
}

fn load_devices(paths: &[PathBuf]) -> anyhow::Result<Fleet> {
    let mut fleet = Fleet {
        atw: Vec::new(),
        ata: Vec::new(),
        paths: SnapshotPaths::default(),
    };
    for path in paths {
        let context = || format!("failed to load snapshot {}", path.display());
        let json = std::fs::read_to_string(path).with_context(context)?;
        match DeviceKind::of_json(&json).with_context(context)? {
            DeviceKind::Atw => {
                fleet.atw.push(LocalAtwDevice::from_json(&json).with_context(context)?);
                fleet.paths.atw.push(path.clone());
            }
            DeviceKind::Ata => {
                fleet.ata.push(LocalAtaDevice::from_json(&json).with_context(context)?);
                fleet.paths.ata.push(path.clone());
            }
            DeviceKind::Other(code) => {
                tracing::warn!(path = %path.display(), device_type = code, "skipping unsupported MELCloud device type");
            }
        }
    }
    Ok(fleet)
}

/// Re-read every snapshot file, then push the re-rendered entities.
///
/// A snapshot that cannot be read keeps the device's previous state.
async fn poll<EP>(
    integration: &MelcloudIntegration<LocalAtwDevice, LocalAtaDevice>,
    paths: &SnapshotPaths,
    registry: &InMemoryRegistry<EP>,
) where
    EP: EventPublisher + Send + Sync,
{
    for (device, path) in integration.devices().iter().zip(&paths.atw) {
        reload(|path| device.reload_file(path), path);
    }
    for (device, path) in integration.ata_devices().iter().zip(&paths.ata) {
        reload(|path| device.reload_file(path), path);
    }
    if let Err(err) = integration.refresh(registry).await {
        tracing::warn!(error = %err, "failed to refresh MELCloud entities");
    }
}

fn reload<E: std::fmt::Display>(load: impl FnOnce(&Path) -> Result<(), E>, path: &Path) {
    if let Err(err) = load(path) {
        tracing::warn!(path = %path.display(), error = %err, "failed to reload snapshot");
    }
}

async fn log_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => tracing::debug!(
                event_type = ?event.event_type,
                entity_id = ?event.entity_id,
                data = %event.data,
                "event"
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log lagging behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
