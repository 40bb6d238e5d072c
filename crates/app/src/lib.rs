//! # melhub-app
//!
//! Application layer — **port definitions** (traits) and in-process
//! infrastructure shared by every integration.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement or call:
//!   - `Integration` — lifecycle and service-call handling of a device integration
//!   - `IntegrationContext` — where integrations persist what they discover
//!   - `EventPublisher` — publish domain events
//! - Provide **in-process infrastructure** that doesn't need IO:
//!   - `InProcessEventBus` — broadcast channel of domain events
//!   - `InMemoryRegistry` — device/entity registry backing `IntegrationContext`
//!
//! ## Dependency rule
//! Depends on `melhub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod registry;
