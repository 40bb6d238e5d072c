//! # melhub-domain
//!
//! Pure domain model for the melhub home automation system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Entities** (state holders with identity: sensors, switches, water heaters, …)
//! - Define **Devices** (physical things that expose one or more entities)
//! - Define **Events** (state-change records)
//! - Describe entity metadata shared by every integration (sensor classes,
//!   entity categories, water-heater feature sets)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod entity;
pub mod event;
pub mod water_heater;
