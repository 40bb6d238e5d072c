//! Power switch of an ATW device.

use melhub_domain::entity::{AttributeValue, EntityBuilder, EntityState};
use melhub_domain::error::{HubError, ValidationError};

use crate::device::AtwDevice;
use crate::snapshot::AtwState;

#[must_use]
pub fn render(state: &AtwState, entity: EntityBuilder) -> EntityBuilder {
    entity
        .state(EntityState::from_bool(state.power))
        .attribute("icon", AttributeValue::from("mdi:power"))
}

/// Handle `turn_on`, `turn_off`, and `toggle`.
///
/// # Errors
///
/// Returns [`ValidationError::UnsupportedService`] for any other service and
/// the device error if the command fails.
pub async fn call<D: AtwDevice>(device: &D, entity_id: &str, service: &str) -> Result<(), HubError> {
    let on = match service {
        "turn_on" => true,
        "turn_off" => false,
        "toggle" => !device.snapshot().device.power,
        _ => {
            return Err(ValidationError::UnsupportedService {
                entity_id: entity_id.to_string(),
                service: service.to_string(),
            }
            .into());
        }
    };
    tracing::debug!(entity_id, on, "switching power");
    device.set_power(on).await?;
    Ok(())
}
