//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HubError`]
//! at port boundaries (adapters via `into_domain`, domain types via `#[from]`).

/// Top-level error returned across port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A lookup did not match anything.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// An integration (transport, device protocol, …) failed.
    #[error("integration error")]
    Integration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required name was empty.
    #[error("name must not be empty")]
    EmptyName,

    /// An entity id string was empty.
    #[error("entity id must not be empty")]
    EmptyEntityId,

    /// An entity id string is not of the form `<platform>.<object_id>`.
    #[error("invalid entity id {0:?}, expected `<platform>.<object_id>`")]
    InvalidEntityId(String),

    /// The entity does not know how to handle the requested service.
    #[error("service {service:?} is not supported by {entity_id}")]
    UnsupportedService {
        /// Entity id string (e.g. `sensor.heat_pump_flow_temperature`).
        entity_id: String,
        /// Requested service name.
        service: String,
    },

    /// A service call payload was missing a field or had the wrong type.
    #[error("invalid service data: field {field:?} {reason}")]
    InvalidServiceData {
        /// Offending field.
        field: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
}

/// A lookup failure for a named kind of object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of object (e.g. `"Entity"`, `"Device"`).
    pub entity: &'static str,
    /// Identifier that did not match.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_with_from() {
        let err: HubError = ValidationError::EmptyName.into();
        assert!(matches!(
            err,
            HubError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn should_display_not_found_error() {
        let err = NotFoundError {
            entity: "Entity",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Entity abc not found");
    }

    #[test]
    fn should_display_unsupported_service() {
        let err = ValidationError::UnsupportedService {
            entity_id: "sensor.pac_flow_temperature".to_string(),
            service: "turn_on".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "service \"turn_on\" is not supported by sensor.pac_flow_temperature"
        );
    }

    #[test]
    fn should_keep_source_of_integration_error() {
        let io = std::io::Error::other("connection reset");
        let err = HubError::Integration(Box::new(io));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "connection reset");
    }
}
