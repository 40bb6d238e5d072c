//! MELCloud adapter error types.

use melhub_domain::error::HubError;

use crate::snapshot::ZoneOperationMode;

/// Errors specific to the MELCloud adapter.
#[derive(Debug, thiserror::Error)]
pub enum MelcloudError {
    /// The device command channel rejected or failed a command.
    #[error("device command failed")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The zone is in a mode that has no settable target temperature.
    #[error("zone operation mode {0} has no target temperature")]
    UnsupportedMode(ZoneOperationMode),

    /// No temperature was given and there is no current target to re-assert.
    #[error("no target temperature to apply")]
    NoTargetTemperature,

    /// The requested operation mode is not one the entity offers.
    #[error("unknown operation mode {0:?}")]
    InvalidOperationMode(String),

    /// Reading a snapshot file failed.
    #[error("failed to read device snapshot")]
    Io(#[from] std::io::Error),

    /// A snapshot was not valid MELCloud JSON.
    #[error("failed to parse device snapshot")]
    SnapshotParse(#[from] serde_json::Error),

    /// A domain-level error (validation, not-found, etc.).
    #[error("domain error")]
    Domain(#[source] HubError),
}

impl MelcloudError {
    /// Wrap any transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }

    /// Convert into a [`HubError`] for propagation across port boundaries.
    ///
    /// Domain errors pass through unchanged, everything else becomes
    /// [`HubError::Integration`] with this error as its source.
    #[must_use]
    pub fn into_domain(self) -> HubError {
        match self {
            Self::Domain(err) => err,
            other => HubError::Integration(Box::new(other)),
        }
    }
}

impl From<MelcloudError> for HubError {
    fn from(err: MelcloudError) -> Self {
        err.into_domain()
    }
}

impl From<HubError> for MelcloudError {
    fn from(err: HubError) -> Self {
        Self::Domain(err)
    }
}
