use crate::traits::PositionProvider;
use crate::{Coordinate, PositionError};
use async_trait::async_trait;
use tracing::{info, warn};

/// A provider that always answers the same way; used by the CLI and tests.
#[derive(Debug, Clone)]
pub struct StaticPosition {
    outcome: Result<Coordinate, PositionError>,
}

impl StaticPosition {
    pub fn resolved(coordinate: Coordinate) -> Self {
        Self {
            outcome: Ok(coordinate),
        }
    }

    pub fn denied() -> Self {
        Self {
            outcome: Err(PositionError::PermissionDenied),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(PositionError::PositionUnavailable(reason.into())),
        }
    }
}

#[async_trait]
impl PositionProvider for StaticPosition {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        self.outcome.clone()
    }
}

/// Asks the provider for the device position. Denial and resolution
/// failures are logged and reported as `None`; neither is fatal.
pub async fn resolve_reference_position<P>(provider: &P) -> Option<Coordinate>
where
    P: PositionProvider + Sync + ?Sized,
{
    match provider.current_position().await {
        Ok(coordinate) => {
            info!(
                latitude = coordinate.latitude,
                longitude = coordinate.longitude,
                "reference position resolved"
            );
            Some(coordinate)
        }
        Err(PositionError::PermissionDenied) => {
            warn!("location permission denied, continuing without reference position");
            None
        }
        Err(error) => {
            warn!(error = %error, "reference position unavailable");
            None
        }
    }
}
