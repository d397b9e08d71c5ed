//! Device geolocation sources.

use std::time::Duration;

use async_trait::async_trait;

use crate::types::{Coordinates, LocationError};

/// Source of the device's current coordinates.
#[async_trait]
pub trait GeolocationSource: Send + Sync {
    /// Current coordinates. `timeout` bounds how long the source may wait on
    /// a sensor fix; callers additionally enforce it externally.
    async fn current_coordinates(&self, timeout: Duration) -> Result<Coordinates, LocationError>;
}

/// Geolocation backed by coordinates from configuration.
///
/// Hosts without a positioning sensor report `ServiceUnavailable`.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocation {
    coordinates: Option<Coordinates>,
}

impl FixedGeolocation {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl GeolocationSource for FixedGeolocation {
    async fn current_coordinates(&self, _timeout: Duration) -> Result<Coordinates, LocationError> {
        self.coordinates.ok_or(LocationError::ServiceUnavailable)
    }
}
