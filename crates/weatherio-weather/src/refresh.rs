//! One background refresh: resolve location, fetch telemetry and pollutants,
//! then commit both to the cache as a pair.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;

use crate::cache::{CacheError, SnapshotCache, Slot};
use crate::geocode::Geocoder;
use crate::location::GeolocationSource;
use crate::provider::WeatherSource;
use crate::types::{Location, LocationError, WeatherError};

pub const DEVICE_LOCATION_TIMEOUT: Duration = Duration::from_secs(5);
pub const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a refresh cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    ResolvingLocation,
    FetchingTelemetry,
    FetchingPollutants,
    WritingCache,
}

/// Suspension points that carry their own timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStep {
    ReverseGeocode,
    Telemetry,
    Pollutants,
}

impl fmt::Display for RefreshStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshStep::ReverseGeocode => "reverse geocoding",
            RefreshStep::Telemetry => "telemetry fetch",
            RefreshStep::Pollutants => "pollutant fetch",
        };
        f.write_str(name)
    }
}

/// Why a refresh cycle aborted.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Location permission denied")]
    LocationDenied,

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Location request timed out")]
    LocationTimeout,

    #[error("Network failure during {step}: {message}")]
    Network { step: RefreshStep, message: String },

    #[error("{step} timed out after {}s", .after.as_secs())]
    Timeout { step: RefreshStep, after: Duration },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl RefreshError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::LocationDenied => "Location access is off. Allow it to get local weather.",
            Self::LocationUnavailable(_) => "Your location could not be determined.",
            Self::LocationTimeout => "Finding your location took too long. Will retry shortly.",
            Self::Network { .. } => "Weather service unreachable. Check your connection.",
            Self::Timeout { .. } => "Weather update timed out. Will retry shortly.",
            Self::InvalidInput(_) => "Received an invalid location.",
            Self::Cache(_) => "Could not save weather data on this device.",
        }
    }
}

impl From<LocationError> for RefreshError {
    fn from(e: LocationError) -> Self {
        match e {
            LocationError::PermissionDenied => Self::LocationDenied,
            LocationError::Timeout => Self::LocationTimeout,
            LocationError::ServiceUnavailable => {
                Self::LocationUnavailable("location service unavailable".into())
            }
            LocationError::Other(message) => Self::LocationUnavailable(message),
        }
    }
}

/// Per-step time limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTimeouts {
    pub device_location: Duration,
    pub geocode: Duration,
    pub fetch: Duration,
}

impl Default for RefreshTimeouts {
    fn default() -> Self {
        Self {
            device_location: DEVICE_LOCATION_TIMEOUT,
            geocode: GEOCODE_TIMEOUT,
            fetch: FETCH_TIMEOUT,
        }
    }
}

/// Result of a completed cycle
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSummary {
    pub location: Location,
    pub location_from_cache: bool,
    pub slot: Slot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Completed(RefreshSummary),
    /// Another cycle was already running; nothing was done.
    Skipped,
}

/// The background refresh state machine.
///
/// `run` may be called from any number of triggers; at most one cycle executes
/// at a time and overlapping calls return [`RefreshOutcome::Skipped`].
pub struct RefreshCycle {
    geolocation: Arc<dyn GeolocationSource>,
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherSource>,
    cache: SnapshotCache,
    timeouts: RefreshTimeouts,
    in_flight: AsyncMutex<()>,
    state: parking_lot::Mutex<RefreshState>,
}

impl RefreshCycle {
    pub fn new(
        geolocation: Arc<dyn GeolocationSource>,
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherSource>,
        cache: SnapshotCache,
    ) -> Self {
        Self {
            geolocation,
            geocoder,
            weather,
            cache,
            timeouts: RefreshTimeouts::default(),
            in_flight: AsyncMutex::new(()),
            state: parking_lot::Mutex::new(RefreshState::Idle),
        }
    }

    pub fn with_timeouts(mut self, timeouts: RefreshTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn state(&self) -> RefreshState {
        *self.state.lock()
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Run one complete cycle.
    ///
    /// # Errors
    ///
    /// Returns the first step failure; the telemetry/pollutant pair in the
    /// cache is then unchanged.
    pub async fn run(&self) -> Result<RefreshOutcome, RefreshError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::info!("Weather refresh already in progress, skipping trigger");
            return Ok(RefreshOutcome::Skipped);
        };

        tracing::info!("Starting weather refresh");
        let result = self.run_steps().await;
        self.transition(RefreshState::Idle);

        match &result {
            Ok(summary) => tracing::info!(
                "Weather refresh complete for {} (slot {:?})",
                summary.location.display_name(),
                summary.slot
            ),
            Err(e) => tracing::error!("Weather refresh failed: {}", e),
        }

        result.map(RefreshOutcome::Completed)
    }

    async fn run_steps(&self) -> Result<RefreshSummary, RefreshError> {
        self.transition(RefreshState::ResolvingLocation);
        let (location, location_from_cache) = self.resolve_location().await?;
        let (lat, lon) = (location.latitude, location.longitude);

        self.transition(RefreshState::FetchingTelemetry);
        let weather = self
            .bounded(
                RefreshStep::Telemetry,
                self.timeouts.fetch,
                self.weather.fetch_current_and_forecast(lat, lon),
            )
            .await?;

        self.transition(RefreshState::FetchingPollutants);
        let air_pollution = self
            .bounded(
                RefreshStep::Pollutants,
                self.timeouts.fetch,
                self.weather.fetch_pollutants(lat, lon),
            )
            .await?;

        self.transition(RefreshState::WritingCache);
        let slot = self
            .with_cache(move |cache| cache.commit_pair(&weather, &air_pollution))
            .await?;

        Ok(RefreshSummary {
            location,
            location_from_cache,
            slot,
        })
    }

    /// Cached location if usable, otherwise device coordinates plus reverse
    /// geocoding, persisted for later cycles.
    async fn resolve_location(&self) -> Result<(Location, bool), RefreshError> {
        match self.with_cache(|cache| cache.read_location()).await {
            Ok(Some(location)) if location.coordinates().is_valid() => {
                tracing::debug!("Using cached location {}", location.display_name());
                return Ok((location, true));
            }
            Ok(Some(location)) => tracing::warn!(
                "Ignoring cached location with invalid coordinates ({}, {})",
                location.latitude,
                location.longitude
            ),
            Ok(None) => tracing::debug!("No cached location"),
            Err(e) => tracing::warn!("Ignoring unreadable cached location: {}", e),
        }

        let limit = self.timeouts.device_location;
        let coords = match tokio::time::timeout(limit, self.geolocation.current_coordinates(limit))
            .await
        {
            Ok(result) => result?,
            Err(_) => return Err(RefreshError::LocationTimeout),
        };
        if !coords.is_valid() {
            return Err(RefreshError::InvalidInput(format!(
                "device reported coordinates out of range: ({}, {})",
                coords.latitude, coords.longitude
            )));
        }
        tracing::info!("Got location: {}, {}", coords.latitude, coords.longitude);

        let location = self
            .bounded(
                RefreshStep::ReverseGeocode,
                self.timeouts.geocode,
                self.geocoder
                    .resolve_by_coordinates(coords.latitude, coords.longitude),
            )
            .await?
            .unwrap_or_else(|| Location::from_coordinates(coords));
        if !location.coordinates().is_valid() {
            return Err(RefreshError::InvalidInput(format!(
                "geocoder returned coordinates out of range: ({}, {})",
                location.latitude, location.longitude
            )));
        }

        let stored = location.clone();
        self.with_cache(move |cache| cache.write_location(&stored))
            .await?;

        Ok((location, false))
    }

    /// Await a provider call under `limit`, mapping failures to the step.
    async fn bounded<T>(
        &self,
        step: RefreshStep,
        limit: Duration,
        call: impl Future<Output = Result<T, WeatherError>>,
    ) -> Result<T, RefreshError> {
        match tokio::time::timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if e.is_timeout() => Err(RefreshError::Timeout { step, after: limit }),
            Ok(Err(e)) => Err(RefreshError::Network {
                step,
                message: e.to_string(),
            }),
            Err(_) => Err(RefreshError::Timeout { step, after: limit }),
        }
    }

    /// Run a cache operation on the blocking pool.
    async fn with_cache<T, F>(&self, op: F) -> Result<T, RefreshError>
    where
        T: Send + 'static,
        F: FnOnce(&SnapshotCache) -> Result<T, CacheError> + Send + 'static,
    {
        let cache = self.cache.clone();
        let value = tokio::task::spawn_blocking(move || op(&cache))
            .await
            .map_err(|e| CacheError::Storage(format!("cache task failed: {}", e)))??;
        Ok(value)
    }

    fn transition(&self, next: RefreshState) {
        let mut state = self.state.lock();
        tracing::debug!("Refresh state {:?} -> {:?}", *state, next);
        *state = next;
    }
}
