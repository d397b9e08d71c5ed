//! Weather and air quality refresh for weatherio
//!
//! Resolves the device location, fetches telemetry and pollutant readings from
//! OpenWeatherMap and commits both to a key-value cache as one pair. Display
//! helpers turn cached readings into unit-aware strings.

pub mod cache;
pub mod classify;
pub mod convert;
pub mod geocode;
pub mod location;
pub mod paginate;
pub mod pollutant;
pub mod present;
pub mod provider;
pub mod refresh;
pub mod scheduler;
pub mod types;

pub use cache::{CacheError, CachedSnapshot, KeyValueStore, MemoryStore, SnapshotCache, SqliteStore};
pub use convert::UnitSystem;
pub use geocode::Geocoder;
pub use location::{FixedGeolocation, GeolocationSource};
pub use present::{AirQualityView, CurrentConditions};
pub use provider::{OpenWeatherClient, OpenWeatherConfig, WeatherSource};
pub use refresh::{RefreshCycle, RefreshError, RefreshOutcome, RefreshState, RefreshSummary};
pub use scheduler::RefreshScheduler;
pub use types::*;
