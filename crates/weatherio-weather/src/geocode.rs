//! Forward and reverse geocoding through the OpenWeatherMap geocoding API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::provider::OpenWeatherClient;
use crate::types::{Location, WeatherError};

const SEARCH_LIMIT: u8 = 5;

/// Converts between coordinates and named places.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best named place for a coordinate pair, `None` when nothing matches.
    async fn resolve_by_coordinates(&self, lat: f64, lon: f64)
        -> Result<Option<Location>, WeatherError>;

    /// Places matching a free-text query, best match first.
    async fn resolve_by_query(&self, query: &str) -> Result<Vec<Location>, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct GeocodingEntry {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
    #[serde(default)]
    state: Option<String>,
}

impl From<GeocodingEntry> for Location {
    fn from(entry: GeocodingEntry) -> Self {
        Location {
            latitude: entry.lat,
            longitude: entry.lon,
            name: entry.name,
            country: entry.country,
            state: entry.state,
        }
    }
}

#[async_trait]
impl Geocoder for OpenWeatherClient {
    #[instrument(skip(self), level = "debug")]
    async fn resolve_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Option<Location>, WeatherError> {
        let entries: Vec<GeocodingEntry> = self
            .get_json(
                "/geo/1.0/reverse",
                &[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        let location = entries.into_iter().next().map(Location::from);
        if let Some(loc) = &location {
            tracing::info!("Reverse geocoded to: {}", loc.display_name());
        }
        Ok(location)
    }

    #[instrument(skip(self), level = "debug")]
    async fn resolve_by_query(&self, query: &str) -> Result<Vec<Location>, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<GeocodingEntry> = self
            .get_json(
                "/geo/1.0/direct",
                &[("q", query.to_string()), ("limit", SEARCH_LIMIT.to_string())],
            )
            .await?;

        Ok(entries.into_iter().map(Location::from).collect())
    }
}
