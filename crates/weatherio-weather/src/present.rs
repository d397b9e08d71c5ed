//! Display-ready views over cached snapshots.

use crate::classify::{
    air_quality_index_to_description, degrees_to_compass_direction,
    pollutant_concentration_to_description, ultraviolet_index_to_description,
    wind_speed_to_description,
};
use crate::convert::{
    convert_precipitation, convert_speed, convert_temperature, convert_to_percentage,
    convert_visibility, round_to_decimal, UnitSystem,
};
use crate::paginate::{split_into_groups, PaginationError};
use crate::pollutant::pollutant_sort;
use crate::types::{PollutantSnapshot, TelemetrySnapshot};

/// Pollutant rows shown per page in the air quality panel.
pub const POLLUTANTS_PER_PAGE: usize = 4;

/// Formatted current conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentConditions {
    pub temperature: String,
    pub feels_like: String,
    pub summary: String,
    pub wind_speed: String,
    pub wind_description: &'static str,
    pub wind_direction: &'static str,
    pub humidity: String,
    pub visibility: Option<String>,
    pub precipitation: String,
    pub uv_index: String,
    pub uv_description: &'static str,
}

impl CurrentConditions {
    pub fn from_snapshot(snapshot: &TelemetrySnapshot, units: UnitSystem) -> Self {
        let current = &snapshot.current;
        Self {
            temperature: convert_temperature(units, current.temp),
            feels_like: convert_temperature(units, current.feels_like),
            summary: current
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_default(),
            wind_speed: convert_speed(units, current.wind_speed),
            wind_description: wind_speed_to_description(current.wind_speed),
            wind_direction: degrees_to_compass_direction(current.wind_deg),
            humidity: convert_to_percentage(current.humidity / 100.0),
            visibility: current.visibility.map(|v| convert_visibility(units, v)),
            precipitation: convert_precipitation(units, current.precipitation_mm()),
            uv_index: round_to_decimal(current.uvi, 1),
            uv_description: ultraviolet_index_to_description(current.uvi),
        }
    }
}

/// One classified pollutant row
#[derive(Debug, Clone, PartialEq)]
pub struct PollutantRow {
    pub id: String,
    pub concentration: f64,
    pub description: &'static str,
}

/// Overall label plus ranked rows grouped into pages.
#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityView {
    pub overall: &'static str,
    pub pages: Vec<Vec<PollutantRow>>,
}

impl AirQualityView {
    /// Build the view from the latest reading in `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns an error when `per_page` is zero.
    pub fn from_snapshot(
        snapshot: &PollutantSnapshot,
        per_page: usize,
    ) -> Result<Self, PaginationError> {
        let Some(entry) = snapshot.latest() else {
            return Ok(Self {
                overall: "",
                pages: split_into_groups::<PollutantRow>(&[], per_page)?,
            });
        };

        let rows: Vec<PollutantRow> = pollutant_sort(
            entry
                .components
                .iter()
                .map(|(id, value)| (id.as_str(), *value)),
        )
        .into_iter()
        .map(|(id, concentration)| PollutantRow {
            description: pollutant_concentration_to_description(&id, concentration),
            id,
            concentration,
        })
        .collect();

        Ok(Self {
            overall: air_quality_index_to_description(entry.main.aqi),
            pages: split_into_groups(&rows, per_page)?,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn telemetry() -> TelemetrySnapshot {
        serde_json::from_value(serde_json::json!({
            "lat": 51.5,
            "lon": -0.12,
            "current": {
                "dt": 1700000000,
                "temp": 0.0,
                "feels_like": -2.35,
                "humidity": 81,
                "uvi": 6.5,
                "visibility": 10000,
                "wind_speed": 10.0,
                "wind_deg": 90,
                "rain": { "1h": 2.54 },
                "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_metric_conditions() {
        let view = CurrentConditions::from_snapshot(&telemetry(), UnitSystem::Metric);
        assert_eq!(view.temperature, "0.0°C");
        assert_eq!(view.feels_like, "-2.4°C");
        assert_eq!(view.summary, "light rain");
        assert_eq!(view.wind_speed, "10.0m/s");
        assert_eq!(view.wind_description, "Fresh Breeze");
        assert_eq!(view.wind_direction, "E");
        assert_eq!(view.humidity, "81%");
        assert_eq!(view.visibility.as_deref(), Some("10.0km"));
        assert_eq!(view.precipitation, "2.5mm");
        assert_eq!(view.uv_index, "6.5");
        assert_eq!(view.uv_description, "high");
    }

    #[test]
    fn test_imperial_conditions() {
        let view = CurrentConditions::from_snapshot(&telemetry(), UnitSystem::Imperial);
        assert_eq!(view.temperature, "32.0°F");
        assert_eq!(view.wind_speed, "22.4mi/h");
        assert_eq!(view.visibility.as_deref(), Some("6.2mi"));
        assert_eq!(view.precipitation, "0.1in");
        // descriptions don't depend on units
        assert_eq!(view.wind_description, "Fresh Breeze");
    }

    #[test]
    fn test_air_quality_pages_are_ranked_and_classified() {
        let snapshot: PollutantSnapshot = serde_json::from_value(serde_json::json!({
            "coord": { "lat": 51.5, "lon": -0.12 },
            "list": [{
                "dt": 1700000000,
                "main": { "aqi": 2 },
                "components": {
                    "co": 201.9, "nh3": 0.5, "no": 0.02, "no2": 45.0,
                    "o3": 68.66, "pm10": 0.54, "pm2_5": 10.0, "so2": 0.64
                }
            }]
        }))
        .unwrap();

        let view = AirQualityView::from_snapshot(&snapshot, POLLUTANTS_PER_PAGE).unwrap();
        assert_eq!(view.overall, "Fair");
        assert_eq!(view.pages.len(), 2);

        let first: Vec<_> = view.pages[0].iter().map(|r| (r.id.as_str(), r.description)).collect();
        assert_eq!(
            first,
            [("pm2_5", "fair"), ("pm10", "good"), ("o3", "fair"), ("no2", "fair")]
        );

        let second: Vec<_> = view.pages[1].iter().map(|r| (r.id.as_str(), r.description)).collect();
        assert_eq!(second, [("so2", "good"), ("co", "good"), ("nh3", ""), ("no", "")]);
    }

    #[test]
    fn test_empty_pollution_snapshot() {
        let view = AirQualityView::from_snapshot(&PollutantSnapshot::default(), 4).unwrap();
        assert_eq!(view.overall, "");
        assert!(view.pages.is_empty());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = AirQualityView::from_snapshot(&PollutantSnapshot::default(), 0).unwrap_err();
        assert_eq!(err, PaginationError::ZeroChunkSize);
    }
}
