//! Location, provider payload and error types shared across the crate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair as reported by a geolocation source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both values are finite and inside the valid geographic ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Resolved place, cached under `userLocation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl Location {
    /// Location with no place name, used when reverse geocoding finds nothing.
    pub fn from_coordinates(coords: Coordinates) -> Self {
        Self {
            latitude: coords.latitude,
            longitude: coords.longitude,
            name: format!("{:.4}, {:.4}", coords.latitude, coords.longitude),
            country: String::new(),
            state: None,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Human readable label such as "Springfield, Illinois, US".
    pub fn display_name(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(state) = self.state.as_deref().filter(|s| !s.is_empty() && *s != self.name) {
            parts.push(state);
        }
        if !self.country.is_empty() {
            parts.push(self.country.as_str());
        }
        parts.join(", ")
    }
}

/// Weather condition entry as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: i32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Precipitation volume over the last hour, in mm
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyVolume {
    #[serde(rename = "1h", default)]
    pub one_hour: f64,
}

/// Current observation. Temperatures in °C, speeds in m/s, visibility in metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentObservation {
    pub dt: i64,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default)]
    pub pressure: f64,
    /// Relative humidity in percent (0-100)
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub dew_point: f64,
    #[serde(default)]
    pub uvi: f64,
    #[serde(default)]
    pub clouds: f64,
    #[serde(default)]
    pub visibility: Option<f64>,
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_deg: f64,
    #[serde(default)]
    pub wind_gust: Option<f64>,
    #[serde(default)]
    pub rain: Option<HourlyVolume>,
    #[serde(default)]
    pub snow: Option<HourlyVolume>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

impl CurrentObservation {
    /// Combined rain and snow volume for the last hour, in mm.
    pub fn precipitation_mm(&self) -> f64 {
        self.rain.map_or(0.0, |r| r.one_hour) + self.snow.map_or(0.0, |s| s.one_hour)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyForecast {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub dew_point: f64,
    pub uvi: f64,
    pub clouds: f64,
    pub visibility: Option<f64>,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub wind_gust: Option<f64>,
    /// Probability of precipitation (0.0-1.0)
    pub pop: f64,
    pub rain: Option<HourlyVolume>,
    pub snow: Option<HourlyVolume>,
    pub weather: Vec<WeatherCondition>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyTemperature {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyFeelsLike {
    pub day: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyForecast {
    pub dt: i64,
    pub sunrise: i64,
    pub sunset: i64,
    pub moonrise: i64,
    pub moonset: i64,
    pub moon_phase: f64,
    pub temp: DailyTemperature,
    pub feels_like: DailyFeelsLike,
    pub pressure: f64,
    pub humidity: f64,
    pub dew_point: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub wind_gust: Option<f64>,
    pub clouds: f64,
    pub pop: f64,
    pub uvi: f64,
    /// Daily rain volume in mm
    pub rain: Option<f64>,
    pub snow: Option<f64>,
    pub weather: Vec<WeatherCondition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherAlert {
    pub sender_name: String,
    pub event: String,
    pub start: i64,
    pub end: i64,
    pub description: String,
    pub tags: Vec<String>,
}

/// Current conditions plus forecast, always in metric base units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub timezone_offset: i64,
    pub current: CurrentObservation,
    #[serde(default)]
    pub hourly: Vec<HourlyForecast>,
    #[serde(default)]
    pub daily: Vec<DailyForecast>,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Overall air quality index on the provider's 1-5 scale
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQualityIndex {
    pub aqi: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantEntry {
    pub dt: i64,
    pub main: AirQualityIndex,
    /// Concentrations in µg/m³ keyed by pollutant id (pm2_5, pm10, o3, ...)
    pub components: BTreeMap<String, f64>,
}

/// Air pollution reading for a location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantSnapshot {
    pub coord: GeoPoint,
    #[serde(default)]
    pub list: Vec<PollutantEntry>,
}

impl PollutantSnapshot {
    /// The current reading; the provider returns it first.
    pub fn latest(&self) -> Option<&PollutantEntry> {
        self.list.first()
    }
}

/// Location service errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WeatherError::Network(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(0.0, 0.0).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(90.1, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_display_name_skips_empty_parts() {
        let loc = Location {
            latitude: 39.8,
            longitude: -89.6,
            name: "Springfield".into(),
            country: "US".into(),
            state: Some("Illinois".into()),
        };
        assert_eq!(loc.display_name(), "Springfield, Illinois, US");

        let bare = Location::from_coordinates(Coordinates::new(1.5, 2.25));
        assert_eq!(bare.display_name(), "1.5000, 2.2500");
    }

    #[test]
    fn test_parse_current_with_optional_fields_missing() {
        let json = serde_json::json!({
            "lat": 51.5,
            "lon": -0.12,
            "current": {
                "dt": 1700000000,
                "temp": 11.3,
                "feels_like": 10.1,
                "wind_speed": 4.6,
                "rain": { "1h": 0.4 },
                "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }]
            }
        });

        let snapshot: TelemetrySnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.current.visibility, None);
        assert!((snapshot.current.precipitation_mm() - 0.4).abs() < f64::EPSILON);
        assert!(snapshot.hourly.is_empty());
        assert_eq!(snapshot.current.weather[0].main, "Rain");
    }

    #[test]
    fn test_parse_pollution_keeps_unknown_components() {
        let json = serde_json::json!({
            "coord": { "lat": 51.5, "lon": -0.12 },
            "list": [{
                "dt": 1700000000,
                "main": { "aqi": 2 },
                "components": { "co": 201.9, "no": 0.02, "pm2_5": 3.1, "nh3": 0.5 }
            }]
        });

        let snapshot: PollutantSnapshot = serde_json::from_value(json).unwrap();
        let entry = snapshot.latest().unwrap();
        assert_eq!(entry.main.aqi, 2);
        assert_eq!(entry.components.len(), 4);
        assert!(entry.components.contains_key("nh3"));
    }
}
