//! Banded descriptions for numeric readings.

const MPS_TO_MPH: f64 = 2.2369362921;

/// Upper bound (inclusive, in whole mph) for each wind band after "Calm".
const WIND_LADDER: &[(f64, &str)] = &[
    (3.0, "Light Air"),
    (7.0, "Light Breeze"),
    (12.0, "Gentle Breeze"),
    (18.0, "Moderate Breeze"),
    (24.0, "Fresh Breeze"),
    (31.0, "Strong Breeze"),
    (38.0, "Near Gale"),
    (46.0, "Gale"),
    (54.0, "Strong Gale"),
    (63.0, "Storm"),
    (75.0, "Violent Storm"),
];

const COMPASS: [&str; 17] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW", "N",
];

const UV_LADDER: &[(f64, &str)] = &[
    (2.0, "low"),
    (5.0, "moderate"),
    (7.0, "high"),
    (10.0, "very high"),
];

/// One air quality band: inclusive `[min, max]`, `max == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub label: &'static str,
    pub min: f64,
    pub max: Option<f64>,
}

impl Band {
    const fn new(label: &'static str, min: f64, max: Option<f64>) -> Self {
        Self { label, min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }
}

macro_rules! bands {
    ($a:expr, $b:expr, $c:expr, $d:expr) => {
        [
            Band::new("good", 0.0, Some($a)),
            Band::new("fair", $a, Some($b)),
            Band::new("moderate", $b, Some($c)),
            Band::new("poor", $c, Some($d)),
            Band::new("very poor", $d, None),
        ]
    };
}

const SO2_BANDS: [Band; 5] = bands!(20.0, 80.0, 250.0, 350.0);
const NO2_BANDS: [Band; 5] = bands!(40.0, 70.0, 150.0, 200.0);
const PM10_BANDS: [Band; 5] = bands!(20.0, 50.0, 100.0, 200.0);
const PM2_5_BANDS: [Band; 5] = bands!(10.0, 25.0, 50.0, 75.0);
const O3_BANDS: [Band; 5] = bands!(60.0, 100.0, 140.0, 180.0);
const CO_BANDS: [Band; 5] = bands!(4400.0, 9400.0, 12400.0, 15400.0);

/// Band table for a pollutant id, matched case-insensitively.
pub fn pollutant_bands(pollutant: &str) -> Option<&'static [Band]> {
    let table: &'static [Band] = match pollutant.to_ascii_lowercase().as_str() {
        "so2" => &SO2_BANDS,
        "no2" => &NO2_BANDS,
        "pm10" => &PM10_BANDS,
        "pm2_5" => &PM2_5_BANDS,
        "o3" => &O3_BANDS,
        "co" => &CO_BANDS,
        _ => return None,
    };
    Some(table)
}

/// Beaufort-style description of a wind speed given in m/s.
#[must_use]
pub fn wind_speed_to_description(meters_per_second: f64) -> &'static str {
    let mph = (meters_per_second * MPS_TO_MPH).round();
    if mph < 1.0 {
        return "Calm";
    }
    WIND_LADDER
        .iter()
        .find(|(max, _)| mph <= *max)
        .map_or("Hurricane", |&(_, label)| label)
}

/// 16-point compass direction for a bearing in degrees.
#[must_use]
pub fn degrees_to_compass_direction(degree: f64) -> &'static str {
    let normalized = degree.rem_euclid(360.0);
    if !normalized.is_finite() {
        return COMPASS[0];
    }
    let index = (normalized / 22.5).round() as usize;
    COMPASS[index.min(COMPASS.len() - 1)]
}

#[must_use]
pub fn ultraviolet_index_to_description(uvi: f64) -> &'static str {
    UV_LADDER
        .iter()
        .find(|(max, _)| uvi <= *max)
        .map_or("extreme", |&(_, label)| label)
}

/// Air quality label for a single pollutant concentration (µg/m³).
///
/// When several bands contain the value the later one in the table wins, so a
/// value sitting on a shared boundary is reported in the higher band. Unknown
/// pollutants and values outside every band yield an empty string.
#[must_use]
pub fn pollutant_concentration_to_description(pollutant: &str, concentration: f64) -> &'static str {
    let Some(bands) = pollutant_bands(pollutant) else {
        return "";
    };
    bands
        .iter()
        .rev()
        .find(|band| band.contains(concentration))
        .map_or("", |band| band.label)
}

/// Label for the provider's overall 1-5 air quality index.
#[must_use]
pub fn air_quality_index_to_description(aqi: u8) -> &'static str {
    match aqi {
        1 => "Good",
        2 => "Fair",
        3 => "Moderate",
        4 => "Poor",
        5 => "Very Poor",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_calm() {
        assert_eq!(wind_speed_to_description(0.0), "Calm");
        assert_eq!(wind_speed_to_description(0.2), "Calm");
    }

    #[test]
    fn test_wind_upper_bound_is_inclusive() {
        // 3.1293 m/s is 6.99998 mph, which rounds to exactly 7
        assert_eq!(wind_speed_to_description(3.1293), "Light Breeze");
        // 8 mph
        assert_eq!(wind_speed_to_description(3.5763), "Gentle Breeze");
    }

    #[test]
    fn test_wind_ladder_extremes() {
        assert_eq!(wind_speed_to_description(1.0), "Light Air");
        assert_eq!(wind_speed_to_description(20.0), "Gale");
        assert_eq!(wind_speed_to_description(33.5), "Violent Storm");
        assert_eq!(wind_speed_to_description(40.0), "Hurricane");
    }

    #[test]
    fn test_compass_cardinal_points() {
        assert_eq!(degrees_to_compass_direction(0.0), "N");
        assert_eq!(degrees_to_compass_direction(90.0), "E");
        assert_eq!(degrees_to_compass_direction(180.0), "S");
        assert_eq!(degrees_to_compass_direction(270.0), "W");
    }

    #[test]
    fn test_compass_wraps_to_north() {
        assert_eq!(degrees_to_compass_direction(359.0), "N");
        assert_eq!(degrees_to_compass_direction(348.75), "N");
        assert_eq!(degrees_to_compass_direction(348.0), "NNW");
        assert_eq!(degrees_to_compass_direction(720.0), "N");
    }

    #[test]
    fn test_compass_negative_degrees() {
        assert_eq!(degrees_to_compass_direction(-90.0), "W");
        assert_eq!(degrees_to_compass_direction(-22.5), "NNW");
    }

    #[test]
    fn test_compass_non_finite() {
        assert_eq!(degrees_to_compass_direction(f64::NAN), "N");
        assert_eq!(degrees_to_compass_direction(f64::INFINITY), "N");
    }

    #[test]
    fn test_uv_bands() {
        assert_eq!(ultraviolet_index_to_description(0.0), "low");
        assert_eq!(ultraviolet_index_to_description(2.0), "low");
        assert_eq!(ultraviolet_index_to_description(2.1), "moderate");
        assert_eq!(ultraviolet_index_to_description(7.0), "high");
        assert_eq!(ultraviolet_index_to_description(10.0), "very high");
        assert_eq!(ultraviolet_index_to_description(11.0), "extreme");
    }

    #[test]
    fn test_pollutant_boundary_resolves_to_higher_band() {
        assert_eq!(pollutant_concentration_to_description("pm2_5", 10.0), "fair");
        assert_eq!(pollutant_concentration_to_description("pm2_5", 9.9), "good");
        assert_eq!(pollutant_concentration_to_description("so2", 350.0), "very poor");
    }

    #[test]
    fn test_pollutant_lookup_is_case_insensitive() {
        assert_eq!(pollutant_concentration_to_description("PM10", 30.0), "fair");
        assert_eq!(pollutant_concentration_to_description("Co", 10000.0), "moderate");
    }

    #[test]
    fn test_pollutant_last_band_is_unbounded() {
        assert_eq!(pollutant_concentration_to_description("o3", 1.0e6), "very poor");
    }

    #[test]
    fn test_unknown_pollutant_or_value_is_empty() {
        assert_eq!(pollutant_concentration_to_description("nh3", 5.0), "");
        assert_eq!(pollutant_concentration_to_description("no2", -1.0), "");
        assert_eq!(pollutant_concentration_to_description("no2", f64::NAN), "");
    }

    #[test]
    fn test_air_quality_index() {
        assert_eq!(air_quality_index_to_description(1), "Good");
        assert_eq!(air_quality_index_to_description(5), "Very Poor");
        assert_eq!(air_quality_index_to_description(0), "");
    }
}
