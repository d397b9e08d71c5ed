//! Display ordering for pollutant readings.

/// Weight given to pollutant ids that are not in the severity table.
pub const UNKNOWN_SEVERITY: u32 = 999;

/// Fixed display rank (lower is more harmful). Used for ordering only.
#[must_use]
pub fn severity_weight(pollutant: &str) -> u32 {
    match pollutant.to_ascii_lowercase().as_str() {
        "pm2_5" => 1,
        "pm10" => 2,
        "o3" => 3,
        "no2" => 4,
        "so2" => 5,
        "co" => 6,
        _ => UNKNOWN_SEVERITY,
    }
}

/// Reorder pollutant readings by severity weight, leaving values untouched.
///
/// Unknown pollutants sort last, ordered by id among themselves. The sort is
/// stable, so entries with equal weight otherwise keep their input order.
pub fn pollutant_sort<I, K>(readings: I) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = (K, f64)>,
    K: Into<String>,
{
    let mut sorted: Vec<(String, f64)> = readings
        .into_iter()
        .map(|(id, value)| (id.into(), value))
        .collect();

    sorted.sort_by(|(a, _), (b, _)| {
        let (wa, wb) = (severity_weight(a), severity_weight(b));
        if wa == UNKNOWN_SEVERITY && wb == UNKNOWN_SEVERITY {
            a.cmp(b)
        } else {
            wa.cmp(&wb)
        }
    });

    sorted
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn ids(sorted: &[(String, f64)]) -> Vec<&str> {
        sorted.iter().map(|(id, _)| id.as_str()).collect()
    }

    #[test]
    fn test_severity_order_ignores_values() {
        let sorted = pollutant_sort(vec![("co", 1.0), ("pm2_5", 1.0)]);
        assert_eq!(ids(&sorted), ["pm2_5", "co"]);

        let sorted = pollutant_sort(vec![("pm2_5", 1.0), ("co", 1.0)]);
        assert_eq!(ids(&sorted), ["pm2_5", "co"]);
    }

    #[test]
    fn test_full_provider_component_set() {
        let mut components = BTreeMap::new();
        for (id, value) in [
            ("co", 201.9),
            ("nh3", 0.5),
            ("no", 0.02),
            ("no2", 0.77),
            ("o3", 68.66),
            ("pm10", 0.54),
            ("pm2_5", 0.5),
            ("so2", 0.64),
        ] {
            components.insert(id.to_string(), value);
        }

        let sorted = pollutant_sort(components);
        assert_eq!(
            ids(&sorted),
            ["pm2_5", "pm10", "o3", "no2", "so2", "co", "nh3", "no"]
        );
    }

    #[test]
    fn test_values_are_preserved() {
        let sorted = pollutant_sort(vec![("so2", 12.5), ("o3", 80.25)]);
        assert_eq!(sorted, vec![("o3".to_string(), 80.25), ("so2".to_string(), 12.5)]);
    }

    #[test]
    fn test_unknown_ties_broken_by_id() {
        let sorted = pollutant_sort(vec![("zz", 1.0), ("nh3", 2.0), ("co", 3.0), ("aa", 4.0)]);
        assert_eq!(ids(&sorted), ["co", "aa", "nh3", "zz"]);
    }

    #[test]
    fn test_equal_known_weights_are_stable() {
        let sorted = pollutant_sort(vec![("PM2_5", 2.0), ("pm2_5", 1.0)]);
        assert_eq!(sorted[0].1, 2.0);
        assert_eq!(sorted[1].1, 1.0);
    }

    proptest! {
        #[test]
        fn pm2_5_always_before_co(co_first in any::<bool>(), co in 0.0f64..1e5, pm in 0.0f64..1e3) {
            let input = if co_first {
                vec![("co", co), ("pm2_5", pm)]
            } else {
                vec![("pm2_5", pm), ("co", co)]
            };
            let sorted = pollutant_sort(input);
            prop_assert_eq!(ids(&sorted), vec!["pm2_5", "co"]);
        }
    }
}
