use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Difference between the Kelvin and Celsius scales.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Condition ids the provider uses for "clear sky" and "few clouds".
const CLEAR_CONDITIONS: [u16; 2] = [800, 801];

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// A point on the globe, passed to the provider exactly as stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

/// One candidate returned by direct geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl GeocodeMatch {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Provider condition code, e.g. 800 for a clear sky.
    pub id: u16,
    /// Short label such as "Clouds" or "Rain".
    pub main: String,
    pub description: String,
}

impl Condition {
    pub fn unknown() -> Self {
        Self {
            id: 0,
            main: "Unknown".to_string(),
            description: "unknown".to_string(),
        }
    }
}

/// Current conditions for one location at the moment they were fetched.
///
/// Temperatures stay in Kelvin, as delivered by the provider; use the
/// `*_c` accessors for display values. A snapshot is never edited after
/// construction: each fetch produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Provider-assigned location id, unique per location.
    pub id: u64,
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub temperature_k: f64,
    pub temp_min_k: f64,
    pub temp_max_k: f64,
    pub humidity_pct: u8,
    pub condition: Condition,
    /// Signed seconds to add to UTC to get the location's local time.
    pub utc_offset_secs: i32,
    /// Client-side capture time.
    pub captured_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn temperature_c(&self) -> f64 {
        kelvin_to_celsius(self.temperature_k)
    }

    pub fn temp_min_c(&self) -> f64 {
        kelvin_to_celsius(self.temp_min_k)
    }

    pub fn temp_max_c(&self) -> f64 {
        kelvin_to_celsius(self.temp_max_k)
    }

    /// Whether the sky is clear enough to show a sun rather than a cloud.
    pub fn is_clear(&self) -> bool {
        CLEAR_CONDITIONS.contains(&self.condition.id)
    }

    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }

    /// Wall-clock time at the location when it is `now` in UTC.
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        (now + Duration::seconds(i64::from(self.utc_offset_secs))).naive_utc()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::snapshot;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn converts_kelvin_to_celsius() {
        let s = snapshot(1, "Tokyo", "JP");

        assert!((s.temperature_c() - 21.0).abs() < 1e-9);
        assert!((s.temp_min_c() - 19.0).abs() < 1e-9);
        assert!((s.temp_max_c() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn clear_sky_and_few_clouds_count_as_clear() {
        let mut s = snapshot(1, "Tokyo", "JP");
        assert!(!s.is_clear());

        s.condition.id = 800;
        assert!(s.is_clear());

        s.condition.id = 801;
        assert!(s.is_clear());

        s.condition.id = 802;
        assert!(!s.is_clear());
    }

    #[test]
    fn local_time_applies_utc_offset() {
        let s = snapshot(1, "Tokyo", "JP");
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 0, 30, 0).unwrap();

        let local = s.local_time(now);
        assert_eq!(local.to_string(), "2026-10-16 09:30:00");
    }

    #[test]
    fn negative_offset_goes_back_in_time() {
        let mut s = snapshot(1, "New York", "US");
        s.utc_offset_secs = -4 * 3600;
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 2, 0, 0).unwrap();

        assert_eq!(s.local_time(now).to_string(), "2026-10-15 22:00:00");
    }

    #[test]
    fn display_name_skips_missing_country() {
        let mut s = snapshot(1, "Tokyo", "JP");
        assert_eq!(s.display_name(), "Tokyo, JP");

        s.country.clear();
        assert_eq!(s.display_name(), "Tokyo");
    }
}
