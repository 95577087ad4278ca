//! Observation station model

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A CWA observation station with its latest readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    /// Station name, e.g. "板橋"
    pub name: String,
    /// County or city the station belongs to, e.g. "新北市"
    pub county: String,
    /// Township / district, e.g. "板橋區"
    pub town: String,
    /// Latest sensor readings
    pub readings: StationReadings,
    /// Time of the observation, if reported
    pub observed_at: Option<DateTime<FixedOffset>>,
}

/// Raw sensor readings; a reading is `None` when the upstream value
/// was absent or not a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationReadings {
    /// Air temperature in Celsius
    pub air_temperature: Option<f64>,
    /// Relative humidity in percent
    pub relative_humidity: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed: Option<f64>,
    /// Textual weather description, e.g. "多雲"
    pub weather: Option<String>,
}

impl StationRecord {
    /// Create a station without an observation time
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        county: impl Into<String>,
        town: impl Into<String>,
        readings: StationReadings,
    ) -> Self {
        Self {
            name: name.into(),
            county: county.into(),
            town: town.into(),
            readings,
            observed_at: None,
        }
    }
}

impl StationReadings {
    /// Readings with every value present
    #[must_use]
    pub fn complete(temperature: f64, humidity: f64, wind_speed: f64, weather: &str) -> Self {
        Self {
            air_temperature: Some(temperature),
            relative_humidity: Some(humidity),
            wind_speed: Some(wind_speed),
            weather: Some(weather.to_string()),
        }
    }
}
