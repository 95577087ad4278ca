//! Derived weather record and display methods

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Weather for one resolved station, as returned to the page.
///
/// Lives for a single request; it is derived from exactly one station
/// and one rain-forecast lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedWeather {
    /// "縣市 鄉鎮", or "縣市 (鄰近測站: 鄉鎮)" for a nearby-station match
    pub city: String,
    /// Name of the station the readings came from
    pub station: String,
    /// Air temperature in Celsius, one decimal
    pub temperature: f64,
    /// Feels-like temperature in Celsius, one decimal
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: i32,
    /// Wind level 0-6
    pub wind_level: u8,
    /// Weather description from the station
    pub description: String,
    /// Probability of precipitation in percent, 0 when unknown
    pub rain_chance: u8,
    /// Observation time reported by the station
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<FixedOffset>>,
}

impl ResolvedWeather {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    /// Format feels-like temperature with unit
    #[must_use]
    pub fn format_feels_like(&self) -> String {
        format!("{:.1}°C", self.feels_like)
    }

    /// Format wind level the way Taiwanese forecasts do ("3級")
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{}級", self.wind_level)
    }
}
