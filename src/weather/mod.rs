//! Weather derivation from raw station readings
//!
//! Sensor-fault clamping, the feels-like formula and the 0-6 wind level
//! used by the recommendation prompt.

use crate::location_resolver::{MatchKind, StationMatch};
use crate::models::ResolvedWeather;
use crate::{Result, WeatherWearError};
use tracing::warn;

pub mod cwa;

/// Readings below this are treated as a broken sensor
pub const SENSOR_FAULT_THRESHOLD_C: f64 = -50.0;
/// Temperature used in place of a faulty reading
pub const FALLBACK_TEMPERATURE_C: f64 = 25.0;

/// Lower bound (m/s) of wind levels 1 through 6
pub const WIND_LEVEL_THRESHOLDS: [f64; 6] = [0.3, 1.6, 3.4, 5.5, 8.0, 10.8];

/// Replace implausible temperatures (CWA reports -99 for missing values)
#[must_use]
pub fn sanitize_temperature(temperature: f64) -> f64 {
    if temperature < SENSOR_FAULT_THRESHOLD_C {
        warn!(
            "Temperature reading {:.1}°C looks like a sensor fault, using {:.1}°C",
            temperature, FALLBACK_TEMPERATURE_C
        );
        FALLBACK_TEMPERATURE_C
    } else {
        temperature
    }
}

/// Apparent temperature from air temperature (°C), relative humidity (%)
/// and wind speed (m/s).
///
/// Vapor pressure uses the August-Roche-Magnus approximation.
#[must_use]
pub fn feels_like(temperature: f64, humidity: f64, wind_speed: f64) -> f64 {
    let vapor_pressure =
        (humidity / 100.0) * 6.105 * ((17.27 * temperature) / (237.7 + temperature)).exp();
    temperature + 0.33 * vapor_pressure - 0.7 * wind_speed - 4.0
}

/// Wind level 0-6 for a wind speed in m/s
#[must_use]
pub fn wind_level(wind_speed: f64) -> u8 {
    let mut level = 0;
    for (i, threshold) in WIND_LEVEL_THRESHOLDS.iter().enumerate() {
        if wind_speed >= *threshold {
            level = i as u8 + 1;
        }
    }
    level
}

/// Round to one decimal place for display.
///
/// Ties on the exact binary value go to the even digit, so 0.25 becomes 0.2.
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Display label for a matched station
#[must_use]
pub fn display_city(county: &str, town: &str, kind: MatchKind) -> String {
    match kind {
        MatchKind::Exact => format!("{county} {town}"),
        MatchKind::Nearby => format!("{county} (鄰近測站: {town})"),
    }
}

/// Build the response record for a matched station.
///
/// Fails when the station is missing a temperature, humidity or wind reading.
pub fn derive_weather(found: &StationMatch<'_>, rain_chance: u8) -> Result<ResolvedWeather> {
    let station = found.station;
    let readings = &station.readings;
    let missing = |field: &str| {
        WeatherWearError::api(format!(
            "Station {} has no usable {} reading",
            station.name, field
        ))
    };

    let temperature = sanitize_temperature(
        readings
            .air_temperature
            .ok_or_else(|| missing("AirTemperature"))?,
    );
    let humidity = readings
        .relative_humidity
        .ok_or_else(|| missing("RelativeHumidity"))?;
    let wind_speed = readings.wind_speed.ok_or_else(|| missing("WindSpeed"))?;

    Ok(ResolvedWeather {
        city: display_city(&station.county, &station.town, found.kind),
        station: station.name.clone(),
        temperature: round_one_decimal(temperature),
        feels_like: round_one_decimal(feels_like(temperature, humidity, wind_speed)),
        humidity: humidity as i32,
        wind_level: wind_level(wind_speed),
        description: readings.weather.clone().unwrap_or_default(),
        rain_chance: rain_chance.min(100),
        observed_at: station.observed_at,
    })
}
