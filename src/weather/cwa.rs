//! Client for the Central Weather Administration (CWA) open-data API
//!
//! Two datasets are used: `O-A0003-001` (current observations of every open
//! station) and `F-C0032-001` (36-hour county forecast, for the probability
//! of precipitation).

use crate::config::CwaConfig;
use crate::models::{StationReadings, StationRecord};
use crate::{Result, WeatherWearError};
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Current observations dataset
pub const OBSERVATION_DATASET: &str = "O-A0003-001";
/// County forecast dataset
pub const FORECAST_DATASET: &str = "F-C0032-001";
/// Forecast element holding the probability of precipitation
const POP_ELEMENT: &str = "PoP";

/// CWA datastore client
pub struct CwaClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CwaClient {
    /// Create a new client from configuration
    pub fn new(config: &CwaConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| WeatherWearError::config("CWA API key is not configured"))?;

        if config.accept_invalid_certs {
            warn!("TLS certificate validation is disabled for CWA requests");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("WeatherWear/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| WeatherWearError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Fetch the latest observations of every open station, in API order
    #[instrument(skip(self))]
    pub async fn fetch_stations(&self) -> Result<Vec<StationRecord>> {
        let start_time = Instant::now();
        let body = self
            .get_dataset(OBSERVATION_DATASET, &[("StationStatus", "OPEN")])
            .await?;

        let parsed: ObservationResponse = serde_json::from_str(&body)?;
        let stations: Vec<StationRecord> = parsed
            .records
            .station
            .into_iter()
            .map(StationRecord::from)
            .collect();

        info!(
            "Fetched {} stations in {:.3}s",
            stations.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(stations)
    }

    /// Probability of precipitation (percent) for the first forecast period
    #[instrument(skip(self))]
    pub async fn fetch_rain_chance(&self, county: &str) -> Result<u8> {
        let body = self
            .get_dataset(FORECAST_DATASET, &[("locationName", county)])
            .await?;

        let parsed: ForecastResponse = serde_json::from_str(&body)?;
        let pop = parsed
            .records
            .location
            .iter()
            .filter(|loc| loc.location_name == county)
            .find_map(|loc| {
                loc.weather_element
                    .iter()
                    .find(|e| e.element_name == POP_ELEMENT)
            })
            .ok_or_else(|| WeatherWearError::api(format!("No PoP forecast for {county}")))?;

        let value = pop
            .time
            .first()
            .map(|slot| slot.parameter.parameter_name.trim())
            .ok_or_else(|| WeatherWearError::api(format!("Empty PoP forecast for {county}")))?;

        let percent: u32 = value
            .parse()
            .map_err(|_| WeatherWearError::api(format!("Invalid PoP value '{value}'")))?;

        debug!("Rain chance for {}: {}%", county, percent);
        Ok(percent.min(100) as u8)
    }

    /// Rain chance, or `None` when the forecast could not be read
    pub async fn rain_chance(&self, county: &str) -> Option<u8> {
        match self.fetch_rain_chance(county).await {
            Ok(percent) => Some(percent),
            Err(e) => {
                warn!("Rain chance unavailable for {}: {}", county, e);
                None
            }
        }
    }

    async fn get_dataset(&self, dataset: &str, extra: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, dataset);
        debug!("CWA request: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("Authorization", self.api_key.as_str()),
                ("format", "JSON"),
            ])
            .query(extra)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                "CWA {} request failed with status {}: {}",
                dataset,
                status,
                truncate_body(&body)
            );
            return Err(WeatherWearError::api(format!(
                "CWA {dataset} request failed with status {status}"
            )));
        }

        Ok(body)
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Observation value as sent by CWA: usually a number, sometimes a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Reading {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Reading {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Reading::Number(n) => Some(*n),
            Reading::Text(s) => s.trim().parse().ok(),
            Reading::Other(_) => None,
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Reading::Text(s) => Some(s),
            Reading::Number(n) => Some(n.to_string()),
            Reading::Other(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObservationResponse {
    records: ObservationRecords,
}

#[derive(Debug, Deserialize)]
struct ObservationRecords {
    #[serde(rename = "Station", default)]
    station: Vec<WireStation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireStation {
    station_name: String,
    geo_info: WireGeoInfo,
    #[serde(default)]
    weather_element: WireWeatherElement,
    obs_time: Option<WireObsTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireGeoInfo {
    county_name: String,
    town_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireWeatherElement {
    air_temperature: Option<Reading>,
    relative_humidity: Option<Reading>,
    wind_speed: Option<Reading>,
    weather: Option<Reading>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireObsTime {
    date_time: Option<String>,
}

impl From<WireStation> for StationRecord {
    fn from(wire: WireStation) -> Self {
        let element = wire.weather_element;
        let observed_at = wire
            .obs_time
            .and_then(|t| t.date_time)
            .and_then(|s| DateTime::<FixedOffset>::parse_from_rfc3339(&s).ok());

        Self {
            name: wire.station_name,
            county: wire.geo_info.county_name,
            town: wire.geo_info.town_name,
            readings: StationReadings {
                air_temperature: element.air_temperature.as_ref().and_then(Reading::as_f64),
                relative_humidity: element.relative_humidity.as_ref().and_then(Reading::as_f64),
                wind_speed: element.wind_speed.as_ref().and_then(Reading::as_f64),
                weather: element.weather.and_then(Reading::into_text),
            },
            observed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    records: ForecastRecords,
}

#[derive(Debug, Deserialize)]
struct ForecastRecords {
    #[serde(default)]
    location: Vec<WireLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLocation {
    location_name: String,
    #[serde(default)]
    weather_element: Vec<WireForecastElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireForecastElement {
    element_name: String,
    #[serde(default)]
    time: Vec<WireTimeSlot>,
}

#[derive(Debug, Deserialize)]
struct WireTimeSlot {
    parameter: WireParameter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireParameter {
    parameter_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CwaClient {
        let config = CwaConfig {
            api_key: Some("CWA-TEST-KEY".to_string()),
            base_url: server.uri(),
            ..CwaConfig::default()
        };
        CwaClient::new(&config).unwrap()
    }

    fn forecast_body(county: &str, pop: &str) -> serde_json::Value {
        json!({
            "success": "true",
            "records": {
                "location": [{
                    "locationName": county,
                    "weatherElement": [
                        {"elementName": "Wx", "time": [{"parameter": {"parameterName": "多雲"}}]},
                        {"elementName": "PoP", "time": [
                            {"parameter": {"parameterName": pop, "parameterUnit": "百分比"}},
                            {"parameter": {"parameterName": "90", "parameterUnit": "百分比"}}
                        ]}
                    ]
                }]
            }
        })
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = CwaClient::new(&CwaConfig::default());
        assert!(matches!(result, Err(WeatherWearError::Config { .. })));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let long = "測".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn test_fetch_stations_parses_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/O-A0003-001"))
            .and(query_param("Authorization", "CWA-TEST-KEY"))
            .and(query_param("StationStatus", "OPEN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": "true",
                "records": {"Station": [
                    {
                        "StationName": "臺北",
                        "ObsTime": {"DateTime": "2024-05-01T14:00:00+08:00"},
                        "GeoInfo": {"CountyName": "臺北市", "TownName": "中正區"},
                        "WeatherElement": {
                            "Weather": "多雲",
                            "AirTemperature": 28.4,
                            "RelativeHumidity": "71",
                            "WindSpeed": 2.3
                        }
                    },
                    {
                        "StationName": "鞍部",
                        "GeoInfo": {"CountyName": "臺北市", "TownName": "北投區"},
                        "WeatherElement": {"AirTemperature": {"unexpected": true}, "Weather": null}
                    }
                ]}
            })))
            .mount(&server)
            .await;

        let stations = client_for(&server).fetch_stations().await.unwrap();
        assert_eq!(stations.len(), 2);

        let taipei = &stations[0];
        assert_eq!(taipei.name, "臺北");
        assert_eq!(taipei.county, "臺北市");
        assert_eq!(taipei.town, "中正區");
        assert_eq!(taipei.readings.air_temperature, Some(28.4));
        assert_eq!(taipei.readings.relative_humidity, Some(71.0));
        assert_eq!(taipei.readings.weather.as_deref(), Some("多雲"));
        assert!(taipei.observed_at.is_some());

        let anbu = &stations[1];
        assert_eq!(anbu.readings.air_temperature, None);
        assert_eq!(anbu.readings.weather, None);
        assert!(anbu.observed_at.is_none());
    }

    #[tokio::test]
    async fn test_fetch_stations_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/O-A0003-001"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_stations().await.unwrap_err();
        assert!(matches!(err, WeatherWearError::Api { .. }));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_rain_chance_uses_first_time_slot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/F-C0032-001"))
            .and(query_param("locationName", "臺北市"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("臺北市", "30")))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.fetch_rain_chance("臺北市").await.unwrap(), 30);
        assert_eq!(client.rain_chance("臺北市").await, Some(30));
    }

    #[tokio::test]
    async fn test_rain_chance_ignores_other_counties() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/F-C0032-001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("新北市", "70")))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).rain_chance("臺北市").await, None);
    }

    #[tokio::test]
    async fn test_rain_chance_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/F-C0032-001"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).rain_chance("臺北市").await, None);
    }

    #[tokio::test]
    async fn test_rain_chance_non_numeric_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/F-C0032-001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("臺北市", "-")))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.fetch_rain_chance("臺北市").await.is_err());
        assert_eq!(client.rain_chance("臺北市").await, None);
    }

    #[tokio::test]
    async fn test_rain_chance_network_error() {
        let config = CwaConfig {
            api_key: Some("CWA-TEST-KEY".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..CwaConfig::default()
        };
        let client = CwaClient::new(&config).unwrap();
        assert_eq!(client.rain_chance("臺北市").await, None);
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        let key = "CWA-SECRET-KEY-123";
        let config = CwaConfig {
            api_key: Some(key.to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..CwaConfig::default()
        };
        let client = CwaClient::new(&config).unwrap();

        let err = client.fetch_rain_chance("臺北市").await.unwrap_err();
        assert!(matches!(err, WeatherWearError::Api { .. }));
        assert!(!err.to_string().contains(key), "key leaked: {err}");

        let err = client.fetch_stations().await.unwrap_err();
        assert!(!err.to_string().contains(key), "key leaked: {err}");
    }
}
