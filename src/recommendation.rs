//! Recommendation pipeline
//!
//! place name → station → derived weather → rain chance → advice

use crate::advice::AdviceComposer;
use crate::location_resolver::{parse_place, resolve_station};
use crate::models::ResolvedWeather;
use crate::weather::{cwa::CwaClient, derive_weather};
use crate::{Result, WeatherWearError};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Message for an empty city field
pub const MISSING_CITY_MESSAGE: &str = "請輸入城市名稱";

/// Weather plus the advice written for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub weather: ResolvedWeather,
    pub advice: String,
}

/// Runs one recommendation request end to end.
///
/// Built once at startup and shared by every request.
pub struct RecommendationService {
    cwa: CwaClient,
    composer: AdviceComposer,
}

impl RecommendationService {
    #[must_use]
    pub fn new(cwa: CwaClient, composer: AdviceComposer) -> Self {
        Self { cwa, composer }
    }

    /// Resolve a free-text place name to current weather
    #[instrument(skip(self))]
    pub async fn lookup_weather(&self, city: &str) -> Result<ResolvedWeather> {
        if city.trim().is_empty() {
            return Err(WeatherWearError::validation(MISSING_CITY_MESSAGE));
        }

        let query = parse_place(city);
        info!(
            "Looking up weather for keyword '{}' (county {:?})",
            query.keyword,
            query.county.map(|c| c.as_str())
        );

        let stations = match self.cwa.fetch_stations().await {
            Ok(stations) => stations,
            Err(e) => {
                warn!("Station list unavailable: {}", e);
                return Err(WeatherWearError::not_found(city));
            }
        };

        let found =
            resolve_station(&query, &stations).ok_or_else(|| WeatherWearError::not_found(city))?;

        let rain_chance = self.cwa.rain_chance(&found.station.county).await.unwrap_or(0);

        derive_weather(&found, rain_chance).map_err(|e| {
            warn!("Cannot derive weather from station {}: {}", found.station.name, e);
            WeatherWearError::not_found(city)
        })
    }

    /// Weather and advice for a place name
    pub async fn recommend(&self, city: &str, model: Option<&str>) -> Result<Recommendation> {
        let weather = self.lookup_weather(city).await?;
        let advice = self.composer.compose(&weather, model).await;
        Ok(Recommendation { weather, advice })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CwaConfig;
    use wiremock::matchers::any;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> RecommendationService {
        let config = CwaConfig {
            api_key: Some("CWA-TEST-KEY".to_string()),
            base_url: server.uri(),
            ..CwaConfig::default()
        };
        RecommendationService::new(CwaClient::new(&config).unwrap(), AdviceComposer::new(None))
    }

    #[tokio::test]
    async fn test_empty_city_makes_no_requests() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let service = service_for(&server);
        for city in ["", "   "] {
            let err = service.lookup_weather(city).await.unwrap_err();
            assert_eq!(err.user_message(), MISSING_CITY_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_station_list_failure_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let service = service_for(&server);
        let err = service.lookup_weather("板橋").await.unwrap_err();
        assert!(matches!(err, WeatherWearError::NotFound { ref query } if query == "板橋"));
    }
}
