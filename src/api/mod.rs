use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    advice::AVAILABLE_MODELS,
    recommendation::{Recommendation, RecommendationService},
};

/// Form fields posted by the page
#[derive(Debug, Default, Deserialize)]
pub struct RecommendForm {
    pub city: Option<String>,
    pub model: Option<String>,
}

/// Body of `POST /recommend`; both shapes are sent with status 200
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecommendResponse {
    Success(Recommendation),
    Failure { error: String },
}

pub fn router(service: Arc<RecommendationService>) -> Router {
    Router::new()
        .route("/models", get(get_models))
        .route("/recommend", post(recommend))
        .with_state(service)
}

async fn get_models() -> Json<Vec<&'static str>> {
    Json(AVAILABLE_MODELS.to_vec())
}

async fn recommend(
    State(service): State<Arc<RecommendationService>>,
    form: Result<Form<RecommendForm>, FormRejection>,
) -> Json<RecommendResponse> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!("Unreadable recommend form: {}", rejection);
            RecommendForm::default()
        }
    };

    let city = form.city.unwrap_or_default();
    info!("Recommendation requested for '{}'", city);

    match service.recommend(&city, form.model.as_deref()).await {
        Ok(recommendation) => Json(RecommendResponse::Success(recommendation)),
        Err(e) => {
            info!("Recommendation for '{}' failed: {}", city, e);
            Json(RecommendResponse::Failure {
                error: e.user_message(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResolvedWeather;

    #[test]
    fn test_success_body_shape() {
        let body = RecommendResponse::Success(Recommendation {
            weather: ResolvedWeather {
                city: "臺北市 中正區".to_string(),
                station: "臺北".to_string(),
                temperature: 20.0,
                feels_like: 19.5,
                humidity: 70,
                wind_level: 1,
                description: "晴".to_string(),
                rain_chance: 0,
                observed_at: None,
            },
            advice: "穿薄外套".to_string(),
        });

        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["advice"], "穿薄外套");
        assert_eq!(json["weather"]["city"], "臺北市 中正區");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_body_shape() {
        let body = RecommendResponse::Failure {
            error: "請輸入城市名稱".to_string(),
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "請輸入城市名稱"}));
    }
}
