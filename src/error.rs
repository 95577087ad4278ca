//! Error types and handling for `WeatherWear`

use thiserror::Error;

/// Main error type for the `WeatherWear` service
#[derive(Error, Debug)]
pub enum WeatherWearError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API communication errors (CWA, chat completion)
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// No station could be resolved for the user's place name
    #[error("No station found for '{query}'")]
    NotFound { query: String },

}

impl WeatherWearError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error for the raw user query
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Get the message shown to the person using the web page
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherWearError::Validation { message } => message.clone(),
            WeatherWearError::NotFound { query } => {
                format!("找不到 '{query}'，請確認輸入正確的縣市名稱。")
            }
            WeatherWearError::Config { .. } => "服務設定錯誤，請聯絡管理員。".to_string(),
            WeatherWearError::Api { .. } => "無法連線到氣象服務，請稍後再試。".to_string(),
        }
    }
}

// The request URL carries the CWA key as a query parameter
impl From<reqwest::Error> for WeatherWearError {
    fn from(err: reqwest::Error) -> Self {
        Self::api(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for WeatherWearError {
    fn from(err: serde_json::Error) -> Self {
        Self::api(format!("Malformed response body: {err}"))
    }
}
