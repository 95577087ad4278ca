//! `WeatherWear` - weather-aware outfit advice for Taiwanese towns
//!
//! This library resolves a free-text place name to a CWA observation station,
//! derives feels-like temperature and wind level, and asks a chat model for
//! clothing advice. The `weatherwear` binary serves it over HTTP.

pub mod advice;
pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod recommendation;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use advice::{AVAILABLE_MODELS, AdviceComposer, DEFAULT_MODEL};
pub use chat::ChatClient;
pub use config::WeatherWearConfig;
pub use error::WeatherWearError;
pub use location_resolver::{CountyHint, MatchKind, PlaceQuery, StationMatch};
pub use models::{ResolvedWeather, StationReadings, StationRecord};
pub use recommendation::{Recommendation, RecommendationService};
pub use weather::cwa::CwaClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherWearError>;
