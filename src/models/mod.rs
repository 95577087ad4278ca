//! Data models for the WeatherWear service
//!
//! This module contains the core domain models organized by concern:
//! - Station: Observation stations and their raw readings
//! - Weather: The derived weather record returned to the page

pub mod station;
pub mod weather;

// Re-export all public types for convenient access
pub use station::{StationReadings, StationRecord};
pub use weather::ResolvedWeather;
