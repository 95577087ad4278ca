//! Configuration management for `WeatherWear`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherWearError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the CWA open-data key
pub const CWA_API_KEY_ENV: &str = "CWA_API_KEY";
/// Environment variable holding the Groq key
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
/// Environment variable overriding the listening port
pub const PORT_ENV: &str = "PORT";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherWearConfig {
    /// Central Weather Administration open-data settings
    #[serde(default)]
    pub cwa: CwaConfig,
    /// Chat completion (Groq) settings
    #[serde(default)]
    pub groq: GroqConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// CWA open-data API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CwaConfig {
    /// Authorization key for opendata.cwa.gov.tw
    pub api_key: Option<String>,
    /// Base URL of the datastore endpoints
    #[serde(default = "default_cwa_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Skip TLS certificate validation for both CWA endpoints
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Chat completion API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Bearer key; advice is disabled when absent
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_groq_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding `index.html`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_cwa_base_url() -> String {
    "https://opendata.cwa.gov.tw/api/v1/rest/datastore".to_string()
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for CwaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_cwa_base_url(),
            timeout_seconds: default_timeout(),
            accept_invalid_certs: false,
        }
    }
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_groq_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherWearConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHERWEAR__CWA__BASE_URL etc.
        builder = builder.add_source(
            Environment::with_prefix("WEATHERWEAR")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherWearConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherwear").join("config.toml"))
    }

    /// Apply the plain deployment variables (`CWA_API_KEY`, `GROQ_API_KEY`, `PORT`)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(CWA_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.cwa.api_key = Some(key.trim().to_string());
        }
        if let Some(key) = lookup(GROQ_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.groq.api_key = Some(key.trim().to_string());
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {PORT_ENV} value '{port}'"))?;
        }
        Ok(())
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.cwa.base_url.is_empty() {
            self.cwa.base_url = default_cwa_base_url();
        }
        if self.cwa.timeout_seconds == 0 {
            self.cwa.timeout_seconds = default_timeout();
        }
        if self.groq.base_url.is_empty() {
            self.groq.base_url = default_groq_base_url();
        }
        if self.groq.timeout_seconds == 0 {
            self.groq.timeout_seconds = default_timeout();
        }
        if self.groq.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.groq.api_key = None;
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        match self.cwa.api_key.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(WeatherWearError::config(format!(
                    "CWA API key is required. Set {CWA_API_KEY_ENV} or cwa.api_key in the config file."
                ))
                .into());
            }
            Some(key) if key.len() < 8 => {
                return Err(WeatherWearError::config(
                    "CWA API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
            Some(_) => {}
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.cwa.timeout_seconds > 300 {
            return Err(
                WeatherWearError::config("CWA API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.groq.timeout_seconds > 300 {
            return Err(
                WeatherWearError::config("Groq API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.server.port == 0 {
            return Err(WeatherWearError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherWearError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherWearError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [("CWA", &self.cwa.base_url), ("Groq", &self.groq.base_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherWearError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
