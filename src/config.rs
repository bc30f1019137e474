//! Configuration management for the weather service
//!
//! Handles loading configuration from a TOML file and environment variables,
//! and validates every setting before the service starts.

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_VAR: &str = "CLIMA_CONFIG";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,
    /// `OpenMeteo` endpoints and request settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Result cache
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging output
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Geocoding search endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    /// Request timeout in seconds, applied to each upstream call
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Language of the place names returned by the geocoder
    #[serde(default = "default_language")]
    pub language: String,
    /// Timezone the forecast reports local times in
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// fjall database on disk
    Persistent,
    /// In-process map
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_backend")]
    pub backend: CacheBackend,
    /// Database directory for the persistent backend
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// Lifetime of a cached result in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// Upper bound on results held by the memory backend
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_timeout() -> u32 {
    5
}

fn default_language() -> String {
    "pt".to_string()
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::Persistent
}

fn default_cache_location() -> String {
    "weather_cache".to_string()
}

fn default_cache_ttl() -> u64 {
    600
}

fn default_cache_max_entries() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            timeout_seconds: default_timeout(),
            language: default_language(),
            timezone: default_timezone(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            location: default_cache_location(),
            ttl_seconds: default_cache_ttl(),
            max_entries: default_cache_max_entries(),
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

impl UpstreamConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl AppConfig {
    /// Load configuration from `$CLIMA_CONFIG` (or `config.toml`) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from))
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. CLIMA_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("CLIMA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.upstream.timeout_seconds == 0 || self.upstream.timeout_seconds > 300 {
            return Err(anyhow!(
                "Upstream timeout must be between 1 and 300 seconds, got {}",
                self.upstream.timeout_seconds
            ));
        }

        if self.cache.ttl_seconds == 0 || self.cache.ttl_seconds > 86_400 {
            return Err(anyhow!(
                "Cache TTL must be between 1 and 86400 seconds, got {}",
                self.cache.ttl_seconds
            ));
        }

        if self.cache.max_entries == 0 {
            return Err(anyhow!("Cache max_entries must be at least 1"));
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ));
        }

        let valid_log_formats = ["pretty", "compact"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ));
        }

        for (name, url) in [
            ("geocoding", &self.upstream.geocoding_url),
            ("forecast", &self.upstream.forecast_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow!("The {name} URL must be a valid HTTP or HTTPS URL"));
            }
        }

        if self.upstream.language.trim().is_empty() || self.upstream.timezone.trim().is_empty() {
            return Err(anyhow!("Upstream language and timezone cannot be empty"));
        }

        if self.cache.backend == CacheBackend::Persistent && self.cache.location.trim().is_empty() {
            return Err(anyhow!("A persistent cache needs a location"));
        }

        Ok(())
    }
}
