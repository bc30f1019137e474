//! Current conditions and the lookup result handed to clients

use serde::{Deserialize, Serialize};

use super::GeoLocation;

/// Current conditions reported by the forecast service.
///
/// The upstream contract allows any of these to be missing, so each one is
/// optional and a missing value never fails a lookup.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    /// Air temperature at 2 m in Celsius
    pub temperature_celsius: Option<f64>,
    /// Wind speed at 10 m in km/h
    pub wind_speed_kmh: Option<f64>,
    /// Observation time in the configured timezone, e.g. `2024-01-01T12:00`
    pub observed_at_local_time: Option<String>,
}

/// Where a result's weather data came from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    #[serde(rename = "open-meteo")]
    OpenMeteo,
}

/// Weather for a city, as stored in the cache and returned to the caller
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResult {
    pub city: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub conditions: CurrentConditions,
    pub source: DataSource,
    /// True only when this value was served from the cache
    pub from_cache: bool,
}

impl WeatherResult {
    /// Assemble a freshly fetched result
    #[must_use]
    pub fn fetched(location: GeoLocation, conditions: CurrentConditions) -> Self {
        Self {
            city: location.name,
            region: location.admin_region,
            country: location.country,
            conditions,
            source: DataSource::OpenMeteo,
            from_cache: false,
        }
    }

    /// Mark a value read back from the cache
    #[must_use]
    pub fn served_from_cache(mut self) -> Self {
        self.from_cache = true;
        self
    }
}
