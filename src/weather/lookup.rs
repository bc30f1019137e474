//! Weather lookup orchestration
//!
//! Resolves a city name into current conditions: cache first, then the
//! geocoder, then the forecast for the resolved coordinates. Every failure is
//! classified here, close to where it happens.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::open_meteo::{CurrentBlock, GeocodingMatch, OpenMeteoEndpoints};
use crate::cache::CacheStore;
use crate::error::LookupError;
use crate::http::HttpClient;
use crate::models::{CityQuery, CurrentConditions, GeoLocation, WeatherResult};

/// Default lifetime of a cached result
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

const CITY_NOT_FOUND: &str = "Cidade não encontrada.";
const INVALID_COORDINATES: &str = "Latitude/longitude inválidas retornadas.";

/// The two services a lookup talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upstream {
    Geocoding,
    Forecast,
}

impl Upstream {
    fn name(self) -> &'static str {
        match self {
            Upstream::Geocoding => "geocoding",
            Upstream::Forecast => "forecast",
        }
    }

    fn unavailable(self) -> LookupError {
        LookupError::unavailable(match self {
            Upstream::Geocoding => "Serviço de geolocalização indisponível.",
            Upstream::Forecast => "Serviço de clima indisponível.",
        })
    }

    fn invalid_response(self) -> LookupError {
        LookupError::invalid_response(match self {
            Upstream::Geocoding => "Resposta inválida do serviço de geolocalização.",
            Upstream::Forecast => "Resposta inválida do serviço de clima.",
        })
    }
}

/// Cache-aside weather lookup over the geocoding and forecast services
pub struct WeatherLookup {
    cache: Arc<dyn CacheStore>,
    http: Arc<dyn HttpClient>,
    endpoints: OpenMeteoEndpoints,
    cache_ttl: Duration,
}

impl WeatherLookup {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        http: Arc<dyn HttpClient>,
        endpoints: OpenMeteoEndpoints,
    ) -> Self {
        Self {
            cache,
            http,
            endpoints,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Current weather for `city`, from the cache when a fresh entry exists.
    #[instrument(skip(self))]
    pub async fn lookup(&self, city: &str) -> Result<WeatherResult, LookupError> {
        let query = CityQuery::parse(city)?;
        let key = query.cache_key();

        if let Some(cached) = self.read_cache(&key).await {
            debug!(key, "Serving weather from cache");
            return Ok(cached.served_from_cache());
        }

        let location = self.geocode(&query).await?;
        let conditions = self.current_conditions(&location).await?;
        let result = WeatherResult::fetched(location, conditions);

        self.write_cache(&key, &result).await;
        Ok(result)
    }

    async fn geocode(&self, query: &CityQuery) -> Result<GeoLocation, LookupError> {
        let url = self.endpoints.geocoding_request(query);
        let body = self.fetch(Upstream::Geocoding, &url).await?;

        let hit = GeocodingMatch::first_from(&body)
            .ok_or_else(|| LookupError::city_not_found(CITY_NOT_FOUND))?;

        let location = hit
            .into_location(query)
            .ok_or_else(|| LookupError::invalid_response(INVALID_COORDINATES))?;

        debug!(
            "Resolved {} to {} at ({})",
            query,
            location.name,
            location.format_coordinates()
        );
        Ok(location)
    }

    async fn current_conditions(
        &self,
        location: &GeoLocation,
    ) -> Result<CurrentConditions, LookupError> {
        let url = self.endpoints.forecast_request(location);
        let body = self.fetch(Upstream::Forecast, &url).await?;
        Ok(CurrentBlock::from_body(&body).into())
    }

    /// GET `url` and return its body if it is structured JSON.
    #[instrument(name = "upstream", skip(self, url), fields(service = upstream.name()))]
    async fn fetch(&self, upstream: Upstream, url: &str) -> Result<Value, LookupError> {
        let response = match self.http.get(url).await {
            Ok(response) => response,
            Err(err) => {
                error!(
                    service = upstream.name(),
                    timed_out = err.is_timeout(),
                    "Upstream request failed: {}",
                    err
                );
                return Err(upstream.unavailable());
            }
        };

        if response.status != 200 {
            warn!(
                service = upstream.name(),
                status = response.status,
                "Upstream returned non-200 status"
            );
            return Err(upstream.unavailable());
        }

        match response.json {
            Some(body @ (Value::Object(_) | Value::Array(_))) => Ok(body),
            _ => Err(upstream.invalid_response()),
        }
    }

    async fn read_cache(&self, key: &str) -> Option<WeatherResult> {
        match self.cache.get(key).await {
            Ok(cached) => cached,
            Err(err) => {
                warn!(key, "Cache read failed, treating as miss: {:#}", err);
                None
            }
        }
    }

    async fn write_cache(&self, key: &str, result: &WeatherResult) {
        if let Err(err) = self.cache.put(key, result, self.cache_ttl).await {
            warn!(key, "Cache write failed: {:#}", err);
        }
    }
}
