//! `clima` - current weather for a city name
//!
//! Resolves a free-text city through the `OpenMeteo` geocoder, fetches the
//! current conditions for its coordinates and caches the shaped result.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use cache::{CacheStore, MemoryCache, PersistentCache};
pub use config::AppConfig;
pub use error::LookupError;
pub use http::{HttpClient, HttpResponse, ReqwestClient, TransportError};
pub use models::{CityQuery, CurrentConditions, DataSource, GeoLocation, WeatherResult};
pub use weather::{OpenMeteoEndpoints, WeatherLookup};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
