//! Current-weather lookup against the `OpenMeteo` services

pub mod lookup;
pub mod open_meteo;

pub use lookup::{DEFAULT_CACHE_TTL, WeatherLookup};
pub use open_meteo::{CurrentBlock, GeocodingMatch, OpenMeteoEndpoints};
