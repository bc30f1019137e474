//! Data models for the weather lookup
//!
//! - City: validated queries and cache keys
//! - Location: geocoded city with coordinates
//! - Weather: current conditions and the result returned to clients

pub mod city;
pub mod location;
pub mod weather;

pub use city::CityQuery;
pub use location::GeoLocation;
pub use weather::{CurrentConditions, DataSource, WeatherResult};
