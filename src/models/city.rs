//! Validated city queries and the cache keys derived from them

use std::fmt;

use crate::error::LookupError;

const CACHE_KEY_PREFIX: &str = "weather_";
pub(crate) const EMPTY_QUERY_MESSAGE: &str = "Informe uma cidade válida.";

/// A trimmed, non-empty city name supplied by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery(String);

impl CityQuery {
    /// Trim the raw input and reject it when nothing is left
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LookupError::city_not_found(EMPTY_QUERY_MESSAGE));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cache key shared by every casing of the same name
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{CACHE_KEY_PREFIX}{}", self.0.to_lowercase())
    }
}

impl fmt::Display for CityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
