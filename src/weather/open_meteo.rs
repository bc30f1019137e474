//! `OpenMeteo` request URLs and response structures
//!
//! Every field is optional and read leniently: a field of the wrong type
//! counts as absent. A geocoding hit without coordinates is unusable, while a
//! forecast without wind speed is merely partial.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::models::{CityQuery, CurrentConditions, GeoLocation};

const CURRENT_FIELDS: &str = "temperature_2m,wind_speed_10m";

/// Endpoints and locale settings for both `OpenMeteo` services
#[derive(Debug, Clone, PartialEq)]
pub struct OpenMeteoEndpoints {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub language: String,
    pub timezone: String,
}

impl OpenMeteoEndpoints {
    #[must_use]
    pub fn geocoding_request(&self, city: &CityQuery) -> String {
        format!(
            "{}?name={}&count=1&language={}&format=json",
            self.geocoding_url,
            urlencoding::encode(city.as_str()),
            urlencoding::encode(&self.language)
        )
    }

    #[must_use]
    pub fn forecast_request(&self, location: &GeoLocation) -> String {
        format!(
            "{}?latitude={}&longitude={}&current={}&timezone={}",
            self.forecast_url,
            location.latitude,
            location.longitude,
            CURRENT_FIELDS,
            urlencoding::encode(&self.timezone)
        )
    }
}

impl From<&UpstreamConfig> for OpenMeteoEndpoints {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
            language: config.language.clone(),
            timezone: config.timezone.clone(),
        }
    }
}

/// First record of a geocoding response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocodingMatch {
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub admin1: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
}

impl GeocodingMatch {
    /// Reads `results[0]`; `None` when the list is missing, empty, or its
    /// first element is not a record.
    #[must_use]
    pub fn first_from(body: &Value) -> Option<Self> {
        let record = body.get("results")?.get(0).filter(|r| r.is_object())?;
        Self::deserialize(record).ok()
    }

    /// Builds a location, falling back to the query for the display name.
    /// `None` when either coordinate is unusable.
    #[must_use]
    pub fn into_location(self, query: &CityQuery) -> Option<GeoLocation> {
        Some(GeoLocation {
            latitude: self.latitude?,
            longitude: self.longitude?,
            name: self.name.unwrap_or_else(|| query.as_str().to_string()),
            admin_region: self.admin1,
            country: self.country,
        })
    }
}

/// The `current` block of a forecast response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CurrentBlock {
    #[serde(deserialize_with = "lenient_number")]
    pub temperature_2m: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub wind_speed_10m: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    pub time: Option<String>,
}

impl CurrentBlock {
    /// Reads `current`; all fields are absent when it is missing or not a record.
    #[must_use]
    pub fn from_body(body: &Value) -> Self {
        body.get("current")
            .filter(|current| current.is_object())
            .and_then(|current| Self::deserialize(current).ok())
            .unwrap_or_default()
    }
}

impl From<CurrentBlock> for CurrentConditions {
    fn from(block: CurrentBlock) -> Self {
        Self {
            temperature_celsius: block.temperature_2m,
            wind_speed_kmh: block.wind_speed_10m,
            observed_at_local_time: block.time,
        }
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(number(&Value::deserialize(deserializer)?))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_str().map(str::to_string))
}

/// JSON numbers, or strings holding a finite decimal number. Geocoders have
/// been seen returning coordinates as strings (`"-5.79"`), and those are taken
/// as numbers; booleans, null and non-numeric strings are not.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn endpoints() -> OpenMeteoEndpoints {
        OpenMeteoEndpoints {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            language: "pt".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
        }
    }

    #[test]
    fn test_geocoding_request_encodes_name() {
        let query = CityQuery::parse("São Paulo").unwrap();
        assert_eq!(
            endpoints().geocoding_request(&query),
            "https://geocoding-api.open-meteo.com/v1/search?name=S%C3%A3o%20Paulo&count=1&language=pt&format=json"
        );
    }

    #[test]
    fn test_forecast_request() {
        let location = GeoLocation::new("São Paulo".to_string(), -23.55, -46.63);
        assert_eq!(
            endpoints().forecast_request(&location),
            "https://api.open-meteo.com/v1/forecast?latitude=-23.55&longitude=-46.63&current=temperature_2m,wind_speed_10m&timezone=America%2FSao_Paulo"
        );
    }

    #[test]
    fn test_first_match_reads_optional_fields() {
        let body = json!({"results": [{"name": "Manaus", "latitude": -3.1, "longitude": -60.02}]});
        let hit = GeocodingMatch::first_from(&body).unwrap();
        assert_eq!(hit.name.as_deref(), Some("Manaus"));
        assert_eq!(hit.admin1, None);
        assert_eq!(hit.latitude, Some(-3.1));
    }

    #[test]
    fn test_first_match_absent() {
        assert!(GeocodingMatch::first_from(&json!({})).is_none());
        assert!(GeocodingMatch::first_from(&json!({"results": []})).is_none());
        assert!(GeocodingMatch::first_from(&json!({"results": ["Manaus"]})).is_none());
        assert!(GeocodingMatch::first_from(&json!({"results": null})).is_none());
        assert!(GeocodingMatch::first_from(&json!([])).is_none());
    }

    #[test]
    fn test_numeric_strings_are_coordinates() {
        let body = json!({"results": [{"name": "Natal", "latitude": "-5.79", "longitude": " -35.2 "}]});
        let query = CityQuery::parse("natal").unwrap();
        let location = GeocodingMatch::first_from(&body)
            .unwrap()
            .into_location(&query)
            .unwrap();
        assert_eq!(location.latitude, -5.79);
        assert_eq!(location.longitude, -35.2);
    }

    #[test]
    fn test_unusable_coordinates() {
        let query = CityQuery::parse("natal").unwrap();
        for record in [
            json!({"name": "Natal", "longitude": -35.2}),
            json!({"name": "Natal", "latitude": "north", "longitude": -35.2}),
            json!({"name": "Natal", "latitude": -5.79, "longitude": null}),
            json!({"name": "Natal", "latitude": -5.79, "longitude": true}),
        ] {
            let hit = GeocodingMatch::first_from(&json!({ "results": [record] })).unwrap();
            assert!(hit.into_location(&query).is_none());
        }
    }

    #[test]
    fn test_name_falls_back_to_query() {
        let body = json!({"results": [{"latitude": -5.79, "longitude": -35.2}]});
        let query = CityQuery::parse("Natal").unwrap();
        let location = GeocodingMatch::first_from(&body)
            .unwrap()
            .into_location(&query)
            .unwrap();
        assert_eq!(location.name, "Natal");
    }

    #[test]
    fn test_wrong_typed_text_fields_are_absent() {
        let body = json!({"results": [{
            "name": 42,
            "admin1": ["RN"],
            "country": "Brasil",
            "latitude": -5.79,
            "longitude": -35.2
        }]});
        let query = CityQuery::parse("Natal").unwrap();
        let location = GeocodingMatch::first_from(&body)
            .unwrap()
            .into_location(&query)
            .unwrap();
        assert_eq!(location.name, "Natal");
        assert_eq!(location.admin_region, None);
        assert_eq!(location.country.as_deref(), Some("Brasil"));
    }

    #[test]
    fn test_non_finite_numeric_strings_are_rejected() {
        assert_eq!(number(&json!("NaN")), None);
        assert_eq!(number(&json!("inf")), None);
        assert_eq!(number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(number(&json!(false)), None);
    }

    #[test]
    fn test_current_block_degrades_per_field() {
        let body = json!({"current": {"temperature_2m": 30.5, "wind_speed_10m": "calm"}});
        let conditions = CurrentConditions::from(CurrentBlock::from_body(&body));
        assert_eq!(conditions.temperature_celsius, Some(30.5));
        assert_eq!(conditions.wind_speed_kmh, None);
        assert_eq!(conditions.observed_at_local_time, None);
    }

    #[test]
    fn test_missing_current_block() {
        assert_eq!(CurrentBlock::from_body(&json!({"hourly": {}})), CurrentBlock::default());
        assert_eq!(CurrentBlock::from_body(&json!({"current": [1, 2]})), CurrentBlock::default());
    }
}
