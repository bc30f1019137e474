//! Location model for geocoded cities

use serde::{Deserialize, Serialize};

/// A city resolved by the geocoder
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeoLocation {
    /// Display name as returned by the geocoder
    pub name: String,
    /// First-level administrative region (state, province)
    pub admin_region: Option<String>,
    /// Country name in the configured language
    pub country: Option<String>,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl GeoLocation {
    /// Create a new location without region or country
    #[must_use]
    pub fn new(name: String, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            admin_region: None,
            country: None,
            latitude,
            longitude,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
