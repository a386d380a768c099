//! Wire types for the Google Geocoding JSON response.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeItem>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeItem {
    pub formatted_address: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    /// `ROOFTOP`, `RANGE_INTERPOLATED`, `GEOMETRIC_CENTER` or `APPROXIMATE`.
    pub location_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl GeocodeItem {
    /// Best-effort city name. UK addresses often carry the city only as
    /// `postal_town`, so that is tried after `locality`.
    #[must_use]
    pub fn locality(&self) -> Option<&str> {
        const PREFERENCE: [&str; 3] = ["locality", "postal_town", "administrative_area_level_2"];
        PREFERENCE.iter().find_map(|wanted| {
            self.address_components
                .iter()
                .find(|c| c.types.iter().any(|t| t == wanted))
                .map(|c| c.long_name.trim())
                .filter(|name| !name.is_empty())
        })
    }
}
