//! Restaurant and location records as seen by the search subsystem.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestaurantStatus {
    ToVisit,
    Visited,
}

impl RestaurantStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToVisit => "to_visit",
            Self::Visited => "visited",
        }
    }

    /// Parses the stored column value. Unknown values fall back to `ToVisit`.
    #[must_use]
    pub fn from_db(value: &str) -> Self {
        match value {
            "visited" => Self::Visited,
            _ => Self::ToVisit,
        }
    }
}

impl std::fmt::Display for RestaurantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A curated brand or venue. A chain is one `Restaurant` with many [`Location`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub cuisine: Option<String>,
    pub status: RestaurantStatus,
    pub address_summary: Option<String>,
}

/// One physical address of a [`Restaurant`].
///
/// Coordinates are only meaningful as a pair: a location with one of the two
/// missing is treated as unresolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub label: Option<String>,
    pub full_address: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
}

impl Location {
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.coordinate().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantWithLocations {
    pub restaurant: Restaurant,
    pub locations: Vec<Location>,
}
