use forkmark_core::{walking_minutes, Coordinate, Restaurant};
use serde::Serialize;

/// Which stage of the pipeline produced a [`SearchResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Local,
    Proximity,
    City,
}

/// Display-only explanation of where a result came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchContext {
    /// A resolved place. `name` is `None` for device coordinates.
    Place {
        name: Option<String>,
        coordinate: Coordinate,
    },
    City { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub restaurant: Restaurant,
    /// Distance to the closest qualifying location; proximity results only.
    pub distance_km: Option<f64>,
}

impl SearchHit {
    #[must_use]
    pub fn without_distance(restaurant: Restaurant) -> Self {
        Self {
            restaurant,
            distance_km: None,
        }
    }

    #[must_use]
    pub fn walking_minutes(&self) -> Option<f64> {
        self.distance_km.map(walking_minutes)
    }
}

/// Ordered, restaurant-deduplicated answer to one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub tier: Tier,
    pub hits: Vec<SearchHit>,
    pub context: Option<SearchContext>,
}

impl SearchResult {
    #[must_use]
    pub fn empty(tier: Tier) -> Self {
        Self {
            tier,
            hits: Vec::new(),
            context: None,
        }
    }

    pub fn restaurants(&self) -> impl Iterator<Item = &Restaurant> {
        self.hits.iter().map(|hit| &hit.restaurant)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
