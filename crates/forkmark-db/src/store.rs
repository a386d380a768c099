//! Postgres-backed [`RestaurantStore`].

use std::collections::{BTreeSet, HashMap};

use forkmark_core::{Location, Restaurant, RestaurantStore, RestaurantWithLocations, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::locations::{
    list_distinct_cities, list_locations_for_restaurants, list_resolved_restaurant_locations,
    list_restaurant_locations, RestaurantLocationRow,
};
use crate::restaurants::find_restaurants_by_text;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl RestaurantStore for PgStore {
    async fn find_by_text(&self, query: &str) -> Result<Vec<RestaurantWithLocations>, StoreError> {
        let restaurants = find_restaurants_by_text(&self.pool, query)
            .await
            .map_err(StoreError::backend)?;
        let ids: Vec<Uuid> = restaurants.iter().map(|r| r.id).collect();
        let locations = list_locations_for_restaurants(&self.pool, &ids)
            .await
            .map_err(StoreError::backend)?;

        let mut by_restaurant: HashMap<Uuid, Vec<Location>> = HashMap::new();
        for row in locations {
            let location = row.into_location();
            by_restaurant
                .entry(location.restaurant_id)
                .or_default()
                .push(location);
        }

        Ok(restaurants
            .into_iter()
            .map(|row| {
                let locations = by_restaurant.remove(&row.id).unwrap_or_default();
                RestaurantWithLocations {
                    restaurant: row.into_restaurant(),
                    locations,
                }
            })
            .collect())
    }

    async fn all_with_resolved_coordinates(&self) -> Result<Vec<(Restaurant, Location)>, StoreError> {
        let rows = list_resolved_restaurant_locations(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(RestaurantLocationRow::into_pair).collect())
    }

    async fn distinct_cities(&self) -> Result<BTreeSet<String>, StoreError> {
        list_distinct_cities(&self.pool)
            .await
            .map_err(StoreError::backend)
    }

    async fn all_locations(&self) -> Result<Vec<(Restaurant, Location)>, StoreError> {
        let rows = list_restaurant_locations(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(RestaurantLocationRow::into_pair).collect())
    }
}
