//! Storage collaborator consumed by the search subsystem.
//!
//! The search side only ever reads; writes belong to the CRUD layer and the
//! coordinate resolution job.

use std::collections::BTreeSet;
use std::future::Future;

use thiserror::Error;

use crate::restaurants::{Location, Restaurant, RestaurantWithLocations};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

pub trait RestaurantStore: Send + Sync {
    /// Restaurants whose name, address summary or cuisine, or any of whose
    /// locations' label or full address, contains `query` (case-insensitive).
    fn find_by_text(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<RestaurantWithLocations>, StoreError>> + Send;

    /// Every `(restaurant, location)` pair where the location has both coordinates.
    fn all_with_resolved_coordinates(
        &self,
    ) -> impl Future<Output = Result<Vec<(Restaurant, Location)>, StoreError>> + Send;

    /// Distinct non-empty city names across all locations.
    fn distinct_cities(&self) -> impl Future<Output = Result<BTreeSet<String>, StoreError>> + Send;

    /// Every `(restaurant, location)` pair, resolved or not.
    fn all_locations(
        &self,
    ) -> impl Future<Output = Result<Vec<(Restaurant, Location)>, StoreError>> + Send;
}
