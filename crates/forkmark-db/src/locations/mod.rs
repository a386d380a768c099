//! Database operations for the `locations` table.

mod read;
mod types;
mod write;

pub use read::{
    list_distinct_cities, list_locations_for_restaurants, list_resolved_restaurant_locations,
    list_restaurant_locations, list_unresolved_locations,
};
pub use types::{LocationRow, RestaurantLocationRow, UnresolvedLocationRow};
pub use write::{record_geocode_attempt, set_location_coordinates};
