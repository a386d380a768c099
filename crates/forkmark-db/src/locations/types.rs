//! Row types for the `locations` table.

use chrono::{DateTime, Utc};
use forkmark_core::{Location, Restaurant, RestaurantStatus};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A row from the `locations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub label: Option<String>,
    pub full_address: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub phone: Option<String>,
    pub geocode_attempted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocationRow {
    #[must_use]
    pub fn into_location(self) -> Location {
        Location {
            id: self.id,
            restaurant_id: self.restaurant_id,
            label: self.label,
            full_address: self.full_address,
            city: self.city,
            country: self.country,
            latitude: decimal_to_f64(self.latitude),
            longitude: decimal_to_f64(self.longitude),
            phone: self.phone,
        }
    }
}

/// A location joined with its restaurant. Restaurant columns carry an `r_`
/// prefix so the two `id` columns stay apart.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RestaurantLocationRow {
    pub r_id: Uuid,
    pub r_name: String,
    pub r_cuisine: Option<String>,
    pub r_status: String,
    pub r_address_summary: Option<String>,
    pub id: Uuid,
    pub label: Option<String>,
    pub full_address: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub phone: Option<String>,
}

impl RestaurantLocationRow {
    #[must_use]
    pub fn into_pair(self) -> (Restaurant, Location) {
        let restaurant = Restaurant {
            id: self.r_id,
            name: self.r_name,
            cuisine: self.r_cuisine,
            status: RestaurantStatus::from_db(&self.r_status),
            address_summary: self.r_address_summary,
        };
        let location = Location {
            id: self.id,
            restaurant_id: self.r_id,
            label: self.label,
            full_address: self.full_address,
            city: self.city,
            country: self.country,
            latitude: decimal_to_f64(self.latitude),
            longitude: decimal_to_f64(self.longitude),
            phone: self.phone,
        };
        (restaurant, location)
    }
}

/// A location still waiting for coordinates.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnresolvedLocationRow {
    pub id: Uuid,
    pub full_address: String,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl UnresolvedLocationRow {
    /// Free text to send to the geocoder: the full address, with city and
    /// country appended when the address does not already mention them.
    #[must_use]
    pub fn geocode_query(&self) -> String {
        let mut query = self.full_address.trim().to_string();
        let lowered = query.to_lowercase();
        for part in [self.city.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            if !lowered.contains(&part.to_lowercase()) {
                if !query.is_empty() {
                    query.push_str(", ");
                }
                query.push_str(part);
            }
        }
        query
    }
}

fn decimal_to_f64(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}
