//! Read operations for the `locations` table.

use std::collections::BTreeSet;

use sqlx::PgPool;
use uuid::Uuid;

use super::types::{LocationRow, RestaurantLocationRow, UnresolvedLocationRow};

const JOINED_COLUMNS: &str = "r.id AS r_id, r.name AS r_name, r.cuisine AS r_cuisine, \
     r.status AS r_status, r.address_summary AS r_address_summary, \
     l.id, l.label, l.full_address, l.city, l.country, \
     l.latitude, l.longitude, l.phone";

/// Every location joined with its restaurant, resolved or not.
///
/// Ordered by restaurant name, then location id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_restaurant_locations(
    pool: &PgPool,
) -> Result<Vec<RestaurantLocationRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {JOINED_COLUMNS} \
         FROM locations l \
         JOIN restaurants r ON r.id = l.restaurant_id \
         ORDER BY r.name ASC, l.id ASC"
    );
    sqlx::query_as::<_, RestaurantLocationRow>(&sql)
        .fetch_all(pool)
        .await
}

/// Locations with both `latitude` and `longitude` set, joined with their
/// restaurant.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_resolved_restaurant_locations(
    pool: &PgPool,
) -> Result<Vec<RestaurantLocationRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {JOINED_COLUMNS} \
         FROM locations l \
         JOIN restaurants r ON r.id = l.restaurant_id \
         WHERE l.latitude IS NOT NULL \
           AND l.longitude IS NOT NULL \
         ORDER BY r.name ASC, l.id ASC"
    );
    sqlx::query_as::<_, RestaurantLocationRow>(&sql)
        .fetch_all(pool)
        .await
}

/// Distinct, trimmed, non-empty `city` values.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_distinct_cities(pool: &PgPool) -> Result<BTreeSet<String>, sqlx::Error> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT BTRIM(city) \
         FROM locations \
         WHERE city IS NOT NULL AND BTRIM(city) <> ''",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(city,)| city).collect())
}

/// All locations belonging to any of `restaurant_ids`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_locations_for_restaurants(
    pool: &PgPool,
    restaurant_ids: &[Uuid],
) -> Result<Vec<LocationRow>, sqlx::Error> {
    if restaurant_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, LocationRow>(
        "SELECT id, restaurant_id, label, full_address, city, country, \
                latitude, longitude, phone, geocode_attempted_at, \
                created_at, updated_at \
         FROM locations \
         WHERE restaurant_id = ANY($1) \
         ORDER BY created_at ASC, id ASC",
    )
    .bind(restaurant_ids)
    .fetch_all(pool)
    .await
}

/// Locations without coordinates that have never been sent to the geocoder,
/// or whose last attempt is older than `retry_after_hours`.
///
/// Never-attempted rows come first. At most `limit` rows.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_unresolved_locations(
    pool: &PgPool,
    limit: i64,
    retry_after_hours: i32,
) -> Result<Vec<UnresolvedLocationRow>, sqlx::Error> {
    sqlx::query_as::<_, UnresolvedLocationRow>(
        "SELECT id, full_address, city, country \
         FROM locations \
         WHERE latitude IS NULL \
           AND BTRIM(full_address) <> '' \
           AND (geocode_attempted_at IS NULL \
                OR geocode_attempted_at < NOW() - make_interval(hours => $2)) \
         ORDER BY geocode_attempted_at ASC NULLS FIRST, created_at ASC \
         LIMIT $1",
    )
    .bind(limit)
    .bind(retry_after_hours)
    .fetch_all(pool)
    .await
}
