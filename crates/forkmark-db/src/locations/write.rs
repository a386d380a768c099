//! Write operations for the `locations` table.

use forkmark_core::Coordinate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Store resolved coordinates for a location.
///
/// Both columns change in one statement, so readers never see a location with
/// only one of the pair. Values are rounded to the column's six decimal places
/// by the database.
///
/// # Errors
///
/// Returns [`DbError::InvalidCoordinate`] for out-of-range input,
/// [`DbError::NotFound`] if no location has `location_id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_location_coordinates(
    pool: &PgPool,
    location_id: Uuid,
    coordinate: Coordinate,
) -> Result<(), DbError> {
    if !coordinate.is_valid() {
        return Err(DbError::InvalidCoordinate {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        });
    }

    let result = sqlx::query(
        "UPDATE locations \
         SET latitude = $2::float8::numeric(9,6), \
             longitude = $3::float8::numeric(9,6), \
             geocode_attempted_at = NOW(), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(location_id)
    .bind(coordinate.latitude)
    .bind(coordinate.longitude)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Record that the geocoder was asked about this location and found nothing,
/// so the resolution job backs off before trying again.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the update fails.
pub async fn record_geocode_attempt(pool: &PgPool, location_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE locations SET geocode_attempted_at = NOW() WHERE id = $1")
        .bind(location_id)
        .execute(pool)
        .await?;
    Ok(())
}
