//! Database operations for the `restaurants` table.

use chrono::{DateTime, Utc};
use forkmark_core::{Restaurant, RestaurantStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// A row from the `restaurants` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RestaurantRow {
    pub id: Uuid,
    pub name: String,
    pub cuisine: Option<String>,
    pub status: String,
    pub address_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RestaurantRow {
    #[must_use]
    pub fn into_restaurant(self) -> Restaurant {
        Restaurant {
            id: self.id,
            status: RestaurantStatus::from_db(&self.status),
            name: self.name,
            cuisine: self.cuisine,
            address_summary: self.address_summary,
        }
    }
}

/// Escape `%`, `_` and `\` so user text matches literally inside a `LIKE`
/// pattern (Postgres' default escape character is `\`).
#[must_use]
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Restaurants whose name, cuisine or address summary, or any of whose
/// locations' label or full address, contains `query` (case-insensitive).
///
/// Each restaurant appears once. Ordered by `name ASC`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn find_restaurants_by_text(
    pool: &PgPool,
    query: &str,
) -> Result<Vec<RestaurantRow>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(query));
    sqlx::query_as::<_, RestaurantRow>(
        "SELECT r.id, r.name, r.cuisine, r.status, r.address_summary, \
                r.created_at, r.updated_at \
         FROM restaurants r \
         WHERE r.name ILIKE $1 \
            OR r.cuisine ILIKE $1 \
            OR r.address_summary ILIKE $1 \
            OR EXISTS ( \
                SELECT 1 FROM locations l \
                WHERE l.restaurant_id = r.id \
                  AND (l.label ILIKE $1 OR l.full_address ILIKE $1) \
            ) \
         ORDER BY r.name ASC, r.id ASC",
    )
    .bind(pattern)
    .fetch_all(pool)
    .await
}
