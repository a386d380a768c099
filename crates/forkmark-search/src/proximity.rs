use std::collections::HashMap;

use forkmark_core::{distance_km, walking_minutes, Coordinate, Location, Restaurant};
use uuid::Uuid;

use crate::result::SearchHit;

/// Restaurants with at least one location within `threshold_minutes` walk of
/// `origin`, nearest first.
///
/// Each restaurant appears once, ranked by its closest qualifying location.
/// Unresolved locations are skipped without excluding their restaurant.
/// Equal distances fall back to name, then id, so the order is stable.
#[must_use]
pub fn rank_by_proximity(
    origin: Coordinate,
    locations: &[(Restaurant, Location)],
    threshold_minutes: f64,
) -> Vec<SearchHit> {
    let mut closest: HashMap<Uuid, (f64, &Restaurant)> = HashMap::new();

    for (restaurant, location) in locations {
        let Some(coordinate) = location.coordinate() else {
            continue;
        };
        let km = distance_km(origin, coordinate);
        if walking_minutes(km) > threshold_minutes {
            continue;
        }
        closest
            .entry(restaurant.id)
            .and_modify(|(best, _)| *best = best.min(km))
            .or_insert((km, restaurant));
    }

    let mut hits: Vec<SearchHit> = closest
        .into_values()
        .map(|(km, restaurant)| SearchHit {
            restaurant: restaurant.clone(),
            distance_km: Some(km),
        })
        .collect();

    hits.sort_by(|a, b| {
        let da = a.distance_km.unwrap_or(f64::INFINITY);
        let db = b.distance_km.unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
            .then_with(|| a.restaurant.name.cmp(&b.restaurant.name))
            .then_with(|| a.restaurant.id.cmp(&b.restaurant.id))
    });
    hits
}
