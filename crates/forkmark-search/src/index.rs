//! Read model over restaurant locations.
//!
//! A refresh builds a complete [`IndexSnapshot`] off to the side and then
//! swaps it in under a short write lock. Searches clone the `Arc` once and work
//! against that snapshot for their whole run, so they see either the old or
//! the new data, never a mix.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use forkmark_core::{Location, Restaurant, RestaurantStore, StoreError};
use uuid::Uuid;

#[derive(Debug)]
pub struct IndexSnapshot {
    generation: u64,
    built_at: DateTime<Utc>,
    resolved: Vec<(Restaurant, Location)>,
    cities: BTreeSet<String>,
    by_city: HashMap<String, Vec<Restaurant>>,
}

impl IndexSnapshot {
    /// `all_locations` feeds city membership, so restaurants whose locations
    /// lack coordinates still belong to their city.
    #[must_use]
    pub fn build(
        generation: u64,
        resolved: Vec<(Restaurant, Location)>,
        cities: BTreeSet<String>,
        all_locations: &[(Restaurant, Location)],
    ) -> Self {
        let resolved: Vec<_> = resolved
            .into_iter()
            .filter(|(_, location)| location.is_resolved())
            .collect();

        let mut cities: BTreeSet<String> = cities
            .into_iter()
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .collect();

        let mut by_city: HashMap<String, Vec<Restaurant>> = HashMap::new();
        let mut seen: HashSet<(String, Uuid)> = HashSet::new();
        for (restaurant, location) in all_locations {
            let Some(city) = location.city.as_deref().map(str::trim) else {
                continue;
            };
            if city.is_empty() {
                continue;
            }
            let key = city_key(city);
            if !cities.iter().any(|c| city_key(c) == key) {
                cities.insert(city.to_owned());
            }
            if seen.insert((key.clone(), restaurant.id)) {
                by_city.entry(key).or_default().push(restaurant.clone());
            }
        }
        for restaurants in by_city.values_mut() {
            restaurants.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        Self {
            generation,
            built_at: Utc::now(),
            resolved,
            cities,
            by_city,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Every `(restaurant, location)` pair with both coordinates present.
    #[must_use]
    pub fn all_resolved_locations(&self) -> &[(Restaurant, Location)] {
        &self.resolved
    }

    #[must_use]
    pub fn distinct_cities(&self) -> &BTreeSet<String> {
        &self.cities
    }

    /// Restaurants with at least one location whose city equals `city`,
    /// ignoring case. Ordered by name.
    #[must_use]
    pub fn restaurants_in_city(&self, city: &str) -> &[Restaurant] {
        self.by_city
            .get(&city_key(city))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn city_key(city: &str) -> String {
    city.trim().to_lowercase()
}

#[derive(Debug, Default)]
pub struct LocationIndex {
    current: RwLock<Option<Arc<IndexSnapshot>>>,
    next_generation: AtomicU64,
}

impl LocationIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot, or `None` before the first successful refresh.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<IndexSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebuilds the snapshot from `store` and swaps it in.
    ///
    /// On error the previous snapshot stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any of the store reads fail.
    pub async fn refresh<S: RestaurantStore>(
        &self,
        store: &S,
    ) -> Result<Arc<IndexSnapshot>, StoreError> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let resolved = store.all_with_resolved_coordinates().await?;
        let cities = store.distinct_cities().await?;
        let all_locations = store.all_locations().await?;

        let snapshot = Arc::new(IndexSnapshot::build(
            generation,
            resolved,
            cities,
            &all_locations,
        ));
        let installed = self.install(Arc::clone(&snapshot));

        tracing::info!(
            generation,
            installed,
            resolved = snapshot.all_resolved_locations().len(),
            cities = snapshot.distinct_cities().len(),
            "location index refreshed"
        );
        Ok(snapshot)
    }

    /// Installs `snapshot` unless a newer generation is already in place.
    /// Returns whether it was installed.
    pub fn install(&self, snapshot: Arc<IndexSnapshot>) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current
            .as_ref()
            .is_some_and(|existing| existing.generation > snapshot.generation)
        {
            return false;
        }
        self.next_generation
            .fetch_max(snapshot.generation, Ordering::SeqCst);
        *current = Some(snapshot);
        true
    }
}

#[cfg(test)]
mod tests {
    use forkmark_core::RestaurantStatus;

    use super::*;

    fn restaurant(name: &str) -> Restaurant {
        Restaurant {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            cuisine: None,
            status: RestaurantStatus::Visited,
            address_summary: None,
        }
    }

    fn location(r: &Restaurant, city: Option<&str>, coordinate: Option<(f64, f64)>) -> Location {
        Location {
            id: Uuid::new_v4(),
            restaurant_id: r.id,
            label: None,
            full_address: String::new(),
            city: city.map(ToOwned::to_owned),
            country: None,
            latitude: coordinate.map(|c| c.0),
            longitude: coordinate.map(|c| c.1),
            phone: None,
        }
    }

    fn sample() -> (Vec<(Restaurant, Location)>, Vec<(Restaurant, Location)>) {
        let padella = restaurant("Padella");
        let dishoom = restaurant("Dishoom");
        let cal_pep = restaurant("Cal Pep");

        let all = vec![
            (padella.clone(), location(&padella, Some("London"), Some((51.5051, -0.0906)))),
            (padella.clone(), location(&padella, Some("london"), Some((51.5245, -0.0812)))),
            (dishoom.clone(), location(&dishoom, Some("London"), None)),
            (cal_pep.clone(), location(&cal_pep, Some("Barcelona"), Some((41.3839, 2.1833)))),
        ];
        let resolved = all
            .iter()
            .filter(|(_, l)| l.is_resolved())
            .cloned()
            .collect();
        (resolved, all)
    }

    #[test]
    fn snapshot_exposes_resolved_pairs_only() {
        let (resolved, all) = sample();
        let mut with_partial = resolved.clone();
        let stray = restaurant("Half Resolved");
        with_partial.push((stray.clone(), location(&stray, None, None)));

        let snapshot = IndexSnapshot::build(1, with_partial, BTreeSet::new(), &all);
        assert_eq!(snapshot.all_resolved_locations().len(), 3);
    }

    #[test]
    fn city_lookup_is_case_insensitive_and_deduplicated() {
        let (resolved, all) = sample();
        let cities = ["London".to_owned(), "Barcelona".to_owned()].into();
        let snapshot = IndexSnapshot::build(1, resolved, cities, &all);

        let london: Vec<_> = snapshot
            .restaurants_in_city("LONDON")
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(london, ["Dishoom", "Padella"]);
        assert!(snapshot.restaurants_in_city("Paris").is_empty());
    }

    #[test]
    fn distinct_cities_are_trimmed_and_merged() {
        let (resolved, all) = sample();
        let cities = [" London ".to_owned(), String::new()].into();
        let snapshot = IndexSnapshot::build(1, resolved, cities, &all);

        let names: Vec<_> = snapshot.distinct_cities().iter().cloned().collect();
        assert_eq!(names, ["Barcelona", "London"]);
    }

    #[test]
    fn older_generation_does_not_replace_newer() {
        let index = LocationIndex::new();
        assert!(index.snapshot().is_none());

        let (resolved, all) = sample();
        assert!(index.install(Arc::new(IndexSnapshot::build(
            5,
            resolved.clone(),
            BTreeSet::new(),
            &all
        ))));
        assert!(!index.install(Arc::new(IndexSnapshot::build(
            3,
            resolved,
            BTreeSet::new(),
            &all
        ))));
        assert_eq!(index.snapshot().map(|s| s.generation()), Some(5));
    }
}
