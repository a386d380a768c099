//! Tiered search: local text, then geocode + proximity, then city fallback.
//!
//! The pipeline is a small state machine. Each stage either breaks with a
//! result or continues into the next stage. Tier 3 reuses the place Tier 2 resolved, so a search
//! makes at most one geocode call.

use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::Arc;

use forkmark_core::{Coordinate, GeocodeResult, RestaurantStore, SearchOptions, StoreError};
use forkmark_geocode::Geocode;

use crate::city_cache::CachedCityMatcher;
use crate::city_matcher::CityMatcher;
use crate::index::{IndexSnapshot, LocationIndex};
use crate::proximity::rank_by_proximity;
use crate::result::{SearchContext, SearchHit, SearchResult, Tier};

enum Stage {
    Local,
    Geocode(Arc<IndexSnapshot>),
    Proximity(Arc<IndexSnapshot>, GeocodeResult),
    City(Arc<IndexSnapshot>, Option<GeocodeResult>),
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Geocode(_) => "geocode",
            Self::Proximity(..) => "proximity",
            Self::City(..) => "city",
        }
    }
}

pub struct SearchOrchestrator<S, G> {
    store: S,
    geocoder: G,
    index: Arc<LocationIndex>,
    cities: CachedCityMatcher,
    options: SearchOptions,
}

impl<S: RestaurantStore, G: Geocode> SearchOrchestrator<S, G> {
    #[must_use]
    pub fn new(store: S, geocoder: G, index: Arc<LocationIndex>, options: SearchOptions) -> Self {
        let cities = CachedCityMatcher::new(CityMatcher::default(), options.city_cache_ttl);
        Self {
            store,
            geocoder,
            index,
            cities,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    #[must_use]
    pub fn index(&self) -> &Arc<LocationIndex> {
        &self.index
    }

    #[must_use]
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Rebuilds the location index from this orchestrator's store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read. The previous
    /// snapshot stays in place.
    pub async fn refresh_index(&self) -> Result<Arc<IndexSnapshot>, StoreError> {
        self.index.refresh(&self.store).await
    }

    /// Runs the full pipeline for a free-text query. Never fails: provider
    /// and store trouble degrade to an emptier result.
    pub async fn search(&self, query: &str) -> SearchResult {
        let query = query.trim();
        if query.chars().count() < self.options.min_query_chars.max(1) {
            return SearchResult::empty(Tier::Local);
        }

        let snapshot = self.index.snapshot();
        let mut stage = Stage::Local;
        let result = loop {
            match self.advance(stage, query, snapshot.as_ref()).await {
                ControlFlow::Break(result) => break result,
                ControlFlow::Continue(next) => {
                    tracing::debug!(query, stage = next.name(), "search: advancing");
                    stage = next;
                }
            }
        };

        tracing::info!(
            query,
            tier = ?result.tier,
            hits = result.len(),
            "search complete"
        );
        result
    }

    /// Proximity ranking around a device coordinate, without geocoding.
    #[must_use]
    pub fn search_near(&self, origin: Coordinate) -> SearchResult {
        if !origin.is_valid() {
            tracing::debug!(?origin, "near search: invalid coordinate");
            return SearchResult::empty(Tier::Proximity);
        }
        let Some(snapshot) = self.index.snapshot() else {
            tracing::warn!("near search: location index not built yet");
            return SearchResult::empty(Tier::Proximity);
        };

        let hits = rank_by_proximity(
            origin,
            snapshot.all_resolved_locations(),
            self.options.proximity_threshold_minutes,
        );
        tracing::info!(hits = hits.len(), "near search complete");
        SearchResult {
            tier: Tier::Proximity,
            hits,
            context: Some(SearchContext::Place {
                name: None,
                coordinate: origin,
            }),
        }
    }

    async fn advance(
        &self,
        stage: Stage,
        query: &str,
        snapshot: Option<&Arc<IndexSnapshot>>,
    ) -> ControlFlow<SearchResult, Stage> {
        match stage {
            Stage::Local => {
                let hits = self.local_hits(query).await;
                if !hits.is_empty() {
                    return ControlFlow::Break(SearchResult {
                        tier: Tier::Local,
                        hits,
                        context: None,
                    });
                }
                match snapshot {
                    Some(snapshot) => ControlFlow::Continue(Stage::Geocode(Arc::clone(snapshot))),
                    None => {
                        tracing::warn!("search: location index not built yet, skipping geocode");
                        ControlFlow::Break(SearchResult::empty(Tier::City))
                    }
                }
            }
            Stage::Geocode(snapshot) => match self.geocoder.geocode(query).await {
                Some(place) => ControlFlow::Continue(Stage::Proximity(snapshot, place)),
                None => ControlFlow::Continue(Stage::City(snapshot, None)),
            },
            Stage::Proximity(snapshot, place) => {
                let hits = rank_by_proximity(
                    place.coordinate,
                    snapshot.all_resolved_locations(),
                    self.options.proximity_threshold_minutes,
                );
                if hits.is_empty() {
                    return ControlFlow::Continue(Stage::City(snapshot, Some(place)));
                }
                ControlFlow::Break(SearchResult {
                    tier: Tier::Proximity,
                    hits,
                    context: Some(SearchContext::Place {
                        name: Some(place.formatted_address),
                        coordinate: place.coordinate,
                    }),
                })
            }
            Stage::City(snapshot, place) => ControlFlow::Break(self.city_result(&snapshot, place)),
        }
    }

    async fn local_hits(&self, query: &str) -> Vec<SearchHit> {
        let found = match self.store.find_by_text(query).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(error = %err, "search: local text match failed");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        found
            .into_iter()
            .filter(|entry| seen.insert(entry.restaurant.id))
            .map(|entry| SearchHit::without_distance(entry.restaurant))
            .collect()
    }

    fn city_result(&self, snapshot: &IndexSnapshot, place: Option<GeocodeResult>) -> SearchResult {
        let Some(locality) = place.and_then(|p| p.locality) else {
            return SearchResult::empty(Tier::City);
        };
        let Some(city) =
            self.cities
                .match_city(snapshot.generation(), &locality, snapshot.distinct_cities())
        else {
            tracing::debug!(locality, "search: no known city matches");
            return SearchResult::empty(Tier::City);
        };

        let hits = snapshot
            .restaurants_in_city(&city)
            .iter()
            .cloned()
            .map(SearchHit::without_distance)
            .collect();
        SearchResult {
            tier: Tier::City,
            hits,
            context: Some(SearchContext::City { name: city }),
        }
    }
}

impl<S, G> std::fmt::Debug for SearchOrchestrator<S, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("cities", &self.cities)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
