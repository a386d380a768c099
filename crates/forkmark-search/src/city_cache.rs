use std::collections::BTreeSet;
use std::time::Duration;

use forkmark_core::TtlCache;

use crate::city_matcher::CityMatcher;

const CITY_CACHE_CAPACITY: usize = 256;

/// [`CityMatcher`] with a short-lived memo of its answers.
///
/// Keys include the index snapshot generation, so a refreshed city set never
/// serves a match computed against the old one.
#[derive(Debug)]
pub struct CachedCityMatcher {
    matcher: CityMatcher,
    cache: TtlCache<(u64, String), Option<String>>,
}

impl CachedCityMatcher {
    #[must_use]
    pub fn new(matcher: CityMatcher, ttl: Duration) -> Self {
        Self {
            matcher,
            cache: TtlCache::new(CITY_CACHE_CAPACITY, ttl),
        }
    }

    pub fn match_city(
        &self,
        generation: u64,
        candidate: &str,
        known: &BTreeSet<String>,
    ) -> Option<String> {
        let key = (generation, candidate.trim().to_lowercase());
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let found = self.matcher.match_city(candidate, known);
        self.cache.insert(key, found.clone());
        found
    }

    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
