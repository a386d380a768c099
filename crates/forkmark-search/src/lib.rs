//! Location-aware restaurant search.
//!
//! A query runs through three tiers and stops at the first that matches:
//! local text match, geocode + walking-distance proximity, then a fuzzy
//! city-level fallback that reuses the same geocode answer.

pub mod city_cache;
pub mod city_matcher;
pub mod index;
pub mod orchestrator;
pub mod proximity;
pub mod result;

pub use city_cache::CachedCityMatcher;
pub use city_matcher::{CityMatchStrategy, CityMatcher, Containment, EditDistance, ExactMatch};
pub use index::{IndexSnapshot, LocationIndex};
pub use orchestrator::SearchOrchestrator;
pub use proximity::rank_by_proximity;
pub use result::{SearchContext, SearchHit, SearchResult, Tier};
