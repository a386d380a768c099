//! Fuzzy matching of a geocoder's city string against the cities we hold.
//!
//! [`CityMatcher`] runs a list of [`CityMatchStrategy`] objects in order and
//! returns the first hit. The default order is exact, containment, then
//! bounded edit distance. All comparisons are case-insensitive and every
//! strategy returns the known city's own spelling.

use std::cmp::Reverse;
use std::collections::BTreeSet;

pub trait CityMatchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `candidate` is already trimmed and non-empty.
    fn find(&self, candidate: &str, known: &BTreeSet<String>) -> Option<String>;
}

/// Case-insensitive equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl CityMatchStrategy for ExactMatch {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn find(&self, candidate: &str, known: &BTreeSet<String>) -> Option<String> {
        let candidate = candidate.to_lowercase();
        known
            .iter()
            .find(|city| city.to_lowercase() == candidate)
            .cloned()
    }
}

/// One string contains the other ("Central London" / "London").
///
/// Several hits resolve to the longest known city, then case-insensitive
/// alphabetical order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Containment;

impl CityMatchStrategy for Containment {
    fn name(&self) -> &'static str {
        "containment"
    }

    fn find(&self, candidate: &str, known: &BTreeSet<String>) -> Option<String> {
        let candidate = candidate.to_lowercase();

        known
            .iter()
            .filter_map(|city| {
                let lowered = city.to_lowercase();
                let hit = !lowered.is_empty()
                    && (candidate.contains(&lowered) || lowered.contains(&candidate));
                hit.then(|| (Reverse(lowered.chars().count()), lowered, city))
            })
            .min()
            .map(|(_, _, city)| city.clone())
    }
}

/// Levenshtein distance within `max_distance`, applied only when both strings
/// have at least `min_chars` characters.
///
/// Closest city wins; ties resolve in case-insensitive alphabetical order.
#[derive(Debug, Clone, Copy)]
pub struct EditDistance {
    pub max_distance: usize,
    pub min_chars: usize,
}

impl Default for EditDistance {
    fn default() -> Self {
        Self {
            max_distance: 2,
            min_chars: 4,
        }
    }
}

impl CityMatchStrategy for EditDistance {
    fn name(&self) -> &'static str {
        "edit_distance"
    }

    fn find(&self, candidate: &str, known: &BTreeSet<String>) -> Option<String> {
        let candidate: Vec<char> = candidate.to_lowercase().chars().collect();
        if candidate.len() < self.min_chars {
            return None;
        }

        known
            .iter()
            .filter_map(|city| {
                let lowered = city.to_lowercase();
                let chars: Vec<char> = lowered.chars().collect();
                if chars.len() < self.min_chars
                    || chars.len().abs_diff(candidate.len()) > self.max_distance
                {
                    return None;
                }
                let distance = levenshtein(&candidate, &chars);
                (distance <= self.max_distance).then_some((distance, lowered, city))
            })
            .min()
            .map(|(_, _, city)| city.clone())
    }
}

/// Two-row Levenshtein over chars.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

pub struct CityMatcher {
    strategies: Vec<Box<dyn CityMatchStrategy>>,
}

impl CityMatcher {
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn CityMatchStrategy>>) -> Self {
        Self { strategies }
    }

    /// First strategy hit for `candidate`, or `None` if all strategies miss or
    /// the candidate is blank.
    #[must_use]
    pub fn match_city(&self, candidate: &str, known: &BTreeSet<String>) -> Option<String> {
        let candidate = candidate.trim();
        if candidate.is_empty() || known.is_empty() {
            return None;
        }

        self.strategies.iter().find_map(|strategy| {
            let found = strategy.find(candidate, known)?;
            tracing::debug!(
                candidate,
                city = %found,
                strategy = strategy.name(),
                "city matched"
            );
            Some(found)
        })
    }
}

impl Default for CityMatcher {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ExactMatch),
            Box::new(Containment),
            Box::new(EditDistance::default()),
        ])
    }
}

impl std::fmt::Debug for CityMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("CityMatcher")
            .field("strategies", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    fn distance(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        levenshtein(&a, &b)
    }

    #[test]
    fn levenshtein_reference_values() {
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("london", "londun"), 1);
        assert_eq!(distance("", "paris"), 5);
        assert_eq!(distance("paris", "paris"), 0);
        assert_eq!(distance("münchen", "munchen"), 1);
    }

    #[test]
    fn exact_is_case_insensitive() {
        let matcher = CityMatcher::default();
        assert_eq!(
            matcher.match_city("london", &cities(&["London"])).as_deref(),
            Some("London")
        );
    }

    #[test]
    fn containment_handles_qualified_names() {
        let matcher = CityMatcher::default();
        assert_eq!(
            matcher
                .match_city("Central London", &cities(&["London"]))
                .as_deref(),
            Some("London")
        );
        assert_eq!(
            matcher
                .match_city("Barcelona", &cities(&["Barcelona (Gràcia)"]))
                .as_deref(),
            Some("Barcelona (Gràcia)")
        );
    }

    #[test]
    fn containment_prefers_longest_city() {
        let known = cities(&["York", "New York"]);
        assert_eq!(
            Containment.find("New York City", &known).as_deref(),
            Some("New York")
        );
    }

    #[test]
    fn edit_distance_tolerates_spelling_variance() {
        let matcher = CityMatcher::default();
        assert_eq!(
            matcher.match_city("Londun", &cities(&["London"])).as_deref(),
            Some("London")
        );
    }

    #[test]
    fn edit_distance_prefers_closest_then_alphabetical() {
        let strategy = EditDistance::default();
        assert_eq!(
            strategy
                .find("Lisbun", &cities(&["Lisboa", "Lisbon"]))
                .as_deref(),
            Some("Lisbon")
        );
        assert_eq!(
            strategy.find("Baxx", &cities(&["Bath", "Bari"])).as_deref(),
            Some("Bari")
        );
    }

    #[test]
    fn ties_ignore_case_of_stored_cities() {
        let strategy = EditDistance::default();
        assert_eq!(
            strategy.find("Baxx", &cities(&["bari", "Bath"])).as_deref(),
            Some("bari")
        );
        assert_eq!(
            Containment.find("x", &cities(&["Lox", "bux"])).as_deref(),
            Some("bux")
        );
    }

    #[test]
    fn edit_distance_ignores_short_strings() {
        let strategy = EditDistance::default();
        assert!(strategy.find("Rom", &cities(&["Rome"])).is_none());
        assert!(strategy.find("Bari", &cities(&["Rio"])).is_none());
    }

    #[test]
    fn unrelated_candidate_matches_nothing() {
        let matcher = CityMatcher::default();
        assert!(matcher
            .match_city("Zzzqq", &cities(&["London", "Paris"]))
            .is_none());
    }

    #[test]
    fn blank_candidate_or_empty_set_matches_nothing() {
        let matcher = CityMatcher::default();
        assert!(matcher.match_city("   ", &cities(&["London"])).is_none());
        assert!(matcher.match_city("London", &BTreeSet::new()).is_none());
    }

    #[test]
    fn strategies_run_in_configured_order() {
        let known = cities(&["Londo", "London"]);
        let default = CityMatcher::default();
        assert_eq!(default.match_city("London", &known).as_deref(), Some("London"));

        let edit_only = CityMatcher::new(vec![Box::new(EditDistance::default())]);
        assert_eq!(edit_only.match_city("Londan", &known).as_deref(), Some("London"));
    }
}
