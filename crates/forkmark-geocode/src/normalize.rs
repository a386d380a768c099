/// Cache key form of a free-text query: trimmed, lower-cased, inner whitespace
/// collapsed to single spaces.
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
