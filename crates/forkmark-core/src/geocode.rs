use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// How precisely the provider pinned the query down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A single resolved geocode. Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coordinate: Coordinate,
    pub formatted_address: String,
    /// Best-effort city or locality component.
    pub locality: Option<String>,
    pub confidence: Confidence,
}
