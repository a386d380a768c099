use std::time::Duration;

use thiserror::Error;

/// Errors from the geocoding provider.
///
/// None of these reach search consumers: [`crate::GeocodingClient`] logs them
/// and reports "no result".
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from geocoding provider")]
    UnexpectedStatus { status: u16 },

    #[error("geocoding provider did not answer within {after:?}")]
    Timeout { after: Duration },

    /// The provider answered but refused the request (quota, key, invalid request).
    #[error("geocoding provider returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Provider {
        status: String,
        message: Option<String>,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed JSON that violates the expected contract.
    #[error("malformed geocoding response: {0}")]
    Malformed(String),

    #[error("invalid geocoding base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl GeocodeError {
    /// `true` when the provider's payload did not match the expected shape,
    /// which usually means the provider contract changed.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Deserialize { .. } | Self::Malformed(_))
    }
}
