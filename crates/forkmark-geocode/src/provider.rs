//! HTTP geocoding provider.
//!
//! [`GoogleGeocoder`] issues exactly one request per call and does no caching
//! or retrying; both belong to callers.

use std::future::Future;
use std::time::Duration;

use forkmark_core::{Confidence, Coordinate, GeocodeResult};
use reqwest::{Client, StatusCode, Url};

use crate::error::GeocodeError;
use crate::types::{GeocodeItem, GeocodeResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// A single external text-to-coordinate lookup.
pub trait GeocodeProvider: Send + Sync {
    /// `Ok(None)` means the provider answered and found nothing.
    fn lookup(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<GeocodeResult>, GeocodeError>> + Send;
}

/// Client for the Google Geocoding API (or anything speaking its JSON shape).
///
/// Use [`GoogleGeocoder::new`] for production or
/// [`GoogleGeocoder::with_base_url`] to point at a mock server in tests.
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl GoogleGeocoder {
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        Self::with_base_url(api_key, timeout, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`GeocodeError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout: Duration,
        base_url: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent("forkmark/0.1 (restaurant-search)")
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| GeocodeError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    fn build_url(&self, address: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", &self.api_key);
        url
    }

    async fn request(&self, address: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        let url = self.build_url(address);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("geocode(address={address})"),
                source: e,
            })?;

        interpret_response(parsed)
    }
}

impl GeocodeProvider for GoogleGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        self.request(query).await
    }
}

/// Maps the provider envelope onto "found", "nothing found" or an error.
fn interpret_response(response: GeocodeResponse) -> Result<Option<GeocodeResult>, GeocodeError> {
    match response.status.as_str() {
        "OK" => response.results.into_iter().next().map(into_result).transpose(),
        "ZERO_RESULTS" => Ok(None),
        _ => Err(GeocodeError::Provider {
            status: response.status,
            message: response.error_message,
        }),
    }
}

fn into_result(item: GeocodeItem) -> Result<GeocodeResult, GeocodeError> {
    let coordinate = Coordinate::new(item.geometry.location.lat, item.geometry.location.lng);
    if !coordinate.is_valid() {
        return Err(GeocodeError::Malformed(format!(
            "coordinate out of range: ({}, {})",
            coordinate.latitude, coordinate.longitude
        )));
    }

    Ok(GeocodeResult {
        coordinate,
        locality: item.locality().map(ToOwned::to_owned),
        confidence: confidence_for(item.geometry.location_type.as_deref()),
        formatted_address: item.formatted_address,
    })
}

fn confidence_for(location_type: Option<&str>) -> Confidence {
    match location_type {
        Some("ROOFTOP") => Confidence::High,
        Some("RANGE_INTERPOLATED" | "GEOMETRIC_CENTER") => Confidence::Medium,
        _ => Confidence::Low,
    }
}
