pub mod client;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod types;

pub use client::{Geocode, GeocodingClient, MAX_QUERY_CHARS};
pub use error::GeocodeError;
pub use normalize::normalize_query;
pub use provider::{GeocodeProvider, GoogleGeocoder};
