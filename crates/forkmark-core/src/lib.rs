pub mod app_config;
pub mod cache;
pub mod config;
pub mod geo;
pub mod geocode;
pub mod restaurants;
pub mod store;

pub use app_config::{AppConfig, Environment, SearchOptions};
pub use cache::TtlCache;
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_km, walking_minutes, Coordinate, EARTH_RADIUS_KM, WALKING_SPEED_KMH};
pub use geocode::{Confidence, GeocodeResult};
pub use restaurants::{Location, Restaurant, RestaurantStatus, RestaurantWithLocations};
pub use store::{RestaurantStore, StoreError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
