use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

pub const DEFAULT_PROXIMITY_THRESHOLD_MINUTES: f64 = 20.0;
pub const DEFAULT_GEOCODE_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_GEOCODE_CACHE_CAPACITY: usize = 1024;
pub const DEFAULT_CITY_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MIN_QUERY_CHARS: usize = 1;

/// Tunables for the tiered search pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Locations within this many walking minutes of the resolved query count as near.
    pub proximity_threshold_minutes: f64,
    pub geocode_cache_ttl: Duration,
    pub geocode_cache_capacity: usize,
    pub city_cache_ttl: Duration,
    pub geocode_timeout: Duration,
    /// Trimmed queries shorter than this (in chars) short-circuit to an empty result.
    pub min_query_chars: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            proximity_threshold_minutes: DEFAULT_PROXIMITY_THRESHOLD_MINUTES,
            geocode_cache_ttl: DEFAULT_GEOCODE_CACHE_TTL,
            geocode_cache_capacity: DEFAULT_GEOCODE_CACHE_CAPACITY,
            city_cache_ttl: DEFAULT_CITY_CACHE_TTL,
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub geocoding_api_key: String,
    /// Overrides the provider endpoint (self-hosted proxies, tests).
    pub geocoding_base_url: Option<String>,
    pub search: SearchOptions,
    pub index_refresh_cron: String,
    pub resolve_cron: String,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("geocoding_api_key", &"[redacted]")
            .field("geocoding_base_url", &self.geocoding_base_url)
            .field("search", &self.search)
            .field("index_refresh_cron", &self.index_refresh_cron)
            .field("resolve_cron", &self.resolve_cron)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
