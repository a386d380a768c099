use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::app_config::{
    AppConfig, Environment, SearchOptions, DEFAULT_CITY_CACHE_TTL, DEFAULT_GEOCODE_CACHE_CAPACITY,
    DEFAULT_GEOCODE_CACHE_TTL, DEFAULT_GEOCODE_TIMEOUT, DEFAULT_MIN_QUERY_CHARS,
    DEFAULT_PROXIMITY_THRESHOLD_MINUTES,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Core parsing/validation, decoupled from the real environment so it can be
/// tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let geocoding_api_key = require("FORKMARK_GEOCODING_API_KEY")?;
    let geocoding_base_url = lookup("FORKMARK_GEOCODING_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let env = parse_environment(&or_default("FORKMARK_ENV", "development"));
    let bind_addr: SocketAddr = parse_value(
        "FORKMARK_BIND_ADDR",
        &or_default("FORKMARK_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("FORKMARK_LOG_LEVEL", "info");

    let db_max_connections = parse_value(
        "FORKMARK_DB_MAX_CONNECTIONS",
        &or_default("FORKMARK_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections = parse_value(
        "FORKMARK_DB_MIN_CONNECTIONS",
        &or_default("FORKMARK_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs = parse_value(
        "FORKMARK_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("FORKMARK_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let search = SearchOptions {
        proximity_threshold_minutes: parse_threshold(&or_default(
            "FORKMARK_PROXIMITY_THRESHOLD_MINUTES",
            &DEFAULT_PROXIMITY_THRESHOLD_MINUTES.to_string(),
        ))?,
        geocode_cache_ttl: parse_secs(
            "FORKMARK_GEOCODE_CACHE_TTL_SECS",
            &or_default(
                "FORKMARK_GEOCODE_CACHE_TTL_SECS",
                &DEFAULT_GEOCODE_CACHE_TTL.as_secs().to_string(),
            ),
        )?,
        geocode_cache_capacity: parse_value(
            "FORKMARK_GEOCODE_CACHE_CAPACITY",
            &or_default(
                "FORKMARK_GEOCODE_CACHE_CAPACITY",
                &DEFAULT_GEOCODE_CACHE_CAPACITY.to_string(),
            ),
        )?,
        city_cache_ttl: parse_secs(
            "FORKMARK_CITY_CACHE_TTL_SECS",
            &or_default(
                "FORKMARK_CITY_CACHE_TTL_SECS",
                &DEFAULT_CITY_CACHE_TTL.as_secs().to_string(),
            ),
        )?,
        geocode_timeout: parse_secs(
            "FORKMARK_GEOCODE_TIMEOUT_SECS",
            &or_default(
                "FORKMARK_GEOCODE_TIMEOUT_SECS",
                &DEFAULT_GEOCODE_TIMEOUT.as_secs().to_string(),
            ),
        )?,
        min_query_chars: parse_value(
            "FORKMARK_MIN_QUERY_CHARS",
            &or_default("FORKMARK_MIN_QUERY_CHARS", &DEFAULT_MIN_QUERY_CHARS.to_string()),
        )?,
    };

    let index_refresh_cron = or_default("FORKMARK_INDEX_REFRESH_CRON", "0 */5 * * * *");
    let resolve_cron = or_default("FORKMARK_RESOLVE_CRON", "0 */15 * * * *");
    let rate_limit_per_minute = parse_value(
        "FORKMARK_RATE_LIMIT_PER_MINUTE",
        &or_default("FORKMARK_RATE_LIMIT_PER_MINUTE", "120"),
    )?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        geocoding_api_key,
        geocoding_base_url,
        search,
        index_refresh_cron,
        resolve_cron,
        rate_limit_per_minute,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn parse_secs(var: &str, raw: &str) -> Result<Duration, ConfigError> {
    parse_value::<u64>(var, raw).map(Duration::from_secs)
}

/// The walking threshold must be a positive, finite number of minutes.
fn parse_threshold(raw: &str) -> Result<f64, ConfigError> {
    const VAR: &str = "FORKMARK_PROXIMITY_THRESHOLD_MINUTES";
    let minutes = parse_value::<f64>(VAR, raw)?;
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: VAR.to_string(),
            reason: format!("must be a positive number of minutes, got {minutes}"),
        });
    }
    Ok(minutes)
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
