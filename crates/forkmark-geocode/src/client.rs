//! Caching, time-boxed front for a [`GeocodeProvider`].
//!
//! Every failure mode collapses to `None` for the caller, but is logged so
//! provider trouble stays distinguishable from a genuine "no such place":
//!
//! | Outcome                         | Cached        | Log level |
//! |---------------------------------|---------------|-----------|
//! | result found                    | yes           | `debug`   |
//! | provider found nothing          | yes (`None`)  | `debug`   |
//! | network / status / timeout      | no            | `warn`    |
//! | payload did not match contract  | no            | `error`   |

use std::future::Future;
use std::time::Duration;

use forkmark_core::{GeocodeResult, SearchOptions, TtlCache};

use crate::error::GeocodeError;
use crate::normalize::normalize_query;
use crate::provider::GeocodeProvider;

/// Queries longer than this are never sent to the provider.
pub const MAX_QUERY_CHARS: usize = 200;

/// Free text in, at most one resolved place out.
pub trait Geocode: Send + Sync {
    fn geocode(&self, query: &str) -> impl Future<Output = Option<GeocodeResult>> + Send;
}

pub struct GeocodingClient<P> {
    provider: P,
    cache: TtlCache<String, Option<GeocodeResult>>,
    timeout: Duration,
}

impl<P: GeocodeProvider> GeocodingClient<P> {
    #[must_use]
    pub fn new(provider: P, options: &SearchOptions) -> Self {
        Self::with_settings(
            provider,
            options.geocode_cache_ttl,
            options.geocode_cache_capacity,
            options.geocode_timeout,
        )
    }

    #[must_use]
    pub fn with_settings(
        provider: P,
        cache_ttl: Duration,
        cache_capacity: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache: TtlCache::new(cache_capacity, cache_ttl),
            timeout,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Like [`Geocode::geocode`], but provider failures come back as errors
    /// instead of `None`. Answers the provider gave, including "nothing
    /// found", are cached; failures are not.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] when the provider is unreachable, times out,
    /// refuses the request or answers with a malformed payload.
    pub async fn try_geocode(&self, query: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        let key = normalize_query(query);
        if key.is_empty() {
            return Ok(None);
        }
        if key.chars().count() > MAX_QUERY_CHARS {
            tracing::debug!(chars = key.chars().count(), "geocode: query too long, skipping");
            return Ok(None);
        }

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(query = %key, found = cached.is_some(), "geocode: cache hit");
            return Ok(cached);
        }

        let result = self.lookup_with_timeout(&key).await?;
        if result.is_none() {
            tracing::debug!(query = %key, "geocode: provider found no match");
        } else {
            tracing::debug!(query = %key, "geocode: resolved");
        }
        self.cache.insert(key, result.clone());
        Ok(result)
    }

    async fn resolve(&self, query: &str) -> Option<GeocodeResult> {
        match self.try_geocode(query).await {
            Ok(result) => result,
            Err(err) if err.is_malformed() => {
                tracing::error!(query = %query.trim(), error = %err, "geocode: malformed provider response");
                None
            }
            Err(err) => {
                tracing::warn!(query = %query.trim(), error = %err, "geocode: provider unavailable");
                None
            }
        }
    }

    async fn lookup_with_timeout(&self, key: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        tokio::time::timeout(self.timeout, self.provider.lookup(key))
            .await
            .map_err(|_| GeocodeError::Timeout {
                after: self.timeout,
            })?
    }
}

impl<P: GeocodeProvider> Geocode for GeocodingClient<P> {
    async fn geocode(&self, query: &str) -> Option<GeocodeResult> {
        self.resolve(query).await
    }
}
