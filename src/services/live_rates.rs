use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::RateError;
use crate::services::exchange_rate_api::RateProvider;

/// Quote served to the live-rate endpoint
#[derive(Debug, Clone)]
pub struct LiveRateQuote {
    pub base: String,
    pub target: String,
    pub rate: f64,
    pub cached: bool,
    /// When the serving cache entry was fetched; None on a fresh fetch
    pub cache_timestamp: Option<DateTime<Utc>>,
}

/// Process-local cache of "latest" conversion tables.
///
/// Keyed by base currency alone: the provider returns the full table per base
/// in one call, so lookups for different targets under the same base share one
/// upstream fetch. Expiry is checked lazily at read time, there is no sliding
/// window and no background refresh. Entries are replaced wholesale under the
/// write lock, never mutated field by field. Lost on restart, which is fine:
/// this is an optimization over the provider, not a source of truth.
pub struct LiveRateCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

#[derive(Clone)]
struct CacheEntry {
    rates: HashMap<String, f64>,
    fetched_at: DateTime<Utc>,
}

impl LiveRateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get_rate(
        &self,
        provider: &dyn RateProvider,
        base: &str,
        target: &str,
        bypass_cache: bool,
    ) -> Result<LiveRateQuote, RateError> {
        self.get_rate_at(provider, base, target, bypass_cache, Utc::now())
            .await
    }

    async fn get_rate_at(
        &self,
        provider: &dyn RateProvider,
        base: &str,
        target: &str,
        bypass_cache: bool,
        now: DateTime<Utc>,
    ) -> Result<LiveRateQuote, RateError> {
        if !bypass_cache {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(base) {
                if now - entry.fetched_at < self.ttl {
                    let rate = entry.rates.get(target).copied().ok_or_else(|| {
                        RateError::MissingTarget {
                            base: base.to_string(),
                            target: target.to_string(),
                        }
                    })?;
                    return Ok(LiveRateQuote {
                        base: base.to_string(),
                        target: target.to_string(),
                        rate,
                        cached: true,
                        cache_timestamp: Some(entry.fetched_at),
                    });
                }
            }
        }

        tracing::debug!("Live rate cache miss for {}, fetching", base);
        let snapshot = provider.fetch_latest(base).await?;

        // Cache the whole table before projecting the target, a missing
        // target does not invalidate the table for other lookups
        let rate = snapshot.rates.get(target).copied();
        self.entries.write().await.insert(
            base.to_string(),
            CacheEntry {
                rates: snapshot.rates,
                fetched_at: now,
            },
        );

        let rate = rate.ok_or_else(|| RateError::MissingTarget {
            base: base.to_string(),
            target: target.to_string(),
        })?;

        Ok(LiveRateQuote {
            base: base.to_string(),
            target: target.to_string(),
            rate,
            cached: false,
            cache_timestamp: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::exchange_rate_api::testing::ScriptedProvider;

    fn cache() -> LiveRateCache {
        LiveRateCache::new(Duration::hours(3))
    }

    #[tokio::test]
    async fn second_lookup_within_ttl_is_served_from_cache() {
        let cache = cache();
        let provider = ScriptedProvider::quoting(&[("CAD", 1.35), ("EUR", 0.92)]);

        let first = cache
            .get_rate(&provider, "USD", "CAD", false)
            .await
            .unwrap();
        assert!(!first.cached);
        assert!(first.cache_timestamp.is_none());

        let second = cache
            .get_rate(&provider, "USD", "CAD", false)
            .await
            .unwrap();
        assert!(second.cached);
        assert!(second.cache_timestamp.is_some());
        assert_eq!(second.rate, 1.35);

        // One table fetch serves both targets under the base
        let other = cache
            .get_rate(&provider, "USD", "EUR", false)
            .await
            .unwrap();
        assert!(other.cached);
        assert_eq!(provider.calls().0, 1);
    }

    #[tokio::test]
    async fn entry_past_ttl_triggers_exactly_one_refetch() {
        let cache = cache();
        let provider = ScriptedProvider::quoting(&[("CAD", 1.35)]);

        cache
            .get_rate(&provider, "USD", "CAD", false)
            .await
            .unwrap();

        // Read as if 3h01m have passed
        let later = Utc::now() + Duration::hours(3) + Duration::minutes(1);
        let stale = cache
            .get_rate_at(&provider, "USD", "CAD", false, later)
            .await
            .unwrap();

        assert!(!stale.cached);
        assert_eq!(provider.calls().0, 2);

        // And the refreshed entry serves the next read
        let warm = cache
            .get_rate_at(&provider, "USD", "CAD", false, later)
            .await
            .unwrap();
        assert!(warm.cached);
        assert_eq!(provider.calls().0, 2);
    }

    #[tokio::test]
    async fn bypass_forces_a_fetch_and_replaces_the_entry() {
        let cache = cache();
        let provider = ScriptedProvider::quoting(&[("CAD", 1.35)]);

        cache
            .get_rate(&provider, "USD", "CAD", false)
            .await
            .unwrap();
        let forced = cache.get_rate(&provider, "USD", "CAD", true).await.unwrap();

        assert!(!forced.cached);
        assert_eq!(provider.calls().0, 2);
    }

    #[tokio::test]
    async fn unknown_target_errors_but_keeps_the_table() {
        let cache = cache();
        let provider = ScriptedProvider::quoting(&[("CAD", 1.35)]);

        let err = cache
            .get_rate(&provider, "USD", "XXX", false)
            .await
            .unwrap_err();
        assert!(matches!(err, RateError::MissingTarget { .. }));

        // The fetched table was cached anyway, a valid target hits it
        let quote = cache
            .get_rate(&provider, "USD", "CAD", false)
            .await
            .unwrap();
        assert!(quote.cached);
        assert_eq!(provider.calls().0, 1);
    }

    #[tokio::test]
    async fn provider_failure_on_miss_propagates() {
        let cache = cache();
        let mut provider = ScriptedProvider::quoting(&[("CAD", 1.35)]);
        provider.fail_latest_bases.insert("USD".to_string());

        let err = cache
            .get_rate(&provider, "USD", "CAD", false)
            .await
            .unwrap_err();
        assert!(err.is_upstream());
    }
}
