//! In-memory TTL cache keyed by endpoint and argument tuple.

use super::read::CacheRead;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use skyfeed_core::{Clock, Endpoint};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Identity of a cached call: the endpoint plus its full argument list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub endpoint: Endpoint,
    pub args: Vec<String>,
}

impl CacheKey {
    pub fn new(endpoint: Endpoint, args: Vec<String>) -> Self {
        Self { endpoint, args }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.endpoint, self.args.join(", "))
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries currently stored, including expired ones not yet replaced.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    created_at: DateTime<Utc>,
}

/// Concurrent map from [`CacheKey`] to a value and its creation time.
///
/// Entries are never evicted; an entry older than the TTL passed to
/// [`get_or_compute`](Self::get_or_compute) is treated as absent and
/// replaced on the next successful computation.
pub struct ResponseCache<V> {
    entries: DashMap<CacheKey, Entry<V>>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.entries.len())
            .field("clock", &self.clock)
            .finish()
    }
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key` if it is younger than `ttl`,
    /// otherwise run `compute` and store its successful result.
    ///
    /// Errors from `compute` are returned and not stored.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<CacheRead<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(read) = self.lookup(&key, ttl) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache hit");
            return Ok(read);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache miss");

        let value = compute().await?;
        let created_at = self.clock.now();
        self.entries.insert(
            key,
            Entry {
                value: value.clone(),
                created_at,
            },
        );
        Ok(CacheRead::from_fetch(value, created_at))
    }

    /// Fresh entry for `key`, if any. The map guard is released on return.
    fn lookup(&self, key: &CacheKey, ttl: Duration) -> Option<CacheRead<V>> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;
        let age = (now - entry.created_at).to_std().unwrap_or(Duration::ZERO);
        if age < ttl {
            Some(CacheRead::from_cache(entry.value.clone(), entry.created_at))
        } else {
            None
        }
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.entries.len() as u64,
        }
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use skyfeed_test_utils::ManualClock;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A lookup hits exactly when the entry is younger than the TTL.
        #[test]
        fn prop_hit_iff_younger_than_ttl(ttl_secs in 0u64..10_000, elapsed in 0u64..20_000) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let clock = Arc::new(ManualClock::fixed());
            let cache: ResponseCache<u64> = ResponseCache::new(clock.clone());
            let ttl = Duration::from_secs(ttl_secs);
            let k = CacheKey::new(Endpoint::Apod, vec![]);

            let second = runtime.block_on(async {
                cache.get_or_compute(k.clone(), ttl, || async { Ok::<_, ()>(1) }).await.unwrap();
                clock.advance(Duration::from_secs(elapsed));
                cache.get_or_compute(k.clone(), ttl, || async { Ok::<_, ()>(2) }).await.unwrap()
            });

            prop_assert_eq!(second.was_cache_hit(), elapsed < ttl_secs);
        }
    }
}
