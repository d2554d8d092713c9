//! In-memory cache store with timed eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::cache::CacheStore;
use crate::clients::ApiResult;

#[derive(Debug)]
struct Cached {
    value: ApiResult,
    expires_at: Instant,
    eviction: Option<JoinHandle<()>>,
}

impl Cached {
    fn is_live(&self) -> bool {
        self.expires_at > Instant::now()
    }

    fn cancel_eviction(&self) {
        if let Some(eviction) = &self.eviction {
            eviction.abort();
        }
    }
}

type Entries = Arc<Mutex<HashMap<String, Cached>>>;

/// Expiry used when a TTL overflows the clock.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// A process-local [`CacheStore`].
///
/// Each `set` schedules an eviction task on the ambient tokio runtime; an
/// overwrite or `delete` aborts the pending task for that key, so a stale
/// timer never evicts a newer value. Entries past their TTL are treated as
/// absent even when no runtime is available to run the eviction. Dropping
/// the store aborts every pending eviction.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use api_builder::{ApiBuilder, InMemoryCache};
///
/// let mut api = ApiBuilder::from_base_url("https://api.example.com").unwrap();
/// api.set_cache_store(Arc::new(InMemoryCache::new()));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Entries,
}

impl InMemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().values().filter(|c| c.is_live()).count()
    }

    /// Returns `true` if there are no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry and cancels all pending evictions.
    pub fn clear(&self) {
        for (_, cached) in self.entries().drain() {
            cached.cancel_eviction();
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Cached>> {
        lock(&self.entries)
    }

    fn schedule_eviction(&self, key: String, expires_at: Instant) -> Option<JoinHandle<()>> {
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let entries = Arc::downgrade(&self.entries);
        Some(runtime.spawn(async move {
            tokio::time::sleep_until(expires_at).await;
            let Some(entries) = entries.upgrade() else {
                return;
            };
            let mut entries = lock(&entries);
            // An overwrite may have landed while this task was waking up
            if entries.get(&key).is_some_and(|c| !c.is_live()) {
                entries.remove(&key);
                tracing::debug!(key = %key, "Evicted cache entry");
            }
        }))
    }
}

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<String, Cached>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

fn live_entry<'a>(entries: &'a mut HashMap<String, Cached>, key: &str) -> Option<&'a Cached> {
    if entries.get(key).is_some_and(|c| !c.is_live()) {
        if let Some(expired) = entries.remove(key) {
            expired.cancel_eviction();
        }
        return None;
    }
    entries.get(key)
}

impl CacheStore for InMemoryCache {
    fn has(&self, key: &str) -> bool {
        live_entry(&mut self.entries(), key).is_some()
    }

    fn get(&self, key: &str) -> Option<ApiResult> {
        live_entry(&mut self.entries(), key).map(|c| c.value.clone())
    }

    fn set(&self, key: &str, value: ApiResult, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE);
        let eviction = self.schedule_eviction(key.to_string(), expires_at);
        let cached = Cached {
            value,
            expires_at,
            eviction,
        };
        if let Some(previous) = self.entries().insert(key.to_string(), cached) {
            previous.cancel_eviction();
        }
        tracing::debug!(key, ttl_secs = ttl.as_secs(), "Stored cache entry");
    }

    fn delete(&self, key: &str) {
        if let Some(cached) = self.entries().remove(key) {
            cached.cancel_eviction();
        }
    }
}

impl Drop for InMemoryCache {
    fn drop(&mut self) {
        for cached in self.entries().values() {
            cached.cancel_eviction();
        }
    }
}
