//! Response caching.
//!
//! The client caches results through the [`CacheStore`] trait, which any
//! backend can implement. [`InMemoryCache`] is the bundled implementation.
//!
//! Only one request shape is ever cached: an unauthenticated GET created
//! through [`ApiBuilder::get`](crate::ApiBuilder::get) with a positive TTL.
//! The cache key is the fully resolved request URL, query string included.
//! Only successful results are stored.

mod in_memory;

pub use in_memory::InMemoryCache;

use std::time::Duration;

use crate::clients::ApiResult;

/// Key/value storage with per-entry time-to-live.
///
/// The store is shared by every in-flight call, so implementations must be
/// safe to use concurrently. No transactional guarantees are required:
/// when two calls store the same key, the last write wins.
pub trait CacheStore: Send + Sync {
    /// Returns `true` if an entry exists under `key`.
    fn has(&self, key: &str) -> bool;

    /// Returns the entry stored under `key`, if any.
    fn get(&self, key: &str) -> Option<ApiResult>;

    /// Stores `value` under `key`, evicting it after `ttl`.
    ///
    /// Overwrites any existing entry and cancels its pending eviction.
    fn set(&self, key: &str, value: ApiResult, ttl: Duration);

    /// Removes the entry under `key` and cancels its eviction. Does nothing
    /// if the key is absent.
    fn delete(&self, key: &str);
}
