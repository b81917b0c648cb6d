//! Result Cache - Shared TTL store in front of evaluation and zoning
//!
//! One `FxHashMap` behind one `Mutex`. The lock is held only to read, clone
//! an `Arc`, insert or clear; results are always computed outside it.
//! Expired entries are removed lazily by the lookup that finds them, there is
//! no background sweep. Concurrent misses on the same key may each compute;
//! the last store wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Result, SuitabilityError};

/// Time source for entry expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock (`Instant::now`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A cached value with its creation time and validity window
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub value: Arc<V>,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) < self.ttl
    }
}

/// Thread-safe, time-bounded result store keyed by request signature
pub struct ResultCache<V, C: Clock = SystemClock> {
    entries: Mutex<FxHashMap<String, CacheEntry<V>>>,
    clock: C,
}

impl<V> ResultCache<V, SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<V> Default for ResultCache<V, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C: Clock> ResultCache<V, C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            clock,
        }
    }

    /// A panic while holding the lock cannot leave a half-written entry
    /// (inserts and removals are single map operations), so poisoning is
    /// recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, FxHashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            tracing::warn!("Result cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Fresh value for `key`, or `None`. An expired entry is removed.
    pub fn lookup(&self, key: &str) -> Option<Arc<V>> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let fresh = entries.get(key).map(|e| e.is_fresh(now))?;
        if fresh {
            entries.get(key).map(|e| Arc::clone(&e.value))
        } else {
            entries.remove(key);
            tracing::debug!("Cache entry '{}' expired", key);
            None
        }
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry
    pub fn store(&self, key: impl Into<String>, value: V, ttl: Duration) -> Arc<V> {
        let value = Arc::new(value);
        let entry = CacheEntry {
            value: Arc::clone(&value),
            created_at: self.clock.now(),
            ttl,
        };
        self.lock().insert(key.into(), entry);
        value
    }

    /// Drop every entry, returning how many were dropped
    pub fn invalidate_all(&self) -> usize {
        let mut entries = self.lock();
        let dropped = entries.len();
        entries.clear();
        tracing::info!("Result cache cleared ({} entries dropped)", dropped);
        dropped
    }

    /// Cached value for `key`, or compute it with `f` and store it.
    ///
    /// `f` runs without the lock held. Failures are returned as-is and
    /// leave the cache untouched.
    pub fn get_or_compute<E, F>(&self, key: &str, ttl: Duration, f: F) -> std::result::Result<Arc<V>, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
    {
        self.get_or_compute_if(key, ttl, |_| true, f)
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but a fresh entry
    /// rejected by `accept` counts as a miss and is replaced.
    pub fn get_or_compute_if<E, A, F>(
        &self,
        key: &str,
        ttl: Duration,
        accept: A,
        f: F,
    ) -> std::result::Result<Arc<V>, E>
    where
        A: Fn(&V) -> bool,
        F: FnOnce() -> std::result::Result<V, E>,
    {
        if let Some(hit) = self.lookup(key) {
            if accept(&hit) {
                tracing::debug!("Cache hit for '{}'", key);
                return Ok(hit);
            }
            tracing::warn!("Cache entry '{}' holds an unexpected value, recomputing", key);
        }
        let value = f()?;
        Ok(self.store(key, value, ttl))
    }

    /// Entry count, including expired entries not yet looked up
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Build an opaque cache key from an endpoint identity and its parameters
///
/// Parameters are rendered as JSON with object keys sorted, so logically
/// equal parameter sets map to the same key. The key carries the SHA-256 of
/// that JSON rather than the JSON itself, so its length does not grow with
/// the parameter set.
pub fn cache_key<P: Serialize + ?Sized>(endpoint: &str, params: Option<&P>) -> Result<String> {
    match params {
        None => Ok(endpoint.to_string()),
        Some(p) => {
            // Round-trip through Value: its map type keeps keys sorted
            let value = serde_json::to_value(p)
                .map_err(|e| SuitabilityError::invalid_input(format!("unserialisable cache parameters: {}", e)))?;
            let mut hasher = Sha256::new();
            hasher.update(value.to_string().as_bytes());
            Ok(format!("{}:{:x}", endpoint, hasher.finalize()))
        }
    }
}
