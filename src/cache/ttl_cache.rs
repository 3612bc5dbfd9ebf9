//! Bounded in-memory cache with per-entry expiry.
//!
//! Entries are evicted in insertion order once the cache is full, whether or
//! not they have expired yet. Expired entries are dropped lazily: a lookup
//! that finds one counts a miss and removes it, and [`TtlCache::purge_expired`]
//! sweeps the rest.

use super::clock::{Clock, SystemClock};
use crate::config::CacheSettings;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    /// `None` when the TTL reaches past the clock's representable range.
    expires_at: Option<Instant>,
    seq: u64,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// Counters reported by [`TtlCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub evictions: u64,
    /// `hits / (hits + misses)`, or 0.0 before the first lookup.
    pub hit_rate: f64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} hits, {} misses, {} evictions, {:.1}% hit rate",
            self.size,
            self.hits,
            self.misses,
            self.evictions,
            self.hit_rate * 100.0
        )
    }
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion order. Records whose sequence number no longer matches the
    /// live entry are tombstones and are skipped.
    order: VecDeque<(u64, String)>,
    next_seq: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<V> CacheState<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            next_seq: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Drop the oldest live entry, returning its key.
    fn evict_oldest(&mut self) -> Option<String> {
        while let Some((seq, key)) = self.order.pop_front() {
            let live = self.entries.get(&key).is_some_and(|e| e.seq == seq);
            if live {
                self.entries.remove(&key);
                self.evictions += 1;
                return Some(key);
            }
        }
        None
    }

    fn compact_order(&mut self) {
        if self.order.len() > self.entries.len() * 2 + 16 {
            let entries = &self.entries;
            self.order
                .retain(|(seq, key)| entries.get(key).is_some_and(|e| e.seq == *seq));
        }
    }

    fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
            evictions: self.evictions,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
        }
    }
}

/// Thread-safe TTL cache. Share it by reference or through an [`Arc`].
pub struct TtlCache<V> {
    name: String,
    max_size: usize,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(settings: CacheSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: "cache".to_string(),
            max_size: settings.max_size,
            default_ttl: settings.ttl(),
            clock,
            state: Mutex::new(CacheState::new()),
        }
    }

    /// Label used in log output.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up a live entry. Expired entries count as a miss and are removed.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut state = self.state.lock();

        let cached = state
            .entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));

        let live = match cached {
            Some(Some(value)) => Some(value),
            Some(None) => {
                state.entries.remove(key);
                log::debug!("[{}] expired: {}", self.name, key);
                None
            }
            None => None,
        };

        match live {
            Some(value) => {
                state.hits += 1;
                log::debug!("[{}] hit: {}", self.name, key);
                Some(value)
            }
            None => {
                state.misses += 1;
                log::debug!("[{}] miss: {}", self.name, key);
                None
            }
        }
    }

    /// Store `value` under `key` with the cache's default TTL.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.default_ttl);
    }

    /// Store `value` under `key`, expiring after `ttl`.
    ///
    /// Overwriting an existing key refreshes its creation time and moves it
    /// to the back of the eviction order. Adding a new key to a full cache
    /// first evicts the oldest entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        if self.max_size == 0 {
            return;
        }

        let key = key.into();
        let created_at = self.clock.now();
        let expires_at = created_at.checked_add(ttl);
        let mut state = self.state.lock();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.max_size {
            if let Some(evicted) = state.evict_oldest() {
                log::debug!("[{}] evicted: {}", self.name, evicted);
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.order.push_back((seq, key.clone()));
        state.entries.insert(
            key,
            CacheEntry {
                value,
                created_at,
                expires_at,
                seq,
            },
        );
        state.compact_order();
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.state.lock().entries.remove(key).map(|e| e.value)
    }

    /// Remove every entry in the `prefix` namespace.
    ///
    /// Matching stops at the `:` separator [`KeyBuilder`](super::KeyBuilder)
    /// emits, so `"user"` removes `user:…` keys but not `user_context:…`.
    /// A trailing `:` on `prefix` is accepted.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let namespace = prefix.strip_suffix(':').unwrap_or(prefix);
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|key, _| !in_namespace(key, namespace));
        let removed = before - state.entries.len();
        state.compact_order();

        if removed > 0 {
            log::debug!("[{}] invalidated {} entries under '{}'", self.name, removed, prefix);
        }
        removed
    }

    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.is_live(now));
        let removed = before - state.entries.len();
        state.compact_order();
        removed
    }

    /// Drop all entries and reset counters.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        *state = CacheState::new();
        log::info!("[{}] cleared", self.name);
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Age of a stored entry, live or not.
    pub fn age(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.state
            .lock()
            .entries
            .get(key)
            .map(|e| now.saturating_duration_since(e.created_at))
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats()
    }

    /// Return the cached value or compute and store it.
    ///
    /// `compute` runs without the lock held, so concurrent callers may
    /// compute the same key; the last writer wins.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// Like [`Self::get_or_compute`], but failures are returned and not cached.
    pub fn try_get_or_compute<F, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }
}

fn in_namespace(key: &str, namespace: &str) -> bool {
    key.strip_prefix(namespace)
        .is_some_and(|rest| rest.starts_with(':'))
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("max_size", &self.max_size)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;

    fn cache_with_clock(max_size: usize, ttl_secs: u64) -> (TtlCache<u32>, ManualClock) {
        let clock = ManualClock::new();
        let cache = TtlCache::with_clock(
            CacheSettings::new(max_size, ttl_secs),
            Arc::new(clock.clone()),
        );
        (cache, clock)
    }

    #[test]
    fn test_hit_then_expiry() {
        let (cache, clock) = cache_with_clock(10, 60);
        cache.insert("a", 1);

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get("a"), Some(1));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 0);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let (cache, clock) = cache_with_clock(10, 60);
        cache.set("forever", 1, Duration::MAX);

        assert_eq!(cache.get("forever"), Some(1));
        clock.advance(Duration::from_secs(10 * 365 * 24 * 3600));
        assert_eq!(cache.get("forever"), Some(1));
        assert_eq!(cache.purge_expired(), 0);
    }

    #[test]
    fn test_oldest_insert_evicted_first() {
        let (cache, _clock) = cache_with_clock(2, 60);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_overwrite_refreshes_position_and_age() {
        let (cache, clock) = cache_with_clock(2, 60);
        cache.insert("a", 1);
        cache.insert("b", 2);
        clock.advance(Duration::from_secs(30));
        cache.insert("a", 10);

        assert_eq!(cache.age("a"), Some(Duration::ZERO));

        // "b" is now the oldest
        cache.insert("c", 3);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(10));

        // Overwrite reset the expiry as well
        clock.advance(Duration::from_secs(45));
        assert_eq!(cache.get("a"), Some(10));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let (cache, _clock) = cache_with_clock(2, 60);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("b", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_eviction_ignores_expiry() {
        let (cache, clock) = cache_with_clock(2, 60);
        cache.set("long", 1, Duration::from_secs(600));
        cache.set("short", 2, Duration::from_secs(1));
        clock.advance(Duration::from_secs(5));

        cache.insert("new", 3);
        assert_eq!(cache.get("long"), None);
        assert_eq!(cache.get("new"), Some(3));
    }

    #[test]
    fn test_invalidate_prefix_leaves_other_namespaces() {
        let (cache, _clock) = cache_with_clock(10, 60);
        cache.insert("retrieval:1", 1);
        cache.insert("retrieval:2", 2);
        cache.insert("rewrite:1", 3);

        assert_eq!(cache.invalidate_prefix("retrieval:"), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("rewrite:1"), Some(3));
    }

    #[test]
    fn test_invalidate_prefix_respects_separator() {
        let (cache, _clock) = cache_with_clock(10, 60);
        cache.insert("user:1", 1);
        cache.insert("user_context:1", 2);
        cache.insert("user", 3);

        assert_eq!(cache.invalidate_prefix("user"), 1);
        assert_eq!(cache.get("user_context:1"), Some(2));
        assert_eq!(cache.get("user"), Some(3));
    }

    #[test]
    fn test_purge_expired() {
        let (cache, clock) = cache_with_clock(10, 60);
        cache.set("short", 1, Duration::from_secs(5));
        cache.set("long", 2, Duration::from_secs(500));
        clock.advance(Duration::from_secs(10));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_resets_counters() {
        let (cache, _clock) = cache_with_clock(10, 60);
        cache.insert("a", 1);
        cache.get("a");
        cache.get("b");
        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.hit_rate, 0.0);
    }

    #[test]
    fn test_get_or_compute_runs_once() {
        let (cache, _clock) = cache_with_clock(10, 60);
        let mut calls = 0;

        let first = cache.get_or_compute("k", || {
            calls += 1;
            7
        });
        let second = cache.get_or_compute("k", || {
            calls += 1;
            8
        });

        assert_eq!((first, second), (7, 7));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_failed_compute_not_cached() {
        let (cache, _clock) = cache_with_clock(10, 60);
        let failed: Result<u32, String> = cache.try_get_or_compute("k", || Err("boom".into()));
        assert!(failed.is_err());
        assert!(cache.is_empty());

        let ok: Result<u32, String> = cache.try_get_or_compute("k", || Ok(4));
        assert_eq!(ok, Ok(4));
        assert_eq!(cache.get("k"), Some(4));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let (cache, _clock) = cache_with_clock(0, 60);
        cache.insert("a", 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_tombstones_compacted_under_churn() {
        let (cache, _clock) = cache_with_clock(4, 60);
        for i in 0..1_000u32 {
            cache.insert(format!("k{}", i % 3), i);
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.state.lock().order.len() <= 3 * 2 + 17);
    }

    #[test]
    fn test_hit_rate() {
        let (cache, _clock) = cache_with_clock(10, 60);
        cache.insert("a", 1);
        cache.get("a");
        cache.get("a");
        cache.get("a");
        cache.get("missing");
        assert_eq!(cache.stats().hit_rate, 0.75);
    }
}
