//! Bounded memoization for pure text functions.
//!
//! Stemming and charset canonicalization are pure functions of their input,
//! so their results can be cached for the lifetime of the process without
//! invalidation. Caches are explicit objects: construct one, share it through
//! an [`Arc`] across branches and worker threads.
//!
//! Eviction is least-recently-used once capacity is reached. It only costs
//! recomputation, never correctness.

use crate::text::stem::{PorterStemmer, Stemmer};
use lru::LruCache;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default capacity of a stem cache.
pub const DEFAULT_STEM_CAPACITY: usize = 1_000_000;
/// Default capacity of a charset cache.
pub const DEFAULT_CHARSET_CAPACITY: usize = 10_000;

/// Hit/miss/eviction counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to compute the value
    pub misses: u64,
    /// Entries dropped to stay within capacity
    pub evictions: u64,
}

impl CacheStats {
    /// Get hit rate (0.0 - 1.0)
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe LRU memo table keyed by the exact input string.
#[derive(Debug)]
pub struct MemoCache<V> {
    entries: Mutex<LruCache<String, V>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V: Clone> MemoCache<V> {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        // unbounded storage grows lazily; capacity is enforced on insert
        Self {
            entries: Mutex::new(LruCache::unbounded()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, computing and inserting it on a miss.
    ///
    /// The lock is not held while `compute` runs; two threads missing on the
    /// same key may both compute it, which is harmless for pure functions.
    pub fn get_or_insert_with<F>(&self, key: &str, compute: F) -> V
    where
        F: FnOnce(&str) -> V,
    {
        if let Some(value) = self.entries.lock().get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value.clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let value = compute(key);
        let mut entries = self.entries.lock();
        if !entries.contains(key)
            && entries.len() >= self.capacity
            && entries.pop_lru().is_some()
        {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        entries.put(key.to_string(), value.clone());
        value
    }

    /// Whether `key` is cached, without touching recency.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the hit/miss/eviction counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Memoizing wrapper around a [`Stemmer`].
///
/// # Examples
///
/// ```
/// use listing_features::text::cache::StemCache;
///
/// let cache = StemCache::new(100);
/// assert_eq!(cache.stem("running"), "run");
/// assert_eq!(cache.stem("running"), "run");
/// assert_eq!(cache.stats().hits, 1);
/// ```
pub struct StemCache {
    stemmer: Arc<dyn Stemmer>,
    memo: MemoCache<String>,
}

impl StemCache {
    /// Porter stemmer cache with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_stemmer(Arc::new(PorterStemmer::new()), capacity)
    }

    /// Cache around a custom stemmer.
    #[must_use]
    pub fn with_stemmer(stemmer: Arc<dyn Stemmer>, capacity: usize) -> Self {
        Self {
            stemmer,
            memo: MemoCache::new(capacity),
        }
    }

    /// Stem `word`, reusing a previous result when available.
    pub fn stem(&self, word: &str) -> String {
        self.memo.get_or_insert_with(word, |w| self.stemmer.stem(w))
    }

    /// Underlying memo table.
    #[must_use]
    pub fn memo(&self) -> &MemoCache<String> {
        &self.memo
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.memo.stats()
    }
}

impl Default for StemCache {
    fn default() -> Self {
        Self::new(DEFAULT_STEM_CAPACITY)
    }
}

impl std::fmt::Debug for StemCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StemCache")
            .field("len", &self.memo.len())
            .field("capacity", &self.memo.capacity())
            .field("stats", &self.memo.stats())
            .finish()
    }
}

/// Sorted, duplicate-free characters of `word`.
///
/// ```
/// use listing_features::text::cache::charset_key;
///
/// assert_eq!(charset_key("banana"), "abn");
/// assert_eq!(charset_key("nabana"), charset_key("banana"));
/// ```
#[must_use]
pub fn charset_key(word: &str) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    chars.sort_unstable();
    chars.dedup();
    chars.into_iter().collect()
}

/// Memoized [`charset_key`].
#[derive(Debug)]
pub struct CharsetCache {
    memo: MemoCache<String>,
}

impl CharsetCache {
    /// Create a cache with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            memo: MemoCache::new(capacity),
        }
    }

    /// Canonical charset key of `word`.
    pub fn charset_key(&self, word: &str) -> String {
        self.memo.get_or_insert_with(word, charset_key)
    }

    /// Underlying memo table.
    #[must_use]
    pub fn memo(&self) -> &MemoCache<String> {
        &self.memo
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.memo.stats()
    }
}

impl Default for CharsetCache {
    fn default() -> Self {
        Self::new(DEFAULT_CHARSET_CAPACITY)
    }
}
