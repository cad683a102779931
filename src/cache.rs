//! In-memory memoization of forecast results.

use std::collections::HashMap;

use crate::core::{ForecastResult, ModelKind};

/// Identifies one forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Fingerprint of the loaded daily series.
    pub fingerprint: u64,
    /// Requested model (`None` for automatic selection).
    pub model: Option<ModelKind>,
    /// Forecast horizon.
    pub horizon: usize,
}

impl CacheKey {
    pub fn new(fingerprint: u64, model: Option<ModelKind>, horizon: usize) -> Self {
        Self {
            fingerprint,
            model,
            horizon,
        }
    }
}

/// Unbounded result cache. Nothing is ever evicted; call
/// [`ForecastCache::clear`] to reset it.
#[derive(Debug, Clone, Default)]
pub struct ForecastCache {
    entries: HashMap<CacheKey, ForecastResult>,
    hits: usize,
    misses: usize,
}

impl ForecastCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that had to compute a result.
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Cached result for `key`, if any.
    pub fn get(&self, key: &CacheKey) -> Option<&ForecastResult> {
        self.entries.get(key)
    }

    /// Store a result, replacing any previous one.
    pub fn insert(&mut self, key: CacheKey, result: ForecastResult) {
        self.entries.insert(key, result);
    }

    /// Return the cached result or compute and store it.
    pub fn get_or_insert_with<F>(&mut self, key: CacheKey, compute: F) -> &ForecastResult
    where
        F: FnOnce() -> ForecastResult,
    {
        if self.entries.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.entries.entry(key).or_insert_with(compute)
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
