//! Caller-owned cache of recommendation results
//!
//! Entries are keyed by catalog version, query id and count, so results
//! computed against an older catalog can never be served for a newer one.
//! Invalidate explicitly after a reload to free their memory.

use crate::engine::RecommendationEngine;
use crate::rank::Recommendation;
use ahash::AHashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tunematch_core::{Result, SongId};

pub const DEFAULT_CACHE_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub version: u64,
    pub query: SongId,
    pub count: usize,
}

impl CacheKey {
    pub fn new(version: u64, query: impl Into<SongId>, count: usize) -> Self {
        Self {
            version,
            query: query.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: AHashMap<CacheKey, Arc<Vec<Recommendation>>>,
    // insertion order, oldest first
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
}

/// Bounded result cache with first-in first-out eviction
#[derive(Debug)]
pub struct RecommendationCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

impl Default for RecommendationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl RecommendationCache {
    /// A capacity of 0 disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<Recommendation>>> {
        let mut inner = self.inner.lock();
        let found = inner.entries.get(key).cloned();
        if found.is_some() {
            inner.hits += 1;
        } else {
            inner.misses += 1;
        }
        found
    }

    pub fn insert(&self, key: CacheKey, results: Arc<Vec<Recommendation>>) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.entries.insert(key.clone(), results).is_none() {
            inner.order.push_back(key);
        }
        while inner.entries.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Serve from the cache or compute with `engine` and remember the result.
    ///
    /// Errors are returned as-is and never cached. The lock is not held
    /// while computing.
    pub fn get_or_compute(
        &self,
        engine: &RecommendationEngine,
        song_id: &str,
        count: usize,
    ) -> Result<Arc<Vec<Recommendation>>> {
        let key = CacheKey::new(engine.catalog().version(), song_id, count);
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let results = Arc::new(engine.recommend(song_id, count)?);
        self.insert(key, results.clone());
        Ok(results)
    }

    /// Drop every entry
    pub fn invalidate(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Drop entries computed against any other catalog version
    pub fn retain_version(&self, version: u64) {
        let mut inner = self.inner.lock();
        inner.entries.retain(|key, _| key.version == version);
        inner.order.retain(|key| key.version == version);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }
}
