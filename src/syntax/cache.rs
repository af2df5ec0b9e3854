// LRU cache for highlight query sources

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

/// Thread-safe LRU cache of highlight query source text.
///
/// Compiled `tree_sitter::Query` values are not `Clone`, so the cache keeps
/// the source and each highlighter compiles its own copy once.
#[derive(Debug)]
pub struct QuerySourceCache {
    cache: Mutex<LruCache<String, String>>,
}

impl QuerySourceCache {
    /// Create a new query source cache with the specified capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, String>> {
        // a panic while holding the lock cannot leave a half-written entry
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get query source from cache, or load it using the provided loader
    pub fn get_or_load_source<F>(
        &self,
        key: &str,
        loader: F,
    ) -> Result<String, Box<dyn std::error::Error>>
    where
        F: FnOnce() -> Result<String, Box<dyn std::error::Error>>,
    {
        let mut cache = self.lock();

        if let Some(source) = cache.get(key) {
            return Ok(source.clone());
        }

        let source = loader()?;
        cache.put(key.to_string(), source.clone());

        Ok(source)
    }

    /// Clear all cached query sources
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Get the number of query sources currently in the cache
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
