use log::{debug, trace};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tree_sitter::Query;

use super::cache::QuerySourceCache;

static SHARED_SOURCES: LazyLock<Arc<QuerySourceCache>> =
    LazyLock::new(|| Arc::new(QuerySourceCache::new(100)));

/// Loads highlight queries from a runtime directory, falling back to the
/// queries embedded at build time. Sources go through an LRU cache shared by
/// every loader in the process.
#[derive(Debug, Clone)]
pub struct QueryLoader {
    cache: Arc<QuerySourceCache>,
    runtime_dir: Option<PathBuf>,
}

impl QueryLoader {
    pub fn new() -> Self {
        Self {
            cache: Arc::clone(&SHARED_SOURCES),
            runtime_dir: None,
        }
    }

    /// Loader backed by its own cache instead of the shared one.
    pub fn with_cache(cache: Arc<QuerySourceCache>) -> Self {
        Self {
            cache,
            runtime_dir: None,
        }
    }

    /// Look for query overrides under `dir` before using the embedded ones.
    pub fn with_runtime_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.runtime_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn runtime_dir(&self) -> Option<&Path> {
        self.runtime_dir.as_deref()
    }

    /// Load and compile a query. `path` is relative to the runtime
    /// directory; `fallback` pieces are concatenated when no file is found.
    pub fn load_query(
        &self,
        language: tree_sitter::Language,
        name: &str,
        path: Option<&str>,
        fallback: &[&str],
    ) -> Result<Query, Box<dyn std::error::Error>> {
        let full_path = match (&self.runtime_dir, path) {
            (Some(dir), Some(path)) => Some(dir.join(path)),
            _ => None,
        };
        let cache_key = match &full_path {
            Some(full_path) => format!("{}_{}", name, full_path.display()),
            None => format!("{}_embedded", name),
        };

        let query_source = self.cache.get_or_load_source(&cache_key, || {
            if let Some(full_path) = &full_path {
                match fs::read_to_string(full_path) {
                    Ok(content) => {
                        debug!("Loaded query from file: {}", full_path.display());
                        return Ok(content);
                    }
                    Err(e) => debug!(
                        "Failed to load query from file {}: {}, using fallback",
                        full_path.display(),
                        e
                    ),
                }
            }
            if fallback.is_empty() {
                return Err(format!("no highlight query available for {}", name).into());
            }
            Ok(fallback.join("\n"))
        })?;

        trace!("Query source length: {}", query_source.len());

        let query = match Query::new(language, &query_source) {
            Ok(q) => q,
            Err(e) => {
                debug!("Query::new failed for {}: {:?}", name, e);
                return Err(Box::new(e) as Box<dyn std::error::Error>);
            }
        };

        Ok(query)
    }

    /// Clear the query cache (useful after editing runtime queries)
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl Default for QueryLoader {
    fn default() -> Self {
        Self::new()
    }
}
