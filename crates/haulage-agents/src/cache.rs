//! Filter memoization and the shared filter engine.
//!
//! Filter labels are parsed at most once: [`FilterCache`] memoizes the
//! [`FilterResult`] by the lowercased full label. The state machine itself
//! is stepped single-threaded, but a host is free to evaluate many
//! couriers' filters from worker threads, so the cache takes concurrent
//! reads and compute-on-miss writes: the parse runs outside any lock and
//! insertion is first-writer-wins -- a losing racer drops its result and
//! adopts the winner's.
//!
//! [`FilterEngine`] bundles the cache with the item catalog and the alias
//! configuration behind `&self` methods so one `Arc<FilterEngine>` can
//! serve every courier. Any configuration change -- edit, save, reload --
//! clears the cache wholesale; a stale entry parsed under old aliases
//! must never outlive them.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use haulage_types::ItemCatalog;
use tracing::{debug, error};

use crate::config::FilterConfig;
use crate::filter::{self, FilterResult};

// ---------------------------------------------------------------------------
// FilterCache
// ---------------------------------------------------------------------------

/// Concurrent memo of parsed filter labels.
#[derive(Debug, Default)]
pub struct FilterCache {
    entries: RwLock<HashMap<String, Arc<FilterResult>>>,
}

impl FilterCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the parsed filter for a label, computing it on a miss.
    ///
    /// The key is the lowercased full label, so `"Iron"` and `"iron"`
    /// share one entry. When two threads miss the same key at once, both
    /// parse but only the first insertion sticks.
    pub fn get_or_parse(
        &self,
        label: &str,
        config: &FilterConfig,
        catalog: &ItemCatalog,
    ) -> Arc<FilterResult> {
        let key = label.to_lowercase();

        {
            let entries = self
                .entries
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = entries.get(&key) {
                return Arc::clone(hit);
            }
        }

        // Parse outside any lock; contention stays bounded by insertion.
        let parsed = Arc::new(filter::parse_filter(&key, config, catalog));

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key).or_insert(parsed))
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let dropped = entries.len();
        entries.clear();
        if dropped > 0 {
            debug!(dropped, "filter cache cleared");
        }
    }

    /// Number of cached labels.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// FilterEngine
// ---------------------------------------------------------------------------

/// Catalog, alias configuration, and cache bundled for shared use.
#[derive(Debug)]
pub struct FilterEngine {
    catalog: ItemCatalog,
    config: RwLock<FilterConfig>,
    cache: FilterCache,
}

impl FilterEngine {
    /// Create an engine over the given catalog and configuration.
    pub fn new(catalog: ItemCatalog, config: FilterConfig) -> Self {
        Self {
            catalog,
            config: RwLock::new(config),
            cache: FilterCache::new(),
        }
    }

    /// The item catalog filters resolve against.
    pub const fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// The parsed filter for a label, served from the cache.
    pub fn filter_for(&self, label: &str) -> Arc<FilterResult> {
        let config = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        self.cache.get_or_parse(label, &config, &self.catalog)
    }

    /// Run a closure against the current configuration.
    pub fn with_config<R>(&self, f: impl FnOnce(&FilterConfig) -> R) -> R {
        let config = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&config)
    }

    /// Set or replace an alias, invalidating every cached filter.
    pub fn set_alias(&self, name: &str, terms: Vec<String>) {
        {
            let mut config = self
                .config
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            config.set_alias(name, terms);
        }
        self.cache.clear();
    }

    /// Persist the configuration and invalidate the cache.
    ///
    /// Persistence failures are logged and swallowed; the behavior core
    /// never sees them. The cache clears either way -- the in-memory
    /// configuration is the source of truth for parsing.
    pub fn save_to(&self, path: &Path) {
        let result = {
            let config = self
                .config
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            config.save(path)
        };
        if let Err(source) = result {
            error!(%source, ?path, "failed to save filter aliases");
        }
        self.cache.clear();
    }

    /// Replace the configuration from disk and invalidate the cache.
    pub fn reload_from(&self, path: &Path) {
        let loaded = FilterConfig::load(path);
        {
            let mut config = self
                .config
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *config = loaded;
        }
        self.cache.clear();
    }

    /// Number of labels currently cached. Exposed for tests and metrics.
    pub fn cached_labels(&self) -> usize {
        self.cache.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
