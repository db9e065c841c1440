//! Cache configuration

use serde::{Deserialize, Serialize};

/// Configuration for the in-memory store.
///
/// The budget is counted in cost units, not bytes: every single-entity
/// entry is inserted at cost 1 and every id-list entry at cost 0, so
/// `max_entries` is effectively "number of cached single entities".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Eviction budget in cost units
    pub max_entries: usize,
    /// Whether to count hits and misses
    pub track_stats: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            track_stats: true,
        }
    }
}

impl CacheConfig {
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn without_stats(mut self) -> Self {
        self.track_stats = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 10_000);
        assert!(config.track_stats);
    }

    #[test]
    fn test_setters() {
        let config = CacheConfig::default().with_max_entries(64).without_stats();
        assert_eq!(config.max_entries, 64);
        assert!(!config.track_stats);
    }
}
