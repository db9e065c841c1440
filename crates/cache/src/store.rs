//! In-memory cache store with cost-budgeted LRU eviction
//!
//! Entries carry a cost weight: single entities cost 1, id lists cost 0.
//! Only cost-bearing entries participate in eviction, so id lists are
//! never evicted to make room. Values are shared `Any` handles, letting
//! the entity layer hand out typed references that stay live across
//! in-place updates.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::config::CacheConfig;

/// Shared, type-erased cache value
pub type StoredValue = Arc<dyn Any + Send + Sync>;

struct StoreEntry {
    value: StoredValue,
    cost: usize,
}

/// Hit/miss counters and current occupancy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_keys: u64,
    /// Sum of entry costs currently held
    pub cost: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

/// Concurrent in-memory store. Individual operations are safe to call
/// from any thread; multi-step sequences built on top of it are not
/// atomic (see the entity layer for the invariants it maintains anyway).
pub struct MemoryStore {
    entries: DashMap<String, StoreEntry>,
    /// Most recently used at the front; cost-bearing keys only
    lru: Mutex<VecDeque<String>>,
    config: CacheConfig,
    stats: Mutex<CacheStats>,
}

impl MemoryStore {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            lru: Mutex::new(VecDeque::new()),
            config,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    fn current_cost(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().cost).sum()
    }

    fn touch(&self, key: &str) {
        let mut lru = self.lru.lock();
        if let Some(position) = lru.iter().position(|k| k == key) {
            lru.remove(position);
        }
        lru.push_front(key.to_string());
    }

    fn forget_lru(&self, key: &str) {
        let mut lru = self.lru.lock();
        if let Some(position) = lru.iter().position(|k| k == key) {
            lru.remove(position);
        }
    }

    /// Evict least-recently-used cost-bearing entries until `headroom`
    /// more cost units fit in the budget.
    fn evict_for(&self, headroom: usize) {
        while self.current_cost() + headroom > self.config.max_entries {
            let victim = self.lru.lock().back().cloned();
            match victim {
                Some(key) => {
                    tracing::debug!(key = key.as_str(), "evicting cache entry");
                    self.entries.remove(&key);
                    self.forget_lru(&key);
                }
                None => break,
            }
        }
    }

    /// Insert or replace an entry at the given cost
    pub fn insert(&self, key: &str, value: StoredValue, cost: usize) {
        if cost > 0 {
            self.evict_for(cost);
            self.touch(key);
        }
        self.entries.insert(key.to_string(), StoreEntry { value, cost });
    }

    /// Fetch an entry, refreshing its recency
    pub fn get(&self, key: &str) -> Option<StoredValue> {
        match self.entries.get(key) {
            Some(entry) => {
                // the shard guard must drop before any other lock is taken:
                // stats() holds the stats lock while walking the shards, so
                // calling record() under the guard can deadlock
                let value = entry.value.clone();
                let cost = entry.cost;
                drop(entry);
                if cost > 0 {
                    self.touch(key);
                }
                self.record(true);
                Some(value)
            }
            None => {
                self.record(false);
                None
            }
        }
    }

    /// Fetch and downcast in one step
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.get(key).and_then(|value| value.downcast::<T>().ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove an entry, reporting whether it existed
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.forget_lru(key);
        }
        removed
    }

    /// Drop every entry and reset recency; counters survive
    pub fn flush(&self) {
        self.entries.clear();
        self.lru.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        // read the shards before taking the stats lock, never under it
        let total_keys = self.entries.len() as u64;
        let cost = self.current_cost() as u64;
        let counters = self.stats.lock();
        CacheStats {
            hits: counters.hits,
            misses: counters.misses,
            total_keys,
            cost,
        }
    }

    fn record(&self, hit: bool) {
        if !self.config.track_stats {
            return;
        }
        let mut stats = self.stats.lock();
        if hit {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
    }
}
