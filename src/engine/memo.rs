//! Lazily filled result caches, one per metric family.
//!
//! Rollups re-ask for the same lower-level figures many times (a portfolio
//! month walks every category, every category walks its assets, and every
//! profitability looks one period back). A `Memo` stores each figure under
//! its argument tuple the first time it is computed. Entries are never
//! invalidated: the ledger snapshot cannot change while an engine lives.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct Memo<K, V> {
    enabled: bool,
    entries: RefCell<HashMap<K, V>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    /// Failed computations are not cached.
    ///
    /// `compute` may recurse into this same memo; no borrow is held while it
    /// runs.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if !self.enabled {
            return compute();
        }

        let cached = self.entries.borrow().get(&key).cloned();
        if let Some(value) = cached {
            self.hits.set(self.hits.get() + 1);
            return Ok(value);
        }

        self.misses.set(self.misses.get() + 1);
        let value = compute()?;
        self.entries.borrow_mut().insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.get(),
            misses: self.misses.get(),
        }
    }
}

/// Hit/miss counters of one or more memos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl std::ops::Add for CacheStats {
    type Output = CacheStats;

    fn add(self, other: CacheStats) -> CacheStats {
        CacheStats {
            entries: self.entries + other.entries,
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
        }
    }
}
