//! Memoized derivations over immutable state snapshots
//!
//! A [`Selector`] wraps a pure function `(&S, &K) -> V` and caches its
//! results per snapshot. The cache is keyed on the *identity* of the
//! `Arc<S>` it was computed from: calling [`Selector::select`] again with the
//! same snapshot and argument returns the very same `Arc<V>`, so consumers can
//! detect "nothing changed" with [`Arc::ptr_eq`] instead of a deep compare.
//! Handing the selector a different snapshot drops every cached entry.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tidyboard_core::selector::Selector;
//!
//! let evens = Selector::new(|numbers: &Vec<u32>, limit: &u32| {
//!     numbers.iter().copied().filter(|n| n % 2 == 0 && n <= limit).collect::<Vec<_>>()
//! });
//!
//! let snapshot = Arc::new(vec![1, 2, 3, 4, 5, 6]);
//! let first = evens.select(&snapshot, &4);
//! let second = evens.select(&snapshot, &4);
//! assert_eq!(*first, vec![2, 4]);
//! assert!(Arc::ptr_eq(&first, &second));
//!
//! let next = Arc::new(vec![2, 4]);
//! let third = evens.select(&next, &4);
//! assert!(!Arc::ptr_eq(&first, &third));
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Type alias for the derivation function a selector memoizes
type Derive<S, K, V> = Box<dyn Fn(&S, &K) -> V + Send + Sync>;

/// A memoized, snapshot-keyed selector
pub struct Selector<S, K, V> {
    derive: Derive<S, K, V>,
    cache: Mutex<SelectorCache<S, K, V>>,
}

struct SelectorCache<S, K, V> {
    /// Snapshot the entries were computed from.
    ///
    /// Holding a `Weak` keeps the allocation (not the value) alive, so the
    /// address cannot be reused by a later snapshot while we compare against it.
    source: Weak<S>,
    entries: HashMap<K, Arc<V>>,
    hits: u64,
    misses: u64,
}

/// Cache counters, mostly useful in tests and debug logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectorStats {
    /// Calls answered from the cache
    pub hits: u64,
    /// Calls that ran the derivation
    pub misses: u64,
    /// Entries currently cached for the tracked snapshot
    pub cached: usize,
}

impl<S, K, V> Selector<S, K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a selector around a pure derivation function
    #[must_use]
    pub fn new<F>(derive: F) -> Self
    where
        F: Fn(&S, &K) -> V + Send + Sync + 'static,
    {
        Self {
            derive: Box::new(derive),
            cache: Mutex::new(SelectorCache {
                source: Weak::new(),
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Derive a value for `key` from `snapshot`, reusing the cached result
    /// when the snapshot is the one the cache was built from
    pub fn select(&self, snapshot: &Arc<S>, key: &K) -> Arc<V> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if !std::ptr::eq(cache.source.as_ptr(), Arc::as_ptr(snapshot)) {
            cache.source = Arc::downgrade(snapshot);
            cache.entries.clear();
        }

        if let Some(hit) = cache.entries.get(key).cloned() {
            cache.hits += 1;
            return hit;
        }

        let value = Arc::new((self.derive)(snapshot, key));
        cache.entries.insert(key.clone(), Arc::clone(&value));
        cache.misses += 1;
        value
    }

    /// Drop all cached entries
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.source = Weak::new();
        cache.entries.clear();
    }

    /// Current cache counters
    #[must_use]
    pub fn stats(&self) -> SelectorStats {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        SelectorStats {
            hits: cache.hits,
            misses: cache.misses,
            cached: cache.entries.len(),
        }
    }
}

impl<S, K, V> std::fmt::Debug for Selector<S, K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_selector(calls: Arc<AtomicUsize>) -> Selector<Vec<u32>, usize, u32> {
        Selector::new(move |values: &Vec<u32>, index: &usize| {
            calls.fetch_add(1, Ordering::SeqCst);
            values.get(*index).copied().unwrap_or_default()
        })
    }

    #[test]
    fn same_snapshot_same_key_hits_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let selector = counting_selector(Arc::clone(&calls));
        let snapshot = Arc::new(vec![10, 20, 30]);

        let a = selector.select(&snapshot, &1);
        let b = selector.select(&snapshot, &1);

        assert_eq!(*a, 20);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            selector.stats(),
            SelectorStats {
                hits: 1,
                misses: 1,
                cached: 1
            }
        );
    }

    #[test]
    fn new_snapshot_invalidates_entries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let selector = counting_selector(Arc::clone(&calls));

        let first = Arc::new(vec![1, 2]);
        let _ = selector.select(&first, &0);
        let _ = selector.select(&first, &1);

        // Equal contents, different identity
        let second = Arc::new(vec![1, 2]);
        let value = selector.select(&second, &0);

        assert_eq!(*value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(selector.stats().cached, 1);
    }

    #[test]
    fn cloned_arc_counts_as_same_snapshot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let selector = counting_selector(Arc::clone(&calls));
        let snapshot = Arc::new(vec![5]);
        let alias = Arc::clone(&snapshot);

        let _ = selector.select(&snapshot, &0);
        let _ = selector.select(&alias, &0);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let calls = Arc::new(AtomicUsize::new(0));
        let selector = counting_selector(Arc::clone(&calls));
        let snapshot = Arc::new(vec![5]);

        let _ = selector.select(&snapshot, &0);
        selector.invalidate();
        let _ = selector.select(&snapshot, &0);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    proptest! {
        #[test]
        fn cached_value_matches_direct_derivation(
            values in proptest::collection::vec(any::<u32>(), 0..16),
            keys in proptest::collection::vec(0usize..20, 1..32),
        ) {
            let selector = counting_selector(Arc::new(AtomicUsize::new(0)));
            let snapshot = Arc::new(values.clone());
            for key in keys {
                let expected = values.get(key).copied().unwrap_or_default();
                prop_assert_eq!(*selector.select(&snapshot, &key), expected);
            }
        }
    }
}
