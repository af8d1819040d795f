use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

/// Bounded cache evicting in insertion order.
///
/// Reads do not refresh an entry, and replacing an existing key keeps its
/// original place in the eviction order. Keys live in a `BTreeMap` for stable
/// traversal.
#[derive(Debug, Clone)]
pub struct FifoCache<K, V> {
    capacity: usize,
    entries: BTreeMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Ord + Clone + std::fmt::Debug, V> FifoCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: BTreeMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Inserts `value`, returning the keys evicted to stay within capacity.
    pub fn insert(&mut self, key: K, value: V) -> Vec<K> {
        if self.entries.insert(key.clone(), value).is_some() {
            return Vec::new();
        }
        self.order.push_back(key);

        let mut evicted = Vec::new();
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            debug!(key = ?oldest, "evicted cache entry");
            evicted.push(oldest);
        }
        evicted
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    /// Keys from oldest to newest.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
