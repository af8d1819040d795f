use std::collections::BTreeMap;

use crate::request::Request;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FetchPriority {
    Active,
    Prefetch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCommand<K> {
    pub request: Request,
    pub key: K,
    pub priority: FetchPriority,
}

/// Outstanding fetches ordered by `(priority, request)`.
#[derive(Debug, Clone)]
pub struct FetchQueue<K> {
    items: BTreeMap<(FetchPriority, Request), K>,
    index: BTreeMap<Request, FetchPriority>,
}

impl<K> Default for FetchQueue<K> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            index: BTreeMap::new(),
        }
    }
}

impl<K: PartialEq> FetchQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, priority: FetchPriority, request: Request, key: K) {
        self.cancel(request);
        self.items.insert((priority, request), key);
        self.index.insert(request, priority);
    }

    /// Returns `true` if the request was still queued.
    pub fn cancel(&mut self, request: Request) -> bool {
        match self.index.remove(&request) {
            Some(priority) => self.items.remove(&(priority, request)).is_some(),
            None => false,
        }
    }

    pub fn pop(&mut self) -> Option<FetchCommand<K>> {
        let ((priority, request), key) = self.items.pop_first()?;
        self.index.remove(&request);
        Some(FetchCommand {
            request,
            key,
            priority,
        })
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.items.values().any(|k| k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchPriority, FetchQueue};
    use crate::request::Request;

    #[test]
    fn active_fetches_pop_before_prefetches() {
        let mut q = FetchQueue::new();
        q.push(FetchPriority::Prefetch, Request(1), 1901);
        q.push(FetchPriority::Prefetch, Request(2), 1899);
        q.push(FetchPriority::Active, Request(3), 1900);

        let order: Vec<_> = std::iter::from_fn(|| q.pop()).map(|c| c.key).collect();
        assert_eq!(order, vec![1900, 1901, 1899]);
    }

    #[test]
    fn cancellation_keeps_remaining_order() {
        let mut q = FetchQueue::new();
        for (i, key) in ["a", "b", "c"].into_iter().enumerate() {
            q.push(FetchPriority::Prefetch, Request(i as u64), key);
        }
        assert!(q.cancel(Request(1)));
        assert!(!q.cancel(Request(1)));
        assert!(!q.contains_key(&"b"));
        assert_eq!(q.pop().map(|c| c.key), Some("a"));
        assert_eq!(q.pop().map(|c| c.key), Some("c"));
        assert!(q.is_empty());
    }
}
