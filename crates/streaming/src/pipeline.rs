use std::collections::BTreeMap;
use std::sync::Arc;

use foundation::time::Time;
use runtime::timer::Debounce;
use tracing::{debug, warn};

use crate::cache::FifoCache;
use crate::queue::{FetchCommand, FetchPriority, FetchQueue};
use crate::request::{Request, RequestIds, RequestSlot};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PipelineConfig {
    pub capacity: usize,
    pub debounce_s: f64,
    pub prefetch_delay_s: f64,
}

impl PipelineConfig {
    /// Conflicts keyed by year.
    pub const YEARS: Self = Self {
        capacity: 50,
        debounce_s: 0.3,
        prefetch_delay_s: 1.0,
    };

    /// Frontline snapshots keyed by conflict and date.
    pub const FRONTLINES: Self = Self {
        capacity: 100,
        debounce_s: 0.0,
        prefetch_delay_s: 0.6,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Network(String),
    Status(u16),
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(reason) => write!(f, "network error: {reason}"),
            FetchError::Status(code) => write!(f, "unexpected HTTP status {code}"),
            FetchError::Decode(reason) => write!(f, "decode error: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion<K, V> {
    /// Result of the current selection; the render state should take it.
    Delivered(K, Arc<V>),
    /// A prefetch landed in the cache.
    Cached(K),
    /// Completion for a cancelled or superseded request; ignored.
    Stale,
    Failed(FetchError),
}

#[derive(Debug, Clone)]
struct InFlight<K> {
    key: K,
    priority: FetchPriority,
}

/// Selection-driven fetch pipeline: cache lookup, debounce, one active
/// request, delayed prefetch of neighbours.
///
/// Nothing here performs I/O. The host drains [`Pipeline::next_fetch`],
/// performs the fetches and reports back through [`Pipeline::complete`].
#[derive(Debug)]
pub struct Pipeline<K, V> {
    config: PipelineConfig,
    cache: FifoCache<K, Arc<V>>,
    ids: RequestIds,
    active: RequestSlot,
    queue: FetchQueue<K>,
    in_flight: BTreeMap<Request, InFlight<K>>,
    debounce: Debounce<K>,
    prefetch: Debounce<Vec<K>>,
    selected: Option<K>,
    load_state: LoadState,
}

impl<K, V> Pipeline<K, V>
where
    K: Ord + Clone + std::fmt::Debug,
{
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            cache: FifoCache::new(config.capacity),
            ids: RequestIds::default(),
            active: RequestSlot::new(),
            queue: FetchQueue::new(),
            in_flight: BTreeMap::new(),
            debounce: Debounce::new(config.debounce_s),
            prefetch: Debounce::new(config.prefetch_delay_s),
            selected: None,
            load_state: LoadState::Idle,
        }
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    pub fn cache(&self) -> &FifoCache<K, Arc<V>> {
        &self.cache
    }

    pub fn selected(&self) -> Option<&K> {
        self.selected.as_ref()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Selects `key`. A cached value comes back immediately; otherwise the
    /// fetch is debounced. Either way every outstanding fetch and timer is
    /// cancelled and `adjacent` is scheduled for prefetch.
    pub fn select(&mut self, key: K, adjacent: Vec<K>, now: Time) -> Option<Arc<V>> {
        self.cancel_all();
        self.selected = Some(key.clone());
        self.prefetch.schedule(now, adjacent);

        if let Some(value) = self.cache.get(&key).cloned() {
            debug!(?key, "selection served from cache");
            self.load_state = LoadState::Ready;
            return Some(value);
        }

        self.load_state = LoadState::Loading;
        if self.config.debounce_s <= 0.0 {
            self.start_active(key);
        } else {
            self.debounce.schedule(now, key);
        }
        None
    }

    /// Fires due timers. Returns a value when the debounced selection turned
    /// out to be cached by the time its timer fired.
    pub fn poll(&mut self, now: Time) -> Option<(K, Arc<V>)> {
        let mut delivered = None;
        if let Some(key) = self.debounce.poll(now) {
            if let Some(value) = self.cache.get(&key).cloned() {
                self.load_state = LoadState::Ready;
                delivered = Some((key, value));
            } else {
                self.start_active(key);
            }
        }

        if let Some(keys) = self.prefetch.poll(now) {
            for key in keys {
                if self.cache.contains(&key) || self.is_in_flight(&key) {
                    continue;
                }
                let request = self.ids.issue();
                self.queue.push(FetchPriority::Prefetch, request, key.clone());
                self.in_flight.insert(
                    request,
                    InFlight {
                        key,
                        priority: FetchPriority::Prefetch,
                    },
                );
            }
        }
        delivered
    }

    /// Next fetch the host should perform, active before prefetch.
    pub fn next_fetch(&mut self) -> Option<FetchCommand<K>> {
        self.queue.pop()
    }

    /// Accepts the outcome of a fetch. `transform` turns the raw payload into
    /// the cached, render-ready value.
    pub fn complete<R>(
        &mut self,
        request: Request,
        result: Result<R, FetchError>,
        transform: impl FnOnce(&K, R) -> Result<V, FetchError>,
    ) -> Completion<K, V> {
        let Some(flight) = self.in_flight.remove(&request) else {
            debug!(?request, "ignoring stale completion");
            return Completion::Stale;
        };
        self.queue.cancel(request);
        let is_active = self.active.finish(request);

        match result.and_then(|raw| transform(&flight.key, raw)) {
            Err(error) => {
                warn!(key = ?flight.key, priority = ?flight.priority, %error, "fetch failed");
                if is_active {
                    self.load_state = LoadState::Failed(error.to_string());
                }
                Completion::Failed(error)
            }
            Ok(value) => {
                let value = Arc::new(value);
                self.cache.insert(flight.key.clone(), value.clone());
                if is_active {
                    self.load_state = LoadState::Ready;
                    Completion::Delivered(flight.key, value)
                } else {
                    Completion::Cached(flight.key)
                }
            }
        }
    }

    /// Drops every timer and outstanding request.
    pub fn cancel_all(&mut self) {
        self.debounce.cancel();
        self.prefetch.cancel();
        self.active.cancel();
        for request in std::mem::take(&mut self.in_flight).into_keys() {
            self.queue.cancel(request);
        }
    }

    fn is_in_flight(&self, key: &K) -> bool {
        self.in_flight.values().any(|f| &f.key == key)
    }

    fn start_active(&mut self, key: K) {
        let request = self.ids.issue();
        self.queue.push(FetchPriority::Active, request, key.clone());
        self.in_flight.insert(
            request,
            InFlight {
                key,
                priority: FetchPriority::Active,
            },
        );
        self.active.begin(request);
    }
}
