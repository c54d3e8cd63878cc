use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use super::key::QueryKey;

const DEFAULT_STALE_AFTER_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    /// No value yet, first fetch in flight
    Loading,
    Success,
    /// Last fetch failed; not retried until invalidated
    Error(String),
}

#[derive(Debug, Clone)]
pub struct QueryEntry<V> {
    pub value: Option<V>,
    pub status: QueryStatus,
    pub updated_at: Option<DateTime<Utc>>,
    /// Marked by invalidation; the next read refetches
    pub stale: bool,
    pub is_fetching: bool,
    generation: u64,
}

impl<V> QueryEntry<V> {
    fn pending() -> Self {
        Self {
            value: None,
            status: QueryStatus::Loading,
            updated_at: None,
            stale: false,
            is_fetching: false,
            generation: 0,
        }
    }
}

/// Permission to run one fetch for `key`; hand it back to [`QueryCache::settle`]
#[derive(Debug)]
#[must_use = "a started fetch must be settled"]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

#[derive(Debug)]
pub enum FetchDecision {
    /// Caller runs the fetch
    Start(FetchTicket),
    /// Another caller is already fetching this key
    InFlight,
    /// Cached result is current
    Settled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query key '{0}' addresses a whole scope and cannot hold data")]
    ReservedKey(QueryKey),
}

pub type SubscriptionId = u64;
type Listener = Arc<dyn Fn(&QueryKey) + Send + Sync>;

struct CacheState<V> {
    entries: HashMap<QueryKey, QueryEntry<V>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

/// Keyed store of fetched values with explicit fetch/settle/invalidate steps.
///
/// The cache does no I/O. Callers ask [`begin_fetch`](Self::begin_fetch)
/// whether to fetch, run the fetch themselves and report the result through
/// [`settle`](Self::settle). Listeners are told about every change after the
/// internal lock is released, so they may read the cache again.
pub struct QueryCache<V> {
    state: Arc<Mutex<CacheState<V>>>,
    stale_after: Duration,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            stale_after: self.stale_after,
        }
    }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        Self::with_stale_after(Duration::minutes(DEFAULT_STALE_AFTER_MINUTES))
    }

    pub fn with_stale_after(stale_after: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                listeners: Vec::new(),
                next_subscription: 1,
            })),
            stale_after,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn entry(&self, key: &QueryKey) -> Option<QueryEntry<V>> {
        self.lock().entries.get(key).cloned()
    }

    pub fn value(&self, key: &QueryKey) -> Option<V> {
        self.lock().entries.get(key).and_then(|e| e.value.clone())
    }

    pub fn begin_fetch(&self, key: &QueryKey) -> Result<FetchDecision, QueryError> {
        self.begin_fetch_at(key, Utc::now())
    }

    fn begin_fetch_at(
        &self,
        key: &QueryKey,
        now: DateTime<Utc>,
    ) -> Result<FetchDecision, QueryError> {
        if key.is_all() {
            return Err(QueryError::ReservedKey(key.clone()));
        }

        let decision = {
            let mut state = self.lock();
            let entry = state
                .entries
                .entry(key.clone())
                .or_insert_with(QueryEntry::pending);

            if entry.is_fetching {
                FetchDecision::InFlight
            } else if entry.value.is_none() && entry.status == QueryStatus::Loading
                || entry.stale
                || self.expired(entry, now)
            {
                entry.is_fetching = true;
                if entry.value.is_none() {
                    entry.status = QueryStatus::Loading;
                }
                FetchDecision::Start(FetchTicket {
                    key: key.clone(),
                    generation: entry.generation,
                })
            } else {
                FetchDecision::Settled
            }
        };

        if matches!(decision, FetchDecision::Start(_)) {
            self.notify(key);
        }
        Ok(decision)
    }

    fn expired(&self, entry: &QueryEntry<V>, now: DateTime<Utc>) -> bool {
        entry.status == QueryStatus::Success
            && entry
                .updated_at
                .map_or(true, |at| now - at >= self.stale_after)
    }

    /// Record the outcome of a started fetch.
    ///
    /// A result whose fetch began before the latest invalidation is stored,
    /// but the entry stays stale so the next read fetches again.
    pub fn settle(&self, ticket: FetchTicket, result: Result<V, String>) {
        {
            let mut state = self.lock();
            let entry = state
                .entries
                .entry(ticket.key.clone())
                .or_insert_with(QueryEntry::pending);

            entry.is_fetching = false;
            entry.stale = ticket.generation != entry.generation;
            match result {
                Ok(value) => {
                    entry.value = Some(value);
                    entry.status = QueryStatus::Success;
                    entry.updated_at = Some(Utc::now());
                }
                Err(message) => {
                    entry.status = QueryStatus::Error(message);
                }
            }
        }
        self.notify(&ticket.key);
    }

    /// Mark `key` stale. For a scope-wide key every entry of the scope is marked.
    ///
    /// Returns the number of entries affected.
    pub fn invalidate(&self, key: &QueryKey) -> usize {
        let touched: Vec<QueryKey> = {
            let mut state = self.lock();
            state
                .entries
                .iter_mut()
                .filter(|(k, _)| k.starts_with(key))
                .map(|(k, entry)| {
                    entry.generation += 1;
                    entry.stale = true;
                    k.clone()
                })
                .collect()
        };

        for k in &touched {
            self.notify(k);
        }
        touched.len()
    }

    pub fn subscribe(&self, listener: Arc<dyn Fn(&QueryKey) + Send + Sync>) -> SubscriptionId {
        let mut state = self.lock();
        let id = state.next_subscription;
        state.next_subscription += 1;
        state.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.lock();
        let before = state.listeners.len();
        state.listeners.retain(|(sid, _)| *sid != id);
        state.listeners.len() != before
    }

    fn notify(&self, key: &QueryKey) {
        let listeners: Vec<Listener> = self
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(project: &str) -> QueryKey {
        QueryKey::for_project("features", project)
    }

    fn start(cache: &QueryCache<u32>, k: &QueryKey) -> FetchTicket {
        match cache.begin_fetch(k).unwrap() {
            FetchDecision::Start(ticket) => ticket,
            other => panic!("expected Start, got {:?}", other),
        }
    }

    #[test]
    fn test_first_read_starts_fetch_and_second_waits() {
        let cache = QueryCache::<u32>::new();
        let ticket = start(&cache, &key("a"));
        assert!(matches!(
            cache.begin_fetch(&key("a")).unwrap(),
            FetchDecision::InFlight
        ));

        cache.settle(ticket, Ok(7));
        assert!(matches!(
            cache.begin_fetch(&key("a")).unwrap(),
            FetchDecision::Settled
        ));
        assert_eq!(cache.value(&key("a")), Some(7));
    }

    #[test]
    fn test_all_key_never_holds_data() {
        let cache = QueryCache::<u32>::new();
        let err = cache.begin_fetch(&QueryKey::all("features")).unwrap_err();
        assert_eq!(err, QueryError::ReservedKey(QueryKey::all("features")));
        assert!(cache.entry(&QueryKey::all("features")).is_none());
    }

    #[test]
    fn test_invalidation_forces_refetch() {
        let cache = QueryCache::<u32>::new();
        let ticket = start(&cache, &key("a"));
        cache.settle(ticket, Ok(1));

        assert_eq!(cache.invalidate(&key("a")), 1);
        let entry = cache.entry(&key("a")).unwrap();
        assert!(entry.stale);
        // stale value is still served while the refetch runs
        assert_eq!(entry.value, Some(1));

        let ticket = start(&cache, &key("a"));
        cache.settle(ticket, Ok(2));
        assert_eq!(cache.value(&key("a")), Some(2));
        assert!(!cache.entry(&key("a")).unwrap().stale);
    }

    #[test]
    fn test_invalidating_one_project_leaves_another_cached() {
        let cache = QueryCache::<u32>::new();
        let a = start(&cache, &key("a"));
        cache.settle(a, Ok(1));
        let b = start(&cache, &key("b"));
        cache.settle(b, Ok(2));

        cache.invalidate(&key("b"));

        assert!(!cache.entry(&key("a")).unwrap().stale);
        assert!(matches!(
            cache.begin_fetch(&key("a")).unwrap(),
            FetchDecision::Settled
        ));
        assert!(matches!(
            cache.begin_fetch(&key("b")).unwrap(),
            FetchDecision::Start(_)
        ));
    }

    #[test]
    fn test_scope_invalidation_marks_every_project() {
        let cache = QueryCache::<u32>::new();
        for p in ["a", "b"] {
            let t = start(&cache, &key(p));
            cache.settle(t, Ok(0));
        }
        let other = QueryKey::for_project("projects", "a");
        let t = start(&cache, &other);
        cache.settle(t, Ok(0));

        assert_eq!(cache.invalidate(&QueryKey::all("features")), 2);
        assert!(!cache.entry(&other).unwrap().stale);
    }

    #[test]
    fn test_result_of_fetch_started_before_invalidation_stays_stale() {
        let cache = QueryCache::<u32>::new();
        let first = start(&cache, &key("a"));
        cache.invalidate(&key("a"));
        cache.settle(first, Ok(1));

        let entry = cache.entry(&key("a")).unwrap();
        assert_eq!(entry.value, Some(1));
        assert!(entry.stale);
    }

    #[test]
    fn test_error_is_not_retried_until_invalidated() {
        let cache = QueryCache::<u32>::new();
        let ticket = start(&cache, &key("a"));
        cache.settle(ticket, Err("offline".to_string()));

        assert_eq!(
            cache.entry(&key("a")).unwrap().status,
            QueryStatus::Error("offline".to_string())
        );
        assert!(matches!(
            cache.begin_fetch(&key("a")).unwrap(),
            FetchDecision::Settled
        ));

        cache.invalidate(&key("a"));
        assert!(matches!(
            cache.begin_fetch(&key("a")).unwrap(),
            FetchDecision::Start(_)
        ));
    }

    #[test]
    fn test_expired_entry_is_refetched() {
        let cache = QueryCache::<u32>::with_stale_after(Duration::minutes(1));
        let ticket = start(&cache, &key("a"));
        cache.settle(ticket, Ok(1));

        let later = Utc::now() + Duration::minutes(2);
        assert!(matches!(
            cache.begin_fetch_at(&key("a"), later).unwrap(),
            FetchDecision::Start(_)
        ));
    }

    #[test]
    fn test_listeners_are_notified_and_can_unsubscribe() {
        let cache = QueryCache::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let reader = cache.clone();
        let id = cache.subscribe(Arc::new(move |k: &QueryKey| {
            // reading back from inside a listener must not deadlock
            let _ = reader.entry(k);
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        let ticket = start(&cache, &key("a"));
        cache.settle(ticket, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert!(cache.unsubscribe(id));
        cache.invalidate(&key("a"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
