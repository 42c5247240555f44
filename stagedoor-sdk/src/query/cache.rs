//! Keyed cache of server state with in-flight request sharing.
//!
//! Storage, idle expiry and request coalescing are moka's. This module only adds what a
//! query cache needs on top: the stale window, invalidation generations and observers.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::Expiry;
use moka::ops::compute::Op;
use web_time::Instant;

use super::key::QueryKey;
use crate::cross_log;
use crate::errors::{CacheError, Error, Result};
use crate::util::MaybeSend;

type AnyData = Arc<dyn Any + Send + Sync>;

/// Result of a cached read. Errors are shared between every caller of one fetch.
pub type QueryResult<T> = std::result::Result<Arc<T>, Arc<Error>>;

/// What a view renders for one key.
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    /// Last successful result, possibly stale.
    pub data: Option<Arc<T>>,
    /// Error of the last fetch, if it failed.
    pub error: Option<Arc<Error>>,
    /// A fetch is running and nothing has been loaded yet.
    pub is_loading: bool,
    /// A fetch is running.
    pub is_fetching: bool,
    /// The next read will refetch.
    pub is_stale: bool,
}

impl<T> Default for QuerySnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_fetching: false,
            is_stale: true,
        }
    }
}

/// Per-key state stored in moka.
#[derive(Clone, Default)]
struct Slot {
    data: Option<AnyData>,
    error: Option<Arc<Error>>,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Bumped by every invalidation; a fetch started under an older generation is not stored.
    generation: u64,
    fetching: bool,
    observers: usize,
}

impl Slot {
    fn is_fresh(&self, now: Instant, stale_time: Duration) -> bool {
        !self.invalidated
            && self.data.is_some()
            && self
                .updated_at
                .is_some_and(|at| now.saturating_duration_since(at) < stale_time)
    }

    fn is_fresh_now(&self, stale_time: Duration) -> bool {
        self.is_fresh(Instant::now(), stale_time)
    }
}

/// Idle expiry for slots nobody observes and nobody is fetching.
struct IdleUnlessObserved {
    gc_time: Duration,
}

impl IdleUnlessObserved {
    fn ttl(&self, slot: &Slot) -> Option<Duration> {
        if slot.observers > 0 || slot.fetching {
            None
        } else {
            Some(self.gc_time)
        }
    }
}

impl Expiry<QueryKey, Slot> for IdleUnlessObserved {
    fn expire_after_create(
        &self,
        _key: &QueryKey,
        slot: &Slot,
        _created_at: std::time::Instant,
    ) -> Option<Duration> {
        self.ttl(slot)
    }

    fn expire_after_read(
        &self,
        _key: &QueryKey,
        slot: &Slot,
        _read_at: std::time::Instant,
        _duration_until_expiry: Option<Duration>,
        _last_modified_at: std::time::Instant,
    ) -> Option<Duration> {
        self.ttl(slot)
    }

    fn expire_after_update(
        &self,
        _key: &QueryKey,
        slot: &Slot,
        _updated_at: std::time::Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        self.ttl(slot)
    }
}

/// Shared query cache.
///
/// - One entry per [`QueryKey`]; keys carry every result-affecting parameter.
/// - At most one request per key is in flight; concurrent readers await the same one.
/// - Entries are fresh for `stale_time`. Invalidation marks them stale and the next read
///   refetches; nothing is patched in place.
/// - Entries nobody observes expire `gc_time` after their last use.
///
/// Cheap to clone; clones share the entries.
#[derive(Clone)]
pub struct QueryCache {
    slots: moka::sync::Cache<QueryKey, Slot>,
    /// Running requests, keyed by the generation they were started under.
    flights: moka::future::Cache<(QueryKey, u64), AnyData>,
    stale_time: Duration,
    gc_time: Duration,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .field("stale_time", &self.stale_time)
            .field("gc_time", &self.gc_time)
            .finish()
    }
}

impl QueryCache {
    pub fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            slots: moka::sync::Cache::builder()
                .expire_after(IdleUnlessObserved { gc_time })
                .build(),
            flights: moka::future::Cache::builder().build(),
            stale_time,
            gc_time,
        }
    }

    /// Atomically rewrite the slot of `key`. `None` from `f` leaves it untouched.
    fn update<F>(&self, key: &QueryKey, f: F)
    where
        F: FnOnce(Option<Slot>) -> Option<Slot>,
    {
        self.slots
            .entry(key.clone())
            .and_compute_with(|entry| match f(entry.map(|e| e.into_value())) {
                Some(slot) => Op::Put(slot),
                None => Op::Nop,
            });
    }

    /// Read `key`, fetching with `fetcher` unless a fresh value is cached.
    ///
    /// If a fetch for `key` is already running, its result is shared instead of starting a
    /// second request. `fetcher` is only called when a new request is needed.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> QueryResult<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + MaybeSend + 'static,
    {
        self.read(key, false, fetcher).await
    }

    /// Like [`Self::fetch`] but ignores freshness. Used by pollers.
    pub async fn refetch<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> QueryResult<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + MaybeSend + 'static,
    {
        self.read(key, true, fetcher).await
    }

    async fn read<T, F, Fut>(&self, key: &QueryKey, force: bool, fetcher: F) -> QueryResult<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + MaybeSend + 'static,
    {
        if !force {
            if let Some(slot) = self.slots.get(key) {
                if slot.is_fresh_now(self.stale_time) {
                    if let Some(data) = slot.data {
                        cross_log!(debug, "Query cache hit: {}", key);
                        return downcast(key, data);
                    }
                }
            }
        }

        let mut generation = 0;
        self.update(key, |slot| {
            let mut slot = slot.unwrap_or_default();
            slot.fetching = true;
            generation = slot.generation;
            Some(slot)
        });

        let flight = (key.clone(), generation);
        let mut started = false;
        let output = self
            .flights
            .try_get_with(flight.clone(), async {
                started = true;
                cross_log!(debug, "Fetching query: {}", key);
                fetcher().await.map(|value| Arc::new(value) as AnyData)
            })
            .await;
        if !started {
            cross_log!(debug, "Joined in-flight query: {}", key);
        }

        self.update(key, |slot| {
            let mut slot = slot?;
            if slot.generation != generation {
                cross_log!(debug, "Discarding result invalidated mid-flight: {}", key);
                return None;
            }
            slot.fetching = false;
            match &output {
                Ok(data) => {
                    slot.data = Some(Arc::clone(data));
                    slot.error = None;
                    slot.updated_at = Some(Instant::now());
                    slot.invalidated = false;
                }
                Err(e) => slot.error = Some(Arc::clone(e)),
            }
            Some(slot)
        });
        self.flights.invalidate(&flight).await;

        downcast(key, output?)
    }

    /// Cached value for `key`, fresh or not, without fetching.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let data = self.slots.get(key)?.data?;
        data.downcast::<T>().ok()
    }

    pub fn snapshot<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QuerySnapshot<T> {
        let Some(slot) = self.slots.get(key) else {
            return QuerySnapshot::default();
        };
        let is_stale = !slot.is_fresh_now(self.stale_time);
        let data = slot.data.and_then(|d| d.downcast::<T>().ok());
        QuerySnapshot {
            is_loading: slot.fetching && data.is_none(),
            is_fetching: slot.fetching,
            is_stale,
            error: slot.error,
            data,
        }
    }

    /// Mark every key under `prefix` stale. Returns how many entries were hit.
    ///
    /// Running fetches for those keys are detached: their callers still get a result, but it
    /// is not stored, and the next read starts a new request.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let hit = self.keys_under(prefix);
        for key in &hit {
            self.update(key, |slot| {
                let mut slot = slot?;
                slot.invalidated = true;
                slot.generation += 1;
                slot.fetching = false;
                Some(slot)
            });
            cross_log!(debug, "Invalidated query: {}", key);
        }
        hit.len()
    }

    /// Drop every key under `prefix`.
    pub fn remove(&self, prefix: &QueryKey) {
        for key in self.keys_under(prefix) {
            self.slots.invalidate(&key);
        }
    }

    /// Drop everything (sign-out, account switch). Running fetches are not stored.
    pub fn clear(&self) {
        self.slots.invalidate_all();
        self.flights.invalidate_all();
    }

    pub fn len(&self) -> usize {
        self.slots.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep `key` alive while the returned guard lives (a mounted view).
    pub fn observe(&self, key: &QueryKey) -> QueryObserver {
        self.update(key, |slot| {
            let mut slot = slot.unwrap_or_default();
            slot.observers += 1;
            Some(slot)
        });
        QueryObserver {
            cache: self.clone(),
            key: key.clone(),
        }
    }

    /// Evict expired entries now instead of during later cache use.
    pub fn gc(&self) {
        self.slots.run_pending_tasks();
    }

    fn keys_under(&self, prefix: &QueryKey) -> Vec<QueryKey> {
        self.slots
            .iter()
            .filter(|(key, _)| key.matches(prefix))
            .map(|(key, _)| QueryKey::clone(&key))
            .collect()
    }
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, data: AnyData) -> QueryResult<T> {
    data.downcast::<T>().map_err(|_| {
        Arc::new(Error::from(CacheError::TypeMismatch {
            key: key.to_string(),
        }))
    })
}

/// Marks a key as observed; dropping it starts the key's expiry countdown.
#[derive(Debug)]
#[must_use = "the key is only kept alive while the observer lives"]
pub struct QueryObserver {
    cache: QueryCache,
    key: QueryKey,
}

impl QueryObserver {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl Drop for QueryObserver {
    fn drop(&mut self) {
        self.cache.update(&self.key, |slot| {
            let mut slot = slot?;
            slot.observers = slot.observers.saturating_sub(1);
            Some(slot)
        });
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::oneshot;

    use super::*;
    use crate::errors::RequestError;

    fn cache() -> QueryCache {
        QueryCache::new(Duration::from_secs(60), Duration::from_secs(300))
    }

    fn counted(calls: &Arc<AtomicUsize>, value: u32) -> impl Future<Output = Result<u32>> + use<> {
        let calls = Arc::clone(calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(value)
        }
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_request() {
        let cache = cache();
        let key = QueryKey::new("projects").with("page", 1);
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.fetch(&key, || counted(&calls, 7)),
            cache.fetch(&key, || counted(&calls, 8)),
        );

        assert_eq!(*a.unwrap(), 7);
        assert_eq!(*b.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fresh_values_are_served_from_cache() {
        let cache = cache();
        let key = QueryKey::new("talent/profile");
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch(&key, || counted(&calls, 1)).await.unwrap();
        let again = cache.fetch(&key, || counted(&calls, 2)).await.unwrap();

        assert_eq!(*again, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!cache.snapshot::<u32>(&key).is_stale);
    }

    #[tokio::test]
    async fn invalidation_forces_a_refetch() {
        let cache = cache();
        let key = QueryKey::new("applications").with("scope", "mine");
        let other = QueryKey::new("projects");
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch(&key, || counted(&calls, 1)).await.unwrap();
        cache.fetch(&other, || counted(&calls, 1)).await.unwrap();
        assert_eq!(cache.invalidate(&QueryKey::new("applications")), 1);
        assert!(cache.snapshot::<u32>(&key).is_stale);
        assert_eq!(*cache.peek::<u32>(&key).unwrap(), 1);

        let fresh = cache.fetch(&key, || counted(&calls, 2)).await.unwrap();
        assert_eq!(*fresh, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!cache.snapshot::<u32>(&other).is_stale);
    }

    #[tokio::test]
    async fn invalidation_during_flight_discards_the_result() {
        let cache = cache();
        let key = QueryKey::new("messages/conversations");
        let (release, gate) = oneshot::channel::<()>();

        let slow = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, || async move {
                        let _ = gate.await;
                        Ok::<_, Error>(1u32)
                    })
                    .await
            })
        };
        while !cache.snapshot::<u32>(&key).is_fetching {
            tokio::task::yield_now().await;
        }

        cache.invalidate(&key);
        release.send(()).unwrap();
        assert_eq!(*slow.await.unwrap().unwrap(), 1);

        assert!(cache.peek::<u32>(&key).is_none());
        let calls = Arc::new(AtomicUsize::new(0));
        let next = cache.fetch(&key, || counted(&calls, 2)).await.unwrap();
        assert_eq!(*next, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clearing_during_flight_drops_the_result() {
        let cache = cache();
        let key = QueryKey::new("talent/profile");
        let (release, gate) = oneshot::channel::<()>();

        let slow = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, || async move {
                        let _ = gate.await;
                        Ok::<_, Error>(11u32)
                    })
                    .await
            })
        };
        while !cache.snapshot::<u32>(&key).is_fetching {
            tokio::task::yield_now().await;
        }

        cache.clear();
        release.send(()).unwrap();
        assert_eq!(*slow.await.unwrap().unwrap(), 11);
        assert!(cache.peek::<u32>(&key).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn errors_are_shared_and_not_cached_as_data() {
        let cache = cache();
        let key = QueryKey::new("notifications/unread");

        let err = cache
            .fetch(&key, || async {
                Err::<u32, _>(Error::from(RequestError::NotFound {
                    message: "gone".into(),
                }))
            })
            .await
            .unwrap_err();
        assert_eq!(err.status().map(|s| s.as_u16()), Some(404));

        let snapshot = cache.snapshot::<u32>(&key);
        assert!(snapshot.error.is_some());
        assert!(snapshot.data.is_none());

        let calls = Arc::new(AtomicUsize::new(0));
        assert_eq!(*cache.fetch(&key, || counted(&calls, 5)).await.unwrap(), 5);
        assert!(cache.snapshot::<u32>(&key).error.is_none());
    }

    #[tokio::test]
    async fn type_mismatch_is_reported() {
        let cache = cache();
        let key = QueryKey::new("talent/skills");
        cache
            .fetch(&key, || async { Ok::<_, Error>(vec![1u8]) })
            .await
            .unwrap();
        let err = cache
            .fetch(&key, || async { Ok::<_, Error>(String::new()) })
            .await
            .unwrap_err();
        assert!(matches!(*err, Error::Cache(CacheError::TypeMismatch { .. })));
    }

    #[tokio::test]
    async fn unobserved_entries_are_collected() {
        let cache = QueryCache::new(Duration::from_secs(60), Duration::ZERO);
        let kept = QueryKey::new("kept");
        let dropped = QueryKey::new("dropped");

        let observer = cache.observe(&kept);
        cache.fetch(&kept, || async { Ok::<_, Error>(1u32) }).await.unwrap();
        cache.fetch(&dropped, || async { Ok::<_, Error>(1u32) }).await.unwrap();

        cache.gc();
        assert!(cache.peek::<u32>(&kept).is_some());
        assert!(cache.peek::<u32>(&dropped).is_none());
        assert_eq!(cache.len(), 1);

        drop(observer);
        cache.gc();
        assert!(cache.peek::<u32>(&kept).is_none());
        assert!(cache.is_empty());
    }
}
