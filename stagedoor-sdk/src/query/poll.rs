//! Interval refetching: a stand-in for a push channel.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::watch;

use super::cache::{QueryCache, QueryResult};
use super::key::QueryKey;
use crate::cross_log;
use crate::errors::Result;
use crate::util::{MaybeSend, sleep, spawn};

/// Handle on a background polling loop.
///
/// Polling **starts immediately** at construction and runs until the handle is dropped
/// (or [`PollHandle::stop`] is called), so tie it to the lifetime of the view that shows the
/// polled data.
#[derive(Debug)]
#[must_use = "polling stops as soon as the handle is dropped"]
pub struct PollHandle {
    abort: AbortHandle,
}

impl PollHandle {
    /// Run `tick` now and then every `interval` until the handle is dropped.
    pub fn spawn<F, Fut>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + MaybeSend + 'static,
        Fut: Future<Output = ()> + MaybeSend + 'static,
    {
        let (abort, registration) = AbortHandle::new_pair();
        let fut = async move {
            loop {
                tick().await;
                sleep(interval).await;
            }
        };
        spawn(Abortable::new(fut, registration).map(|_| ()));
        Self { abort }
    }

    pub fn stop(self) {}

    pub fn is_running(&self) -> bool {
        !self.abort.is_aborted()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// A polled query: the latest result plus the loop keeping it current.
#[derive(Debug)]
pub struct Polled<T> {
    rx: watch::Receiver<Option<QueryResult<T>>>,
    handle: PollHandle,
}

impl<T> Polled<T> {
    /// Latest result, `None` until the first tick completes.
    pub fn latest(&self) -> Option<QueryResult<T>> {
        self.rx.borrow().clone()
    }

    /// Wait for the next result. `None` once polling has stopped.
    pub async fn next(&mut self) -> Option<QueryResult<T>> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }

    pub fn handle(&self) -> &PollHandle {
        &self.handle
    }

    pub fn stop(self) {}
}

impl QueryCache {
    /// Refetch `key` every `interval`, regardless of freshness, publishing each result.
    ///
    /// Results also land in the cache, so other readers of `key` see them.
    pub fn poll<T, F, Fut>(&self, key: QueryKey, interval: Duration, fetcher: F) -> Polled<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + MaybeSend + 'static,
        Fut: Future<Output = Result<T>> + MaybeSend + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let tx = Arc::new(tx);
        let cache = self.clone();

        let handle = PollHandle::spawn(interval, move || {
            let request = fetcher();
            let cache = cache.clone();
            let key = key.clone();
            let tx = Arc::clone(&tx);
            async move {
                let result = cache.refetch(&key, || request).await;
                if let Err(e) = &result {
                    cross_log!(debug, "Polling {} failed: {}", key, e);
                }
                tx.send_replace(Some(result));
            }
        });
        Polled { rx, handle }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::errors::Error;

    #[tokio::test(start_paused = true)]
    async fn polls_until_dropped() {
        let cache = QueryCache::new(Duration::from_secs(60), Duration::from_secs(300));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut polled = cache.poll(QueryKey::new("notifications/unread"), Duration::from_secs(30), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) as u64;
            async move { Ok::<_, Error>(n) }
        });

        assert_eq!(*polled.next().await.unwrap().unwrap(), 0);
        assert_eq!(*polled.next().await.unwrap().unwrap(), 1);
        assert_eq!(*polled.next().await.unwrap().unwrap(), 2);
        assert_eq!(
            *cache.peek::<u64>(&QueryKey::new("notifications/unread")).unwrap(),
            2
        );

        polled.stop();
        let seen = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(calls.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_cache_does_not_suppress_polling() {
        let cache = QueryCache::new(Duration::from_secs(3600), Duration::from_secs(3600));
        let key = QueryKey::new("messages/thread").with("conversation", 5);
        cache.fetch(&key, || async { Ok::<_, Error>(100u64) }).await.unwrap();

        let mut polled = cache.poll(key.clone(), Duration::from_secs(5), || async {
            Ok::<_, Error>(7u64)
        });
        assert_eq!(*polled.next().await.unwrap().unwrap(), 7);
        assert_eq!(*cache.peek::<u64>(&key).unwrap(), 7);
    }
}
