use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use super::cache::QueryCache;
use super::key::QueryKey;
use crate::cross_log;
use crate::errors::Result;

/// Where a mutation is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    /// Human-readable message for a toast or inline banner.
    Failed(String),
}

impl MutationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationState::Pending)
    }
}

/// A write that declares which queries it makes stale.
///
/// On success every declared key (and everything under it) is invalidated before
/// [`Mutation::run`] returns, so the next read of a dependent view refetches. On failure
/// nothing is invalidated. The state never stays `Pending` once the call is over, even if the
/// caller drops the future midway.
#[derive(Debug, Clone)]
pub struct Mutation {
    cache: QueryCache,
    invalidates: Vec<QueryKey>,
    state: Arc<watch::Sender<MutationState>>,
}

impl Mutation {
    pub fn new(cache: QueryCache, invalidates: impl IntoIterator<Item = QueryKey>) -> Self {
        let (tx, _rx) = watch::channel(MutationState::Idle);
        Self {
            cache,
            invalidates: invalidates.into_iter().collect(),
            state: Arc::new(tx),
        }
    }

    pub fn invalidates(&self) -> &[QueryKey] {
        &self.invalidates
    }

    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }

    /// Back to `Idle`, e.g. when a dialog is reopened.
    pub fn reset(&self) {
        self.state.send_replace(MutationState::Idle);
    }

    /// Run `write`, then invalidate on success.
    pub async fn run<T, Fut>(&self, write: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.state.send_replace(MutationState::Pending);
        let guard = PendingGuard(&self.state);

        let result = write.await;
        match &result {
            Ok(_) => {
                for key in &self.invalidates {
                    let hit = self.cache.invalidate(key);
                    cross_log!(debug, "Mutation invalidated {} entries under {}", hit, key);
                }
                self.state.send_replace(MutationState::Succeeded);
            }
            Err(e) => {
                cross_log!(warn, "Mutation failed: {}", e);
                self.state.send_replace(MutationState::Failed(e.user_message()));
            }
        }
        drop(guard);
        result
    }
}

/// Resets a `Pending` state to `Idle` if the mutation future is dropped before completing.
struct PendingGuard<'a>(&'a watch::Sender<MutationState>);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_if_modified(|state| {
            if state.is_pending() {
                *state = MutationState::Idle;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::errors::{Error, RequestError};
    use crate::forms::FieldErrors;

    fn cache() -> QueryCache {
        QueryCache::new(Duration::from_secs(60), Duration::from_secs(300))
    }

    #[tokio::test]
    async fn success_invalidates_declared_families() {
        let cache = cache();
        let mine = QueryKey::new("applications").with("scope", "mine");
        let projects = QueryKey::new("projects");
        cache.fetch(&mine, || async { Ok::<_, Error>(1u32) }).await.unwrap();
        cache.fetch(&projects, || async { Ok::<_, Error>(1u32) }).await.unwrap();

        let withdraw = Mutation::new(cache.clone(), [QueryKey::new("applications")]);
        withdraw.run(async { Ok::<_, Error>(()) }).await.unwrap();

        assert_eq!(withdraw.state(), MutationState::Succeeded);
        assert!(cache.snapshot::<u32>(&mine).is_stale);
        assert!(!cache.snapshot::<u32>(&projects).is_stale);
    }

    #[tokio::test]
    async fn failure_invalidates_nothing_and_reports() {
        let cache = cache();
        let key = QueryKey::new("talent/skills");
        cache.fetch(&key, || async { Ok::<_, Error>(1u32) }).await.unwrap();

        let add = Mutation::new(cache.clone(), [key.clone()]);
        let mut fields = FieldErrors::new();
        fields.add("name", "The name field is required.");
        let err = add
            .run(async {
                Err::<(), _>(Error::from(RequestError::Validation {
                    message: "The name field is required.".into(),
                    fields,
                }))
            })
            .await
            .unwrap_err();

        assert!(err.field_errors().is_some());
        assert_eq!(
            add.state(),
            MutationState::Failed("The name field is required.".into())
        );
        assert!(!cache.snapshot::<u32>(&key).is_stale);
    }

    #[tokio::test]
    async fn dropped_mutation_does_not_stay_pending() {
        let add = Mutation::new(cache(), []);
        let mut rx = add.subscribe();
        {
            let fut = add.run(std::future::pending::<Result<()>>());
            tokio::pin!(fut);
            let _ = tokio::time::timeout(Duration::from_millis(10), &mut fut).await;
            assert!(add.state().is_pending());
        }
        assert_eq!(add.state(), MutationState::Idle);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), MutationState::Idle);
    }
}
