//! The application façade: one [`Stagedoor`] per front-end.
//!
//! It binds the stateless API modules to the query cache and the session:
//! - reads go through [`QueryCache::fetch`] under the keys in [`keys`];
//! - writes run as [`Mutation`]s that invalidate whole resource families on success;
//! - the cache is scoped to the signed-in user and emptied when that user changes.

pub mod inbox;
pub mod keys;
pub mod marketplace;
pub mod talent;

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use stagedoor_common::{Id, User};

use crate::api::{Credentials, NewAccount};
use crate::config::ClientConfig;
use crate::errors::{AuthError, Error, Result};
use crate::guards::{GuardMachine, RouteGuard, landing_route};
use crate::query::{Mutation, QueryCache, QueryKey, QueryResult};
use crate::session::core::{Registration, SessionStore};
use crate::session::state::SessionState;
use crate::util::MaybeSend;
use crate::{HttpClient, HttpClientBuilder, cross_log};

/// Client, session and cache of one running front-end.
///
/// Cheap to clone; clones share everything.
#[derive(Debug, Clone)]
pub struct Stagedoor {
    client: HttpClient,
    session: SessionStore,
    cache: QueryCache,
    /// User the cached entries belong to.
    cache_owner: Arc<Mutex<Option<Id>>>,
}

impl Stagedoor {
    pub fn new(client: HttpClient) -> Self {
        let cache = QueryCache::new(client.config().stale_time(), client.config().gc_time());
        Self {
            session: SessionStore::new(client.clone()),
            client,
            cache,
            cache_owner: Arc::new(Mutex::new(None)),
        }
    }

    /// Build the client from `config` (storage and navigator use the platform defaults).
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let client = HttpClientBuilder::from_config(config).build()?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn config(&self) -> &ClientConfig {
        self.client.config()
    }

    // === Session ===

    /// Application bootstrap: restore and revalidate the persisted session.
    pub async fn initialize(&self) -> SessionState {
        self.session.initialize().await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        let user = self.session.login(credentials).await?;
        self.scope_cache();
        Ok(user)
    }

    pub async fn register(&self, account: &NewAccount) -> Result<Registration> {
        let registration = self.session.register(account).await?;
        self.scope_cache();
        Ok(registration)
    }

    pub async fn verify_email(&self, email: &str, code: &str) -> Result<User> {
        let user = self.session.verify_email(email, code).await?;
        self.scope_cache();
        Ok(user)
    }

    /// Sign out and drop every cached entry. Never fails.
    pub async fn logout(&self) {
        self.session.logout().await;
        self.scope_cache();
        self.cache.clear();
    }

    /// Whether the signed-in user owns a record (show edit buttons). Display hint only; the
    /// backend authorizes every write.
    pub fn is_owner(&self, owner_id: Id) -> bool {
        self.session
            .state()
            .user()
            .is_some_and(|user| user.owns(owner_id))
    }

    // === Navigation ===

    /// Mount a guard for the current route.
    pub fn guard(&self, guard: RouteGuard) -> GuardMachine {
        GuardMachine::new(
            guard,
            self.client.routes().clone(),
            Arc::clone(self.client.navigator()),
        )
    }

    /// Landing page of the signed-in user, the login route otherwise.
    pub fn home_route(&self) -> String {
        let routes = self.client.routes();
        match self.session.state().user_type() {
            Some(user_type) => landing_route(user_type, routes).to_string(),
            None => routes.login.clone(),
        }
    }

    /// Navigate to [`Stagedoor::home_route`], e.g. right after signing in.
    pub fn go_home(&self) {
        self.client.navigator().navigate(&self.home_route());
    }

    /// Email verification page with `email` pre-filled.
    pub fn verify_email_route(&self, email: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("email", email)
            .finish();
        format!("{}?{}", self.client.routes().verify_email, query)
    }

    /// Navigate after a login attempt.
    ///
    /// Signed in: the role dashboard. Unconfirmed email: the verification page. Any other
    /// failure stays on the login page to show its error.
    pub fn go_after_login(&self, outcome: &Result<User>) {
        match outcome {
            Ok(_) => self.go_home(),
            Err(Error::Authentication(AuthError::EmailNotVerified { email, .. })) => {
                self.client
                    .navigator()
                    .navigate(&self.verify_email_route(email));
            }
            Err(_) => {}
        }
    }

    /// Navigate after a sign-up: the verification page when the backend asks for the email
    /// code, otherwise the dashboard (or the login page when no session was issued).
    pub fn go_after_registration(&self, registration: &Registration) {
        if registration.requires_verification {
            self.client
                .navigator()
                .navigate(&self.verify_email_route(&registration.user.email));
        } else {
            self.go_home();
        }
    }

    // === Cache plumbing ===

    /// A tracked write for views that show its progress.
    pub fn mutation(&self, invalidates: impl IntoIterator<Item = QueryKey>) -> Mutation {
        Mutation::new(self.cache.clone(), invalidates)
    }

    /// Empty the cache when the signed-in user differs from the one it was filled for.
    ///
    /// Covers every way a session ends, including the adapter's `401` teardown.
    fn scope_cache(&self) {
        let current = self.session.state().user().map(|u| u.id);
        let mut owner = self
            .cache_owner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *owner != current {
            if !self.cache.is_empty() {
                cross_log!(debug, "Session user changed, dropping {} cached queries", self.cache.len());
            }
            self.cache.clear();
            *owner = current;
        }
    }

    pub(crate) async fn query<T, Fut>(&self, key: QueryKey, request: Fut) -> QueryResult<T>
    where
        T: Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + MaybeSend + 'static,
    {
        self.scope_cache();
        self.cache.fetch(&key, move || request).await
    }

    pub(crate) async fn mutate<T, Fut>(
        &self,
        invalidates: impl IntoIterator<Item = QueryKey>,
        write: Fut,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.mutation(invalidates).run(write).await
    }

    pub(crate) fn poll_interval(secs: u64) -> Duration {
        Duration::from_secs(secs.max(1))
    }
}
