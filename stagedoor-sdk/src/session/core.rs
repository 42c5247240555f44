use stagedoor_common::{User, UserPatch};
use tokio::sync::watch;

use super::state::SessionState;
use crate::api::{AuthApi, AuthSession, Credentials, NewAccount};
use crate::errors::{AuthError, Error, RequestError, Result};
use crate::{HttpClient, cross_log};

/// `code` the backend sends with a `403` from `auth/login` for unconfirmed accounts.
pub const EMAIL_NOT_VERIFIED: &str = "email_not_verified";

/// Outcome of a successful sign-up.
///
/// Whether to land on a dashboard or on the email verification page is the calling page's
/// decision: the store only establishes a session when the backend issued a token.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub user: User,
    /// A session was established and persisted.
    pub signed_in: bool,
    /// The backend wants the email confirmed before the account is usable.
    pub requires_verification: bool,
}

/// The process-wide session: who is signed in, and the operations that change it.
///
/// Exactly one session exists per [`HttpClient`]; every clone of the store (and of the
/// client) shares it. Views read it through [`SessionStore::subscribe`] instead of fetching
/// "current user" on their own.
///
/// Lifecycle:
/// - [`SessionStore::initialize`] reads the persisted token and user. When both are present
///   the session is restored optimistically (status `Checking`) and then revalidated with
///   [`SessionStore::check_auth`].
/// - [`SessionStore::login`] / [`SessionStore::register`] establish a session.
/// - [`SessionStore::logout`] and any rejected token tear it down.
///
/// Concurrency:
/// - Cheap to clone and thread-safe; it shares the underlying [`HttpClient`].
#[derive(Clone, Debug)]
pub struct SessionStore {
    pub(crate) client: HttpClient,
}

impl SessionStore {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Returns a reference to the internal [`HttpClient`].
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Current session snapshot.
    pub fn state(&self) -> SessionState {
        self.client.session.snapshot()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.client.session.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Bootstrap: restore the persisted session and revalidate it.
    ///
    /// Never fails; a revalidation that could not reach the backend keeps the restored
    /// session and is logged.
    pub async fn initialize(&self) -> SessionState {
        if self.client.session.restore() {
            if let Err(e) = self.check_auth().await {
                cross_log!(warn, "Could not revalidate the restored session: {}", e);
            }
        }
        self.state()
    }

    /// Sign in with email and password.
    ///
    /// On failure the session is left exactly as it was. Errors:
    /// - [`AuthError::InvalidCredentials`] for a rejected pair
    /// - [`AuthError::EmailNotVerified`] when the account needs its email confirmed
    /// - [`RequestError::Validation`] for malformed input
    /// - any other classified request error
    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        let session = self
            .api()
            .login(credentials)
            .await
            .map_err(|e| map_login_error(e, &credentials.email))?;
        let token = session.token.clone().ok_or(AuthError::MissingToken)?;
        self.client.session.establish(&token, session.user.clone())?;
        Ok(session.user)
    }

    /// Create an account. Establishes a session when the backend returns a token.
    pub async fn register(&self, account: &NewAccount) -> Result<Registration> {
        let AuthSession {
            user,
            token,
            requires_verification,
        } = self.api().register(account).await?;
        let requires_verification = requires_verification || !user.is_email_verified();

        let signed_in = match token {
            Some(token) => {
                self.client.session.establish(&token, user.clone())?;
                true
            }
            None => false,
        };
        Ok(Registration {
            user,
            signed_in,
            requires_verification,
        })
    }

    /// Confirm the email with the emailed code. Signs in when the backend returns a token.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<User> {
        let session = self.api().verify_email(email, code).await?;
        match session.token {
            Some(token) => self.client.session.establish(&token, session.user.clone())?,
            None => {
                if self.state().is_authenticated() {
                    self.client.session.confirm(session.user.clone());
                }
            }
        }
        Ok(session.user)
    }

    /// Sign out. Local teardown always happens; a failed server call is only logged.
    pub async fn logout(&self) {
        if self.client.session.token().is_some() {
            if let Err(e) = self.api().logout().await {
                cross_log!(warn, "Server-side logout failed: {}", e);
            }
        }
        self.client.session.teardown();
    }

    /// Merge `patch` into the cached user without a network call.
    ///
    /// Returns the merged user, or [`AuthError::NotSignedIn`].
    pub fn update_user(&self, patch: &UserPatch) -> Result<User> {
        self.client
            .session
            .update_user(patch)
            .ok_or_else(|| AuthError::NotSignedIn.into())
    }

    /// Revalidate the token against `auth/me`.
    ///
    /// - valid: the fresh user replaces the cached one, status `Authenticated`
    /// - `401`: the session is torn down and [`AuthError::SessionExpired`] returned
    /// - anything else: the cached session is kept and the error returned
    pub async fn check_auth(&self) -> Result<User> {
        if self.client.session.token().is_none() {
            self.client.session.teardown();
            return Err(AuthError::NotSignedIn.into());
        }

        match self.api().me().await {
            Ok(user) => {
                self.client.session.confirm(user.clone());
                Ok(user)
            }
            Err(e) if e.is_unauthorized() => {
                // The adapter skips teardown on the login route; revalidation must not.
                self.client.session.teardown();
                Err(AuthError::SessionExpired.into())
            }
            Err(e) => {
                self.client.session.settle();
                Err(e)
            }
        }
    }

    fn api(&self) -> AuthApi {
        AuthApi::new(self.client.clone())
    }
}

fn map_login_error(err: Error, email: &str) -> Error {
    match err {
        Error::Request(RequestError::Unauthorized { message }) => {
            AuthError::InvalidCredentials(message).into()
        }
        Error::Request(RequestError::Forbidden { message, code })
            if code.as_deref() == Some(EMAIL_NOT_VERIFIED) =>
        {
            AuthError::EmailNotVerified {
                email: email.to_string(),
                message,
            }
            .into()
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;
    use stagedoor_common::UserType;

    use super::*;
    use crate::session::state::AuthStatus;
    use crate::test_support::{signed_in_client, talent_user, test_client, user_json};

    fn store_for(server: &MockServer) -> (SessionStore, std::sync::Arc<crate::MemoryNavigator>) {
        let (client, nav) = test_client(&server.url("/api/v1/"));
        (SessionStore::new(client), nav)
    }

    #[tokio::test]
    async fn login_then_check_auth_keeps_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/auth/login")
                    .json_body(json!({ "email": "kemi@example.com", "password": "secret-pw" }));
                then.status(200)
                    .json_body(json!({ "data": { "user": user_json(), "token": "tok-9" } }));
            })
            .await;
        let me = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/auth/me")
                    .header("authorization", "Bearer tok-9");
                then.status(200).json_body(json!({ "data": user_json() }));
            })
            .await;

        let (store, _nav) = store_for(&server);
        let user = store
            .login(&Credentials::new("kemi@example.com", "secret-pw"))
            .await
            .unwrap();
        assert_eq!(user.user_type, UserType::Talent);
        assert!(store.is_authenticated());

        store.check_auth().await.unwrap();
        let state = store.state();
        assert!(state.is_authenticated());
        assert_eq!(state.status(), AuthStatus::Authenticated);
        assert_eq!(state.token(), Some("tok-9"));
        me.assert_async().await;
    }

    #[tokio::test]
    async fn check_auth_with_invalid_token_tears_down() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/auth/me");
                then.status(401).json_body(json!({ "message": "Unauthenticated." }));
            })
            .await;

        let (client, nav) = signed_in_client(&server.url("/api/v1/"), "revoked", "/login");
        let store = SessionStore::new(client);
        let err = store.check_auth().await.unwrap_err();

        assert!(matches!(err, Error::Authentication(AuthError::SessionExpired)));
        assert!(!store.is_authenticated());
        assert_eq!(store.state().status(), AuthStatus::Unauthenticated);
        assert!(store.client().session.token().is_none());
        // Already on the login route: no navigation.
        assert!(nav.history().is_empty());
    }

    #[tokio::test]
    async fn bad_credentials_do_not_touch_the_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/auth/login");
                then.status(401).json_body(json!({ "message": "These credentials do not match our records." }));
            })
            .await;

        let (client, nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/dashboard");
        let store = SessionStore::new(client);
        let before = store.state();

        let err = store
            .login(&Credentials::new("kemi@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication(AuthError::InvalidCredentials(_))));
        assert_eq!(store.state(), before);
        assert!(nav.history().is_empty());
    }

    #[tokio::test]
    async fn unverified_email_is_its_own_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/auth/login");
                then.status(403).json_body(json!({
                    "message": "Please verify your email address.",
                    "code": "email_not_verified"
                }));
            })
            .await;

        let (store, _nav) = store_for(&server);
        store.client().session.restore();
        let err = store
            .login(&Credentials::new("new@example.com", "secret-pw"))
            .await
            .unwrap_err();
        match err {
            Error::Authentication(AuthError::EmailNotVerified { email, .. }) => {
                assert_eq!(email, "new@example.com")
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(store.state().status(), AuthStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn register_without_token_requires_verification() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/auth/register");
                then.status(201).json_body(json!({
                    "message": "Registered",
                    "data": { "user": user_json(), "requires_verification": true }
                }));
            })
            .await;

        let (store, _nav) = store_for(&server);
        store.client().session.restore();
        let account = NewAccount {
            first_name: "Kemi".into(),
            last_name: "Adeyemi".into(),
            email: "kemi@example.com".into(),
            password: "abcdefgh".into(),
            password_confirmation: "abcdefgh".into(),
            user_type: UserType::Talent,
            phone: None,
        };
        let registration = store.register(&account).await.unwrap();
        assert!(!registration.signed_in);
        assert!(registration.requires_verification);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn logout_always_clears() {
        let server = MockServer::start_async().await;
        let logout = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/auth/logout");
                then.status(500);
            })
            .await;

        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/dashboard");
        let store = SessionStore::new(client);
        store.logout().await;

        logout.assert_async().await;
        assert!(!store.is_authenticated());
        assert_eq!(store.state().status(), AuthStatus::Unauthenticated);
        assert!(store.client().session.token().is_none());

        // Unreachable backend: still signs out.
        let (client, _nav) = signed_in_client("http://127.0.0.1:9/api/v1/", "tok", "/");
        let store = SessionStore::new(client);
        store.logout().await;
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn initialize_restores_and_revalidates() {
        let server = MockServer::start_async().await;
        let mut renamed = user_json();
        renamed["last_name"] = json!("Bello");
        server
            .mock_async(move |when, then| {
                when.method(GET).path("/api/v1/auth/me");
                then.status(200).json_body(json!({ "user": renamed }));
            })
            .await;

        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/dashboard");
        let store = SessionStore::new(client);
        let mut rx = store.subscribe();

        let state = store.initialize().await;
        assert_eq!(state.status(), AuthStatus::Authenticated);
        assert_eq!(state.user().unwrap().last_name, "Bello");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().user().unwrap().last_name, "Bello");
    }

    #[tokio::test]
    async fn offline_revalidation_keeps_cached_session() {
        let (client, _nav) = signed_in_client("http://127.0.0.1:9/api/v1/", "tok", "/");
        let store = SessionStore::new(client);

        let state = store.initialize().await;
        assert_eq!(state.status(), AuthStatus::Authenticated);
        assert_eq!(state.user(), Some(&talent_user()));
        assert!(store.check_auth().await.unwrap_err().is_network());
    }

    #[test]
    fn update_user_needs_a_session() {
        let (client, _nav) = test_client("http://localhost:8000/api/v1/");
        let store = SessionStore::new(client);
        assert!(matches!(
            store.update_user(&UserPatch::avatar("a.png")),
            Err(Error::Authentication(AuthError::NotSignedIn))
        ));

        let (client, _nav) = signed_in_client("http://localhost:8000/api/v1/", "tok", "/");
        let store = SessionStore::new(client);
        let user = store.update_user(&UserPatch::avatar("a.png")).unwrap();
        assert_eq!(user.avatar_url.as_deref(), Some("a.png"));
        assert_eq!(store.user().unwrap().avatar_url.as_deref(), Some("a.png"));
    }
}
