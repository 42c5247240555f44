use std::sync::Arc;

use stagedoor_common::{User, UserPatch, UserType};
use tokio::sync::watch;

use super::persist::SessionPersistence;
use crate::{cross_log, errors::PersistenceError};

/// Whether the client knows if the user is signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// Not known yet: before bootstrap, or while a restored token is being revalidated.
    Checking,
    /// A session has been confirmed (or freshly established) and is usable.
    Authenticated,
    /// No session.
    Unauthenticated,
}

#[derive(Clone, PartialEq)]
struct Identity {
    token: String,
    user: User,
}

/// Snapshot of the process-wide session.
///
/// The token and the user are stored as one value, so a token never exists without its user
/// and [`SessionState::is_authenticated`] is exactly "user and token are present".
#[derive(Clone, PartialEq)]
pub struct SessionState {
    status: AuthStatus,
    identity: Option<Identity>,
}

impl SessionState {
    /// State before bootstrap has read persisted storage.
    pub fn initial() -> Self {
        Self {
            status: AuthStatus::Checking,
            identity: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            status: AuthStatus::Unauthenticated,
            identity: None,
        }
    }

    /// Freshly established by login/register or confirmed by revalidation.
    pub fn signed_in(token: impl Into<String>, user: User) -> Self {
        Self {
            status: AuthStatus::Authenticated,
            identity: Some(Identity {
                token: token.into(),
                user,
            }),
        }
    }

    /// Restored from storage, optimistically authenticated until revalidated.
    pub fn restoring(token: impl Into<String>, user: User) -> Self {
        Self {
            status: AuthStatus::Checking,
            identity: Some(Identity {
                token: token.into(),
                user,
            }),
        }
    }

    pub fn status(&self) -> AuthStatus {
        self.status
    }

    pub fn user(&self) -> Option<&User> {
        self.identity.as_ref().map(|i| &i.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.token.as_str())
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.user().map(|u| u.user_type)
    }

    /// `user != null && token != null`. True during optimistic restore as well.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Guards must not decide anything while this is true.
    pub fn is_loading(&self) -> bool {
        self.status == AuthStatus::Checking
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ds = f.debug_struct("SessionState");
        ds.field("status", &self.status);
        ds.field("user", &self.user().map(|u| u.id));
        ds.field("token", &self.token().map(|_| "<redacted>"));
        ds.finish()
    }
}

/// Shared cell behind the client adapter and the session store.
///
/// All writes go through here so persisted storage and the observable state move together.
#[derive(Debug, Clone)]
pub(crate) struct SessionCell {
    state: Arc<watch::Sender<SessionState>>,
    persistence: SessionPersistence,
}

impl SessionCell {
    pub(crate) fn new(persistence: SessionPersistence) -> Self {
        let (tx, _rx) = watch::channel(SessionState::initial());
        Self {
            state: Arc::new(tx),
            persistence,
        }
    }

    pub(crate) fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Bearer token for outgoing requests, read from persisted storage.
    pub(crate) fn token(&self) -> Option<String> {
        self.persistence.token()
    }

    /// Load persisted token and user. Returns whether a session was restored.
    pub(crate) fn restore(&self) -> bool {
        let loaded = match self.persistence.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                cross_log!(warn, "Could not read persisted session: {}", e);
                None
            }
        };
        match loaded {
            Some((token, user)) => {
                cross_log!(info, "Restored persisted session for user {}", user.id);
                self.state.send_replace(SessionState::restoring(token, user));
                true
            }
            None => {
                self.state.send_replace(SessionState::signed_out());
                false
            }
        }
    }

    pub(crate) fn establish(&self, token: &str, user: User) -> Result<(), PersistenceError> {
        self.persistence.save(token, &user)?;
        cross_log!(info, "Session established for user {}", user.id);
        self.state.send_replace(SessionState::signed_in(token, user));
        Ok(())
    }

    /// Revalidation succeeded: keep the token, take the fresh user.
    pub(crate) fn confirm(&self, user: User) {
        let Some(token) = self.snapshot().token().map(str::to_string) else {
            cross_log!(debug, "Ignoring revalidated user: session ended meanwhile");
            return;
        };
        if let Err(e) = self.persistence.save_user(&user) {
            cross_log!(warn, "Could not persist refreshed user: {}", e);
        }
        self.state.send_replace(SessionState::signed_in(token, user));
    }

    /// Leave `Checking` without new information (revalidation failed for a non-auth reason).
    pub(crate) fn settle(&self) {
        self.state.send_modify(|state| {
            if state.status == AuthStatus::Checking {
                state.status = if state.identity.is_some() {
                    AuthStatus::Authenticated
                } else {
                    AuthStatus::Unauthenticated
                };
            }
        });
    }

    /// Merge `patch` into the cached user. Returns the merged user, `None` when signed out.
    pub(crate) fn update_user(&self, patch: &UserPatch) -> Option<User> {
        let mut merged = None;
        self.state.send_if_modified(|state| match state.identity.as_mut() {
            Some(identity) => {
                identity.user.apply(patch);
                merged = Some(identity.user.clone());
                true
            }
            None => false,
        });
        if let Some(user) = &merged {
            if let Err(e) = self.persistence.save_user(user) {
                cross_log!(warn, "Could not persist updated user: {}", e);
            }
        }
        merged
    }

    /// Clear persisted storage and state. Never fails; storage errors are logged.
    pub(crate) fn teardown(&self) {
        if let Err(e) = self.persistence.clear() {
            cross_log!(error, "Could not clear persisted session: {}", e);
        }
        let previous = self.state.send_replace(SessionState::signed_out());
        if let Some(user) = previous.user() {
            cross_log!(info, "Session for user {} ended", user.id);
        }
    }
}
