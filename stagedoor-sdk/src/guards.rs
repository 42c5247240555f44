//! Route guards.
//!
//! A guard is a pure function of the session state ([`RouteGuard::decide`]) plus a small
//! per-instance state machine ([`GuardMachine`]) that issues the redirect exactly once.
//!
//! ```text
//! Checking ──(session settled, allowed)──▶ Allowed ──(session changed, denied)──┐
//!     │                                                                        ▼
//!     └─────(session settled, denied)─────────────────────────────────▶ Redirecting
//! ```
//!
//! `Redirecting` is terminal and its navigation is issued once. `Allowed` keeps following the
//! session, so a login on a public page or a logout on a protected one moves the guard away.
//! While the session is loading every guard stays in `Checking` and renders a neutral loading
//! state, so a page refresh never bounces a signed-in user before revalidation finishes.

use std::sync::Arc;

use stagedoor_common::UserType;
use tokio::sync::watch;

use crate::config::RoutesToml;
use crate::cross_log;
use crate::navigation::Navigator;
use crate::session::state::SessionState;

/// Which routes a guard protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    /// Signed-in users only; others go to the login route.
    Protected,
    /// Signed-in users of one role only; the other role goes to its own dashboard.
    Role(UserType),
    /// Signed-out users only (login, register); signed-in users go to their dashboard.
    Public,
}

/// What a guarded route should display right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not settled: neutral loading state, no redirect.
    Loading,
    /// Render the children.
    Render,
    /// Navigate to the route; render nothing.
    Redirect(String),
}

impl RouteGuard {
    pub fn decide(&self, state: &SessionState, routes: &RoutesToml) -> GuardDecision {
        if state.is_loading() {
            return GuardDecision::Loading;
        }
        match (self, state.user_type()) {
            (RouteGuard::Protected, Some(_)) => GuardDecision::Render,
            (RouteGuard::Protected | RouteGuard::Role(_), None) => {
                GuardDecision::Redirect(routes.login.clone())
            }
            (RouteGuard::Role(required), Some(actual)) if *required == actual => {
                GuardDecision::Render
            }
            (RouteGuard::Role(_), Some(actual)) | (RouteGuard::Public, Some(actual)) => {
                GuardDecision::Redirect(landing_route(actual, routes).to_string())
            }
            (RouteGuard::Public, None) => GuardDecision::Render,
        }
    }
}

/// Post-login landing page for a role.
pub fn landing_route(user_type: UserType, routes: &RoutesToml) -> &str {
    match user_type {
        UserType::Talent => &routes.talent_dashboard,
        UserType::Recruiter => &routes.recruiter_dashboard,
    }
}

/// Lifecycle of one guard instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardPhase {
    Checking,
    Allowed,
    Redirecting(String),
}

impl GuardPhase {
    /// A first decision has been made.
    pub fn is_settled(&self) -> bool {
        !matches!(self, GuardPhase::Checking)
    }

    /// Only a redirect is final.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GuardPhase::Redirecting(_))
    }
}

/// One mounted guard.
///
/// Feed it session states with [`GuardMachine::update`], or let [`GuardMachine::settle`] and
/// [`GuardMachine::follow`] read a subscription. Children render only while the latest
/// settled state allows them. Once redirecting it ignores further updates, so the redirect is
/// issued only once.
#[derive(Debug)]
pub struct GuardMachine {
    guard: RouteGuard,
    routes: RoutesToml,
    navigator: Arc<dyn Navigator>,
    phase: GuardPhase,
}

impl GuardMachine {
    pub fn new(guard: RouteGuard, routes: RoutesToml, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            guard,
            routes,
            navigator,
            phase: GuardPhase::Checking,
        }
    }

    pub fn guard(&self) -> RouteGuard {
        self.guard
    }

    pub fn phase(&self) -> &GuardPhase {
        &self.phase
    }

    /// Children may be rendered.
    pub fn renders_children(&self) -> bool {
        self.phase == GuardPhase::Allowed
    }

    pub fn update(&mut self, state: &SessionState) -> &GuardPhase {
        if self.phase.is_terminal() {
            return &self.phase;
        }
        match self.guard.decide(state, &self.routes) {
            // A revalidation after the guard allowed its children keeps them mounted.
            GuardDecision::Loading => {}
            GuardDecision::Render => self.phase = GuardPhase::Allowed,
            GuardDecision::Redirect(route) => {
                cross_log!(debug, "{:?} guard redirecting to {}", self.guard, route);
                self.navigator.navigate(&route);
                self.phase = GuardPhase::Redirecting(route);
            }
        }
        &self.phase
    }

    /// Read `rx` until the guard makes its first decision.
    ///
    /// If the session channel closes first the guard stays in `Checking`.
    pub async fn settle(&mut self, rx: &mut watch::Receiver<SessionState>) -> &GuardPhase {
        self.run(rx, GuardPhase::is_settled).await
    }

    /// Keep reading `rx` for as long as the guard is mounted, until it redirects.
    pub async fn follow(&mut self, rx: &mut watch::Receiver<SessionState>) -> &GuardPhase {
        self.run(rx, GuardPhase::is_terminal).await
    }

    async fn run(
        &mut self,
        rx: &mut watch::Receiver<SessionState>,
        done: fn(&GuardPhase) -> bool,
    ) -> &GuardPhase {
        loop {
            let state = rx.borrow_and_update().clone();
            if done(self.update(&state)) {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
        &self.phase
    }
}
