//! Route navigation seam.
//!
//! The SDK navigates on its own in two places: the adapter's `401` teardown and the route
//! guards. Both go through [`Navigator`] so a browser router, a desktop shell or a test can
//! observe the redirects.

use std::fmt::Debug;
use std::sync::Mutex;

/// Reads the current route and issues navigations.
pub trait Navigator: Debug + Send + Sync {
    /// Path of the route currently displayed, e.g. `/talent/profile`.
    fn current_route(&self) -> String;

    /// Replace the current route with `route`.
    fn navigate(&self, route: &str);
}

/// Whether `current` names the same route as `target`, ignoring query and trailing slash.
pub fn same_route(current: &str, target: &str) -> bool {
    fn normalize(route: &str) -> &str {
        let path = route.split(['?', '#']).next().unwrap_or(route);
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() { "/" } else { trimmed }
    }
    normalize(current) == normalize(target)
}

/// In-process navigator that records every navigation.
///
/// Used by native front-ends without a router and by tests.
#[derive(Debug)]
pub struct MemoryNavigator {
    inner: Mutex<MemoryRoutes>,
}

#[derive(Debug)]
struct MemoryRoutes {
    current: String,
    history: Vec<String>,
}

impl MemoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(MemoryRoutes {
                current: initial.into(),
                history: Vec::new(),
            }),
        }
    }

    /// Navigations issued so far, oldest first. The initial route is not included.
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Move to `route` without recording it, as a user clicking a link would.
    pub fn visit(&self, route: impl Into<String>) {
        self.lock().current = route.into();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryRoutes> {
        // A poisoned lock only means a panicking test thread; the data is still valid.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_route(&self) -> String {
        self.lock().current.clone()
    }

    fn navigate(&self, route: &str) {
        let mut routes = self.lock();
        routes.current = route.to_string();
        routes.history.push(route.to_string());
    }
}

/// `window.location` backed navigator.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

#[cfg(target_arch = "wasm32")]
impl Navigator for BrowserNavigator {
    fn current_route(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, route: &str) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().replace(route) {
                crate::cross_log!(error, "Navigation to {} failed: {:?}", route, e);
            }
        }
    }
}
