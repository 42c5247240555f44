use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::{ClientConfig, RoutesToml};
use crate::errors::BuildError;
use crate::navigation::{MemoryNavigator, Navigator};
use crate::session::persist::{KeyValueStore, MemoryStore, SessionPersistence};
use crate::session::state::SessionCell;

const DEFAULT_USER_AGENT: &str = concat!("stagedoor", "@", env!("CARGO_PKG_VERSION"),);

/// Configures an [`HttpClient`] before construction.
///
/// # Defaults
/// - Base URL, timeout and routes: the embedded [`ClientConfig`] defaults
/// - Storage: `window.localStorage` on `wasm32`, an in-memory store elsewhere
/// - Navigator: `window.location` on `wasm32`, an in-memory navigator elsewhere
/// - User-agent: `stagedoor@<crate-version>` plus any [`Self::user_agent_extra`]
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// # use stagedoor::HttpClient;
/// let client = HttpClient::builder()
///     .base_url("https://api.stagedoor.example/api/v1/")
///     .request_timeout(Duration::from_secs(10))
///     .user_agent_extra("web/2.4.0")
///     .build()?;
/// # Ok::<_, stagedoor::BuildError>(())
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct HttpClientBuilder {
    config: ClientConfig,
    base_url: Option<String>,
    http_request_timeout: Option<Duration>,

    /// Optional user-agent segment appended to the default UA for app-level telemetry.
    user_agent_extra: Option<String>,

    storage: Option<Arc<dyn KeyValueStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::from_config(ClientConfig::default())
    }
}

impl HttpClientBuilder {
    /// Start from a loaded configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            base_url: None,
            http_request_timeout: None,
            user_agent_extra: None,
            storage: None,
            navigator: None,
        }
    }

    /// Override `api.base_url`. A missing trailing slash is added.
    pub fn base_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set HTTP requests timeout.
    pub fn request_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.http_request_timeout = Some(timeout);
        self
    }

    /// Append an extra user-agent segment after the default `stagedoor@<version>`.
    /// Example: `.user_agent_extra("web/2.4.0")`
    pub fn user_agent_extra<S: Into<String>>(&mut self, extra: S) -> &mut Self {
        self.user_agent_extra = Some(extra.into());
        self
    }

    /// Where the bearer token and user survive reloads.
    pub fn storage(&mut self, store: Arc<dyn KeyValueStore>) -> &mut Self {
        self.storage = Some(store);
        self
    }

    /// Router seam used for the `401` redirect and the route guards.
    pub fn navigator(&mut self, navigator: Arc<dyn Navigator>) -> &mut Self {
        self.navigator = Some(navigator);
        self
    }

    /// Override the well-known routes.
    pub fn routes(&mut self, routes: RoutesToml) -> &mut Self {
        self.config.routes = routes;
        self
    }

    /// Build [`HttpClient`].
    pub fn build(&self) -> Result<HttpClient, BuildError> {
        let base_url = match &self.base_url {
            Some(raw) => Url::parse(raw).map_err(|e| BuildError::BaseUrl(format!("{raw}: {e}")))?,
            None => self.config.api.base_url.clone(),
        };
        let base_url = normalize_base(base_url)?;

        // Compose user agent with optional extra part.
        let extra = self
            .user_agent_extra
            .as_deref()
            .unwrap_or(&self.config.api.user_agent_extra);
        let user_agent = match extra.trim() {
            "" => DEFAULT_USER_AGENT.to_string(),
            extra => format!("{DEFAULT_USER_AGENT} {extra}"),
        };

        #[cfg(not(target_arch = "wasm32"))]
        let mut http_builder = reqwest::Client::builder().user_agent(user_agent);

        #[cfg(target_arch = "wasm32")]
        let http_builder = reqwest::Client::builder().user_agent(user_agent);

        // Browser fetch has no client-wide timeout.
        #[cfg(not(target_arch = "wasm32"))]
        {
            let timeout = self
                .http_request_timeout
                .unwrap_or_else(|| self.config.request_timeout());
            http_builder = http_builder.timeout(timeout);
        }

        let store = self.storage.clone().unwrap_or_else(default_store);
        let navigator = self.navigator.clone().unwrap_or_else(default_navigator);

        let mut config = self.config.clone();
        config.api.base_url = base_url.clone();

        Ok(HttpClient {
            http: http_builder.build()?,
            base_url,
            session: SessionCell::new(SessionPersistence::new(store)),
            navigator,
            config: Arc::new(config),
        })
    }
}

/// `Url::join` drops the last segment of a base without a trailing slash.
fn normalize_base(mut url: Url) -> Result<Url, BuildError> {
    if url.cannot_be_a_base() {
        return Err(BuildError::BaseUrl(url.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(not(target_arch = "wasm32"))]
fn default_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

#[cfg(target_arch = "wasm32")]
fn default_store() -> Arc<dyn KeyValueStore> {
    Arc::new(crate::session::persist::LocalStorage)
}

#[cfg(not(target_arch = "wasm32"))]
fn default_navigator() -> Arc<dyn Navigator> {
    Arc::new(MemoryNavigator::default())
}

#[cfg(target_arch = "wasm32")]
fn default_navigator() -> Arc<dyn Navigator> {
    Arc::new(crate::navigation::BrowserNavigator)
}

/// Transport client for the Stagedoor REST API.
///
/// `HttpClient` is the single place where requests leave the process. It owns:
/// - A reqwest HTTP client with the configured timeout and user agent.
/// - The base URL every relative API path is joined to.
/// - The process-wide session cell, read on every request for the bearer token and torn
///   down when the backend answers `401`.
///
/// ### What it does
/// - Injects `Authorization: Bearer <token>` whenever a token is persisted.
/// - Classifies every non-2xx response into a [`crate::errors::RequestError`] and logs it.
/// - On `401` clears the session and navigates to the login route, unless that route is
///   already displayed.
///
/// ### What it *doesn't* do
/// - No retries, no response caching. Those belong to the query layer and the user.
///
/// Cloning is cheap; clones share the session and connection pool.
#[derive(Clone, Debug)]
pub struct HttpClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) session: SessionCell,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) config: Arc<ClientConfig>,
}

impl HttpClient {
    /// Creates a client from the embedded defaults and the `STAGEDOOR_API_URL` environment
    /// override.
    pub fn new() -> Result<HttpClient, crate::Error> {
        let config = ClientConfig::default().with_env_overrides()?;
        Ok(HttpClientBuilder::from_config(config).build()?)
    }

    /// Returns a builder to edit settings before creating [`HttpClient`].
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    // === Getters ===

    /// API root every relative path is resolved against. Always ends with `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Effective configuration (after builder overrides).
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn routes(&self) -> &RoutesToml {
        &self.config.routes
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = HttpClient::builder()
            .base_url("http://localhost:9000/api/v1")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:9000/api/v1/");
        assert_eq!(
            client.config().api.base_url.as_str(),
            "http://localhost:9000/api/v1/"
        );
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        let err = HttpClient::builder()
            .base_url("mailto:ops@example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::BaseUrl(_)));

        let err = HttpClient::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, BuildError::BaseUrl(_)));
    }

    #[test]
    fn routes_can_be_overridden() {
        let mut routes = RoutesToml::default();
        routes.login = "/sign-in".into();
        let client = HttpClient::builder().routes(routes).build().unwrap();
        assert_eq!(client.routes().login, "/sign-in");
        assert_eq!(client.routes().talent_dashboard, "/talent/dashboard");
    }
}
