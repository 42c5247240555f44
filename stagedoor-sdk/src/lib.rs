#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(any(), deny(clippy::unwrap_used))]

pub mod api;
mod client;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod forms;
pub mod guards;
mod macros;
pub mod navigation;
pub mod query;
pub mod resources;
pub mod session;
mod util;

pub mod prelude;

#[cfg(test)]
mod test_support;

// --- PUBLIC API EXPORTS ---
// Transport
pub use client::core::{HttpClient, HttpClientBuilder};
// Application façade
pub use resources::Stagedoor;
// Session
pub use session::core::{EMAIL_NOT_VERIFIED, Registration, SessionStore};
pub use session::persist::{KeyValueStore, MemoryStore, SessionPersistence};
#[cfg(not(target_arch = "wasm32"))]
pub use session::persist::FileStore;
#[cfg(target_arch = "wasm32")]
pub use session::persist::LocalStorage;
pub use session::state::{AuthStatus, SessionState};
// Routing
pub use guards::{GuardDecision, GuardMachine, GuardPhase, RouteGuard, landing_route};
#[cfg(target_arch = "wasm32")]
pub use navigation::BrowserNavigator;
pub use navigation::{MemoryNavigator, Navigator, same_route};
// Cache
pub use envelope::{Page, PageMeta};
pub use query::{
    Mutation, MutationState, PollHandle, Polled, QueryCache, QueryKey, QueryObserver,
    QueryResult, QuerySnapshot,
};
// Forms
pub use forms::{FieldErrors, FormState, Validate};

// Error and configuration
pub use config::ClientConfig;
pub use errors::{AuthError, BuildError, Error, RequestError, Result};
pub use util::MaybeSend;

// Re-exports
pub use reqwest::{Method, StatusCode};
pub use stagedoor_common as models;
