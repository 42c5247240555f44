//! Fixtures shared by the unit tests.

use std::sync::Arc;

use serde_json::{Value, json};
use stagedoor_common::User;

use crate::navigation::MemoryNavigator;
use crate::session::persist::MemoryStore;
use crate::HttpClient;

pub(crate) fn user_json() -> Value {
    json!({
        "id": 11,
        "first_name": "Kemi",
        "last_name": "Adeyemi",
        "email": "kemi@example.com",
        "user_type": "talent",
        "account_status": "active",
        "email_verified_at": "2026-01-05T10:00:00Z"
    })
}

pub(crate) fn talent_user() -> User {
    serde_json::from_value(user_json()).unwrap()
}

pub(crate) fn recruiter_user() -> User {
    serde_json::from_value(json!({
        "id": 21,
        "first_name": "Tunde",
        "last_name": "Okoro",
        "email": "tunde@studio.example.com",
        "user_type": "recruiter",
        "account_status": "active"
    }))
    .unwrap()
}

/// Signed-out client against `base`, on the `/` route.
pub(crate) fn test_client(base: &str) -> (HttpClient, Arc<MemoryNavigator>) {
    let navigator = Arc::new(MemoryNavigator::new("/"));
    let client = HttpClient::builder()
        .base_url(base)
        .storage(Arc::new(MemoryStore::new()))
        .navigator(Arc::clone(&navigator) as Arc<dyn crate::navigation::Navigator>)
        .build()
        .unwrap();
    (client, navigator)
}

/// Client with a session for [`talent_user`] under `token`, currently showing `route`.
pub(crate) fn signed_in_client(
    base: &str,
    token: &str,
    route: &str,
) -> (HttpClient, Arc<MemoryNavigator>) {
    let (client, navigator) = test_client(base);
    client.session.establish(token, talent_user()).unwrap();
    navigator.visit(route);
    (client, navigator)
}
