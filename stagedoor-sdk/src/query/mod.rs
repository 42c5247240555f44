//! Server-state cache: keyed queries, invalidating mutations and polling.

pub mod cache;
pub mod key;
pub mod mutation;
pub mod poll;

pub use cache::{QueryCache, QueryObserver, QueryResult, QuerySnapshot};
pub use key::QueryKey;
pub use mutation::{Mutation, MutationState};
pub use poll::{PollHandle, Polled};
