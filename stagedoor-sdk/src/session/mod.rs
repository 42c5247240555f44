//! Process-wide session: state, persistence and the store operating on both.

pub mod core;
pub mod persist;
pub mod state;
