#![doc = include_str!("../README.md")]
//!

#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(any(), deny(clippy::unwrap_used))]

pub mod application;
pub mod casting;
pub mod message;
pub mod notification;
pub mod project;
pub mod recruiter;
pub mod reference;
pub mod search;
pub mod talent;
pub mod user;
pub mod verification;

/// Backend primary keys.
pub type Id = u64;

pub use user::{AccountStatus, User, UserPatch, UserType};
