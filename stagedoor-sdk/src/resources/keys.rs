//! Query keys of every cached read, and the families mutations invalidate.
//!
//! A family key (no parameters) is a prefix of every key of that resource, so invalidating
//! it reaches all pages, filters and detail entries at once.

use stagedoor_common::Id;
use stagedoor_common::application::ApplicationStatus;
use stagedoor_common::casting::CastingCallStatus;
use stagedoor_common::project::ProjectStatus;
use stagedoor_common::search::{CastingCallFilters, TalentSearchFilters};

use crate::query::QueryKey;

pub const TALENT_PROFILE: &str = "talent/profile";
pub const SKILLS: &str = "talent/skills";
pub const EXPERIENCES: &str = "talent/experiences";
pub const EDUCATION: &str = "talent/education";
pub const MEDIA: &str = "talent/media";
pub const PUBLIC_TALENTS: &str = "public/talents";
pub const RECRUITER_PROFILE: &str = "recruiter/profile";
pub const PROJECTS: &str = "projects";
pub const APPLICATIONS: &str = "applications";
pub const CONVERSATIONS: &str = "messages/conversations";
pub const THREADS: &str = "messages/thread";
pub const UNREAD_MESSAGES: &str = "messages/unread";
pub const NOTIFICATIONS: &str = "notifications";
pub const UNREAD_NOTIFICATIONS: &str = "notifications/unread";
pub const CASTING_CALLS: &str = "casting-calls";
pub const TALENT_SEARCH: &str = "search/talents";
pub const CASTING_CALL_SEARCH: &str = "search/casting-calls";
pub const VERIFICATION: &str = "verification";
pub const REFERENCE: &str = "reference";

/// Every key of `resource`.
pub fn family(resource: &str) -> QueryKey {
    QueryKey::new(resource)
}

pub fn talent_profile() -> QueryKey {
    QueryKey::new(TALENT_PROFILE)
}

pub fn skills() -> QueryKey {
    QueryKey::new(SKILLS)
}

pub fn experiences() -> QueryKey {
    QueryKey::new(EXPERIENCES)
}

pub fn education() -> QueryKey {
    QueryKey::new(EDUCATION)
}

pub fn media() -> QueryKey {
    QueryKey::new(MEDIA)
}

pub fn public_talent(id: Id) -> QueryKey {
    QueryKey::new(PUBLIC_TALENTS).with("id", id)
}

pub fn recruiter_profile() -> QueryKey {
    QueryKey::new(RECRUITER_PROFILE)
}

pub fn projects(page: Option<u32>, status: Option<ProjectStatus>) -> QueryKey {
    QueryKey::new(PROJECTS)
        .with("scope", "list")
        .with_opt("page", page)
        .with_opt("status", status.as_ref().map(ProjectStatus::as_str))
}

pub fn project(id: Id) -> QueryKey {
    QueryKey::new(PROJECTS).with("id", id)
}

pub fn my_applications(page: Option<u32>, status: Option<ApplicationStatus>) -> QueryKey {
    QueryKey::new(APPLICATIONS)
        .with("scope", "mine")
        .with_opt("page", page)
        .with_opt("status", status.as_ref().map(ApplicationStatus::as_str))
}

pub fn casting_call_applications(
    casting_call_id: Id,
    page: Option<u32>,
    status: Option<ApplicationStatus>,
) -> QueryKey {
    QueryKey::new(APPLICATIONS)
        .with("casting_call", casting_call_id)
        .with_opt("page", page)
        .with_opt("status", status.as_ref().map(ApplicationStatus::as_str))
}

pub fn conversations() -> QueryKey {
    QueryKey::new(CONVERSATIONS)
}

pub fn thread(conversation_id: Id) -> QueryKey {
    QueryKey::new(THREADS).with("conversation", conversation_id)
}

pub fn unread_messages() -> QueryKey {
    QueryKey::new(UNREAD_MESSAGES)
}

pub fn notifications(page: Option<u32>, unread_only: bool) -> QueryKey {
    QueryKey::new(NOTIFICATIONS)
        .with_opt("page", page)
        .with("unread", unread_only)
}

pub fn unread_notifications() -> QueryKey {
    QueryKey::new(UNREAD_NOTIFICATIONS)
}

pub fn casting_calls(filters: &CastingCallFilters) -> QueryKey {
    QueryKey::new(CASTING_CALLS)
        .with("scope", "list")
        .with_pairs(filters.to_pairs())
}

pub fn casting_call(id: Id) -> QueryKey {
    QueryKey::new(CASTING_CALLS).with("id", id)
}

pub fn my_casting_calls(page: Option<u32>, status: Option<CastingCallStatus>) -> QueryKey {
    QueryKey::new(CASTING_CALLS)
        .with("scope", "mine")
        .with_opt("page", page)
        .with_opt("status", status.as_ref().map(CastingCallStatus::as_str))
}

pub fn talent_search(filters: &TalentSearchFilters) -> QueryKey {
    QueryKey::new(TALENT_SEARCH).with_pairs(filters.to_pairs())
}

pub fn casting_call_search(filters: &CastingCallFilters) -> QueryKey {
    QueryKey::new(CASTING_CALL_SEARCH).with_pairs(filters.to_pairs())
}

pub fn verification() -> QueryKey {
    QueryKey::new(VERIFICATION)
}

/// `kind` is `categories`, `skills`, `locations` or `casting-form`.
pub fn reference(kind: &str) -> QueryKey {
    QueryKey::new(REFERENCE).with("kind", kind)
}
