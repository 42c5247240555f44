//! Account records owned by the backend and cached by the client.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Id;

/// Role of an account. Drives landing pages and which API families apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Actors, models and other creatives applying to casting calls.
    Talent,
    /// Accounts publishing projects and casting calls.
    Recruiter,
}

impl UserType {
    /// Wire representation, as used in query strings and JSON bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Talent => "talent",
            UserType::Recruiter => "recruiter",
        }
    }
}

impl Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user type `{0}`, expected `talent` or `recruiter`")]
pub struct ParseUserTypeError(pub String);

impl FromStr for UserType {
    type Err = ParseUserTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "talent" => Ok(UserType::Talent),
            "recruiter" => Ok(UserType::Recruiter),
            other => Err(ParseUserTypeError(other.to_string())),
        }
    }
}

/// Lifecycle state of an account on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Registered, email not yet confirmed.
    #[default]
    Pending,
    /// Fully usable account.
    Active,
    /// Temporarily blocked by moderation.
    Suspended,
    /// Closed by the owner or an administrator.
    Deactivated,
    /// Any status this client version does not know about.
    #[serde(other)]
    Unknown,
}

/// The signed-in account as returned by `auth/me`, `auth/login` and `auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub account_status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// `"First Last"`, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the backend has recorded an email confirmation.
    pub fn is_email_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }

    /// Display hint only; the backend performs the real authorization.
    pub fn owns(&self, owner_id: Id) -> bool {
        self.id == owner_id
    }

    /// Merge the set fields of `patch` into this user.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(first_name) = &patch.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
        if let Some(status) = &patch.account_status {
            self.account_status = status.clone();
        }
        if let Some(verified) = patch.email_verified_at {
            self.email_verified_at = verified;
        }
        if let Some(avatar) = &patch.avatar_url {
            self.avatar_url = avatar.clone();
        }
    }
}

/// Partial update for the cached [`User`].
///
/// Outer `None` leaves a field untouched; for optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub account_status: Option<AccountStatus>,
    pub email_verified_at: Option<Option<DateTime<Utc>>>,
    pub avatar_url: Option<Option<String>>,
}

impl UserPatch {
    /// Patch that only replaces the avatar URL.
    pub fn avatar(url: impl Into<String>) -> Self {
        Self {
            avatar_url: Some(Some(url.into())),
            ..Self::default()
        }
    }

    /// Patch carrying the names from a profile edit.
    pub fn names(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Self::default()
        }
    }
}
