//! Talent applications to casting calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Id, casting::CastingCall, talent::TalentProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Shortlisted,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    /// A talent may withdraw until the recruiter reaches a decision.
    pub fn is_withdrawable(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Pending | ApplicationStatus::Reviewed | ApplicationStatus::Shortlisted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Id,
    pub casting_call_id: Id,
    pub talent_id: Id,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub casting_call: Option<CastingCall>,
    #[serde(default)]
    pub talent: Option<TalentProfile>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST casting-calls/{id}/apply`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement_id: Option<Id>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdrawable_until_decided() {
        assert!(ApplicationStatus::Shortlisted.is_withdrawable());
        assert!(!ApplicationStatus::Accepted.is_withdrawable());
        assert!(!ApplicationStatus::Withdrawn.is_withdrawable());
    }
}
