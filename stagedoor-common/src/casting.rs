//! Casting calls published by recruiters and their role requirements.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastingCallStatus {
    #[default]
    Draft,
    Published,
    Closed,
}

impl CastingCallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CastingCallStatus::Draft => "draft",
            CastingCallStatus::Published => "published",
            CastingCallStatus::Closed => "closed",
        }
    }
}

/// One role the casting call is looking to fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastingRequirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub role_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age_min: Option<u8>,
    #[serde(default)]
    pub age_max: Option<u8>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastingCall {
    pub id: Id,
    pub recruiter_id: Id,
    #[serde(default)]
    pub project_id: Option<Id>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub status: CastingCallStatus,
    #[serde(default)]
    pub application_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub shoot_date: Option<NaiveDate>,
    #[serde(default)]
    pub compensation: Option<String>,
    #[serde(default)]
    pub requirements: Vec<CastingRequirement>,
    #[serde(default)]
    pub applications_count: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST casting-calls` / `PUT casting-calls/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastingCallInput {
    pub title: String,
    pub description: Option<String>,
    pub project_id: Option<Id>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub is_remote: bool,
    pub application_deadline: NaiveDate,
    pub shoot_date: Option<NaiveDate>,
    pub compensation: Option<String>,
    pub requirements: Vec<CastingRequirement>,
}
