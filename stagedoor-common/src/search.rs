//! Search filters and result rows.
//!
//! Filters render to ordered `(name, value)` pairs. The same pairs feed the request query
//! string and the client cache key, so two differently filtered result sets never share an
//! entry.

use serde::{Deserialize, Serialize};

use crate::{Id, casting::CastingCallStatus};

/// Row of a talent search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalentSummary {
    pub id: Id,
    pub user_id: Id,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TalentSearchFilters {
    pub query: Option<String>,
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub gender: Option<String>,
    pub age_min: Option<u8>,
    pub age_max: Option<u8>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl TalentSearchFilters {
    /// Non-empty filters as query pairs. Skills are joined with commas.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "q", self.query.as_deref());
        if !self.skills.is_empty() {
            pairs.push(("skills", self.skills.join(",")));
        }
        push_text(&mut pairs, "location", self.location.as_deref());
        push_text(&mut pairs, "gender", self.gender.as_deref());
        push_num(&mut pairs, "age_min", self.age_min);
        push_num(&mut pairs, "age_max", self.age_max);
        push_num(&mut pairs, "page", self.page);
        push_num(&mut pairs, "per_page", self.per_page);
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastingCallFilters {
    pub query: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub status: Option<CastingCallStatus>,
    pub is_remote: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CastingCallFilters {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "q", self.query.as_deref());
        push_text(&mut pairs, "category", self.category.as_deref());
        push_text(&mut pairs, "location", self.location.as_deref());
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(remote) = self.is_remote {
            pairs.push(("is_remote", if remote { "1" } else { "0" }.to_string()));
        }
        push_num(&mut pairs, "page", self.page);
        push_num(&mut pairs, "per_page", self.per_page);
        pairs
    }
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<&str>) {
    if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((name, v.to_string()));
    }
}

fn push_num<N: ToString>(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<N>) {
    if let Some(v) = value {
        pairs.push((name, v.to_string()));
    }
}
