//! Dropdown reference data served by `public/*` endpoints.

use serde::{Deserialize, Serialize};

use crate::Id;

/// A selectable option (category, skill, location).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}
