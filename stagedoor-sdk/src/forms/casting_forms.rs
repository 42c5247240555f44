//! Casting call editor with its repeatable role requirement rows.
//!
//! Row errors use the backend's dotted keys (`requirements.0.role_name`) so client-side and
//! `422` messages land on the same row.

use chrono::NaiveDate;
use stagedoor_common::Id;
use stagedoor_common::casting::{CastingCall, CastingCallInput, CastingRequirement};

use super::rules::{in_order, not_blank, optional, schema_errors};
use super::{FieldErrors, Validate};
use validator::Validate as _;

/// One role the casting call wants to fill.
#[derive(Debug, Clone, Default, PartialEq, Eq, validator::Validate)]
pub struct RequirementRow {
    /// Set for rows loaded from an existing casting call.
    pub id: Option<Id>,
    #[validate(custom(function = "not_blank", message = "Role name is required"))]
    pub role_name: String,
    pub gender: String,
    pub age_min: Option<u8>,
    pub age_max: Option<u8>,
    pub skills: Vec<String>,
    pub description: String,
}

impl RequirementRow {
    fn from_requirement(requirement: &CastingRequirement) -> Self {
        Self {
            id: requirement.id,
            role_name: requirement.role_name.clone(),
            gender: requirement.gender.clone().unwrap_or_default(),
            age_min: requirement.age_min,
            age_max: requirement.age_max,
            skills: requirement.skills.clone(),
            description: requirement.description.clone().unwrap_or_default(),
        }
    }

    fn ages_in_order(&self) -> bool {
        match (self.age_min, self.age_max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }

    fn to_requirement(&self) -> CastingRequirement {
        CastingRequirement {
            id: self.id,
            role_name: self.role_name.trim().to_string(),
            gender: optional(&self.gender),
            age_min: self.age_min,
            age_max: self.age_max,
            skills: self.skills.iter().filter_map(|s| optional(s)).collect(),
            description: optional(&self.description),
        }
    }
}

#[derive(Debug, Clone, PartialEq, validator::Validate)]
pub struct CastingCallForm {
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 200, message = "Title may not be longer than 200 characters")
    )]
    pub title: String,
    #[validate(
        custom(function = "not_blank", message = "Description is required"),
        length(min = 20, message = "Description must be at least 20 characters")
    )]
    pub description: String,
    pub project_id: Option<Id>,
    pub category: String,
    pub location: String,
    pub is_remote: bool,
    #[validate(required(message = "Application deadline is required"))]
    pub application_deadline: Option<NaiveDate>,
    pub shoot_date: Option<NaiveDate>,
    pub compensation: String,
    #[validate(nested)]
    requirements: Vec<RequirementRow>,
}

impl Default for CastingCallForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CastingCallForm {
    /// Empty form with one blank requirement row.
    pub fn new() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            project_id: None,
            category: String::new(),
            location: String::new(),
            is_remote: false,
            application_deadline: None,
            shoot_date: None,
            compensation: String::new(),
            requirements: vec![RequirementRow::default()],
        }
    }

    pub fn from_casting_call(call: &CastingCall) -> Self {
        let mut requirements: Vec<_> = call
            .requirements
            .iter()
            .map(RequirementRow::from_requirement)
            .collect();
        if requirements.is_empty() {
            requirements.push(RequirementRow::default());
        }
        Self {
            title: call.title.clone(),
            description: call.description.clone().unwrap_or_default(),
            project_id: call.project_id,
            category: call.category.clone().unwrap_or_default(),
            location: call.location.clone().unwrap_or_default(),
            is_remote: call.is_remote,
            application_deadline: call.application_deadline,
            shoot_date: call.shoot_date,
            compensation: call.compensation.clone().unwrap_or_default(),
            requirements,
        }
    }

    pub fn requirements(&self) -> &[RequirementRow] {
        &self.requirements
    }

    pub fn requirement_mut(&mut self, index: usize) -> Option<&mut RequirementRow> {
        self.requirements.get_mut(index)
    }

    /// Append a blank row and return its index.
    pub fn add_requirement(&mut self) -> usize {
        self.requirements.push(RequirementRow::default());
        self.requirements.len() - 1
    }

    /// Remove a row. The last remaining row cannot be removed.
    pub fn remove_requirement(&mut self, index: usize) -> bool {
        if self.requirements.len() <= 1 || index >= self.requirements.len() {
            return false;
        }
        self.requirements.remove(index);
        true
    }
}

impl Validate for CastingCallForm {
    type Output = CastingCallInput;

    fn validate(&self) -> Result<CastingCallInput, FieldErrors> {
        let mut errors = schema_errors(self);
        errors
            .check(
                "location",
                self.is_remote || !self.location.trim().is_empty(),
                "Location is required unless the casting is remote",
            )
            .check(
                "shoot_date",
                in_order(self.application_deadline, self.shoot_date),
                "Shoot date cannot be before the application deadline",
            )
            .check(
                "requirements",
                !self.requirements.is_empty(),
                "Add at least one role",
            );
        for (index, row) in self.requirements.iter().enumerate() {
            errors.check(
                &format!("requirements.{index}.age_max"),
                row.ages_in_order(),
                "Maximum age must be at least the minimum age",
            );
        }
        errors.into_result()?;

        let Some(application_deadline) = self.application_deadline else {
            let mut errors = FieldErrors::new();
            errors.add("application_deadline", "Application deadline is required");
            return Err(errors);
        };
        Ok(CastingCallInput {
            title: self.title.trim().to_string(),
            description: optional(&self.description),
            project_id: self.project_id,
            category: optional(&self.category),
            location: optional(&self.location),
            is_remote: self.is_remote,
            application_deadline,
            shoot_date: self.shoot_date,
            compensation: optional(&self.compensation),
            requirements: self
                .requirements
                .iter()
                .map(RequirementRow::to_requirement)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CastingCallForm, NaiveDate, Validate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled() -> CastingCallForm {
        let mut form = CastingCallForm {
            title: "Lead role, stage play".into(),
            description: "Two-week run at the National Theatre, Lagos.".into(),
            location: "Lagos".into(),
            application_deadline: Some(date(2026, 11, 1)),
            shoot_date: Some(date(2026, 12, 1)),
            ..CastingCallForm::new()
        };
        form.requirement_mut(0).unwrap().role_name = "Amaka".into();
        form
    }

    #[test]
    fn last_row_cannot_be_removed() {
        let mut form = CastingCallForm::new();
        assert!(!form.remove_requirement(0));
        let second = form.add_requirement();
        assert_eq!(second, 1);
        assert!(form.remove_requirement(0));
        assert_eq!(form.requirements().len(), 1);
        assert!(!form.remove_requirement(5));
    }

    #[test]
    fn row_errors_use_dotted_keys() {
        let mut form = filled();
        let row = form.add_requirement();
        let added = form.requirement_mut(row).unwrap();
        added.age_min = Some(40);
        added.age_max = Some(30);

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.first("requirements.1.role_name"), Some("Role name is required"));
        assert!(errors.contains("requirements.1.age_max"));
        assert!(!errors.contains("requirements.0.role_name"));
    }

    #[test]
    fn shoot_date_follows_deadline() {
        let mut form = filled();
        form.shoot_date = Some(date(2026, 10, 1));
        assert!(form.validate().unwrap_err().contains("shoot_date"));
    }

    #[test]
    fn remote_casting_needs_no_location() {
        let mut form = filled();
        form.location.clear();
        assert!(form.validate().unwrap_err().contains("location"));
        form.is_remote = true;
        let input = form.validate().unwrap();
        assert_eq!(input.requirements.len(), 1);
        assert_eq!(input.requirements[0].role_name, "Amaka");
    }
}
