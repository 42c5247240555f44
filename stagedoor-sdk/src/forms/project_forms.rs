use chrono::NaiveDate;
use stagedoor_common::project::{Project, ProjectInput};

use super::rules::{in_order, not_blank, optional, schema_errors};
use super::{FieldErrors, Validate};

/// Recruiter project editor.
///
/// Budget fields only exist for paid projects: turning `is_paid` off clears them.
#[derive(Debug, Clone, Default, PartialEq, validator::Validate)]
pub struct ProjectForm {
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 200, message = "Title may not be longer than 200 characters")
    )]
    pub title: String,
    #[validate(length(max = 5000, message = "Description may not be longer than 5000 characters"))]
    pub description: String,
    pub project_type: String,
    is_paid: bool,
    budget_min: Option<f64>,
    budget_max: Option<f64>,
    currency: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: String,
}

impl ProjectForm {
    pub fn from_project(project: &Project) -> Self {
        let mut form = Self {
            title: project.title.clone(),
            description: project.description.clone().unwrap_or_default(),
            project_type: project.project_type.clone().unwrap_or_default(),
            start_date: project.start_date,
            end_date: project.end_date,
            location: project.location.clone().unwrap_or_default(),
            ..Self::default()
        };
        form.set_paid(project.is_paid);
        form.set_budget(project.budget_min, project.budget_max);
        form.set_currency(project.currency.as_deref().unwrap_or_default());
        form
    }

    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    pub fn set_paid(&mut self, paid: bool) {
        self.is_paid = paid;
        if !paid {
            self.budget_min = None;
            self.budget_max = None;
            self.currency.clear();
        }
    }

    pub fn budget(&self) -> (Option<f64>, Option<f64>) {
        (self.budget_min, self.budget_max)
    }

    /// Ignored for unpaid projects.
    pub fn set_budget(&mut self, min: Option<f64>, max: Option<f64>) {
        if self.is_paid {
            self.budget_min = min;
            self.budget_max = max;
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Ignored for unpaid projects.
    pub fn set_currency(&mut self, currency: &str) {
        if self.is_paid {
            self.currency = currency.trim().to_ascii_uppercase();
        }
    }
}

impl Validate for ProjectForm {
    type Output = ProjectInput;

    fn validate(&self) -> Result<ProjectInput, FieldErrors> {
        let mut errors = schema_errors(self);
        errors.check(
            "end_date",
            in_order(self.start_date, self.end_date),
            "End date must be after the start date",
        );
        if self.is_paid {
            errors
                .check("budget_min", self.budget_min.is_some(), "Minimum budget is required")
                .check(
                    "budget_min",
                    self.budget_min.is_none_or(|b| b >= 0.0),
                    "Budget cannot be negative",
                )
                .check(
                    "budget_max",
                    match (self.budget_min, self.budget_max) {
                        (Some(min), Some(max)) => min <= max,
                        _ => true,
                    },
                    "Maximum budget must be at least the minimum budget",
                )
                .check(
                    "currency",
                    self.currency.is_empty() || self.currency.len() == 3,
                    "Use a 3-letter currency code",
                );
        }
        errors.into_result()?;
        Ok(ProjectInput {
            title: self.title.trim().to_string(),
            description: optional(&self.description),
            project_type: optional(&self.project_type),
            is_paid: self.is_paid,
            budget_min: self.budget_min.filter(|_| self.is_paid),
            budget_max: self.budget_max.filter(|_| self.is_paid),
            currency: optional(&self.currency).filter(|_| self.is_paid),
            start_date: self.start_date,
            end_date: self.end_date,
            location: optional(&self.location),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paid() -> ProjectForm {
        let mut form = ProjectForm {
            title: "Feature film: Harmattan".into(),
            ..ProjectForm::default()
        };
        form.set_paid(true);
        form.set_budget(Some(5000.0), Some(20000.0));
        form.set_currency("ngn");
        form
    }

    #[test]
    fn unpaid_toggle_clears_budget() {
        let mut form = paid();
        assert_eq!(form.currency(), "NGN");

        form.set_paid(false);
        assert_eq!(form.budget(), (None, None));
        assert_eq!(form.currency(), "");

        form.set_budget(Some(1.0), Some(2.0));
        assert_eq!(form.budget(), (None, None));

        let input = form.validate().unwrap();
        assert!(!input.is_paid);
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("budget_min").is_none());
        assert!(json.get("currency").is_none());
    }

    #[test]
    fn budget_range_must_be_ordered() {
        let mut form = paid();
        form.set_budget(Some(30000.0), Some(20000.0));
        assert!(form.validate().unwrap_err().contains("budget_max"));
    }

    #[test]
    fn paid_project_sends_budget() {
        let input = paid().validate().unwrap();
        assert_eq!(input.budget_min, Some(5000.0));
        assert_eq!(input.currency.as_deref(), Some("NGN"));
    }
}
