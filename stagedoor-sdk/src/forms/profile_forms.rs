//! Talent profile editing: profile details, skills, experience and education.
//!
//! Experience and education entries share the "current" toggle: switching it on clears the
//! end date, and an entry that is not current needs one.

use chrono::{NaiveDate, Utc};
use stagedoor_common::talent::{
    Education, EducationInput, Experience, ExperienceInput, NewSkill, ProfileUpdate, SkillLevel,
    TalentProfile,
};

use super::rules::{in_order, not_blank, optional, optional_http_url, schema_errors};
use super::{FieldErrors, Validate};

#[derive(Debug, Clone, Default, PartialEq, validator::Validate)]
pub struct ProfileForm {
    #[validate(custom(function = "not_blank", message = "First name is required"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank", message = "Last name is required"))]
    pub last_name: String,
    pub phone: String,
    #[validate(length(max = 150, message = "Headline may not be longer than 150 characters"))]
    pub headline: String,
    #[validate(length(max = 1000, message = "Bio may not be longer than 1000 characters"))]
    pub bio: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    #[validate(range(min = 50, max = 272, message = "Height must be between 50 and 272 cm"))]
    pub height_cm: Option<u16>,
    #[validate(range(min = 20, max = 350, message = "Weight must be between 20 and 350 kg"))]
    pub weight_kg: Option<u16>,
    pub location: String,
    #[validate(custom(function = "optional_http_url"))]
    pub website: String,
    pub languages: Vec<String>,
    pub is_available: bool,
}

impl ProfileForm {
    /// Form pre-filled from the loaded profile.
    pub fn from_profile(profile: &TalentProfile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone: String::new(),
            headline: profile.headline.clone().unwrap_or_default(),
            bio: profile.bio.clone().unwrap_or_default(),
            date_of_birth: profile.date_of_birth,
            gender: profile.gender.clone().unwrap_or_default(),
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            location: profile.location.clone().unwrap_or_default(),
            website: profile.website.clone().unwrap_or_default(),
            languages: profile.languages.clone(),
            is_available: profile.is_available,
        }
    }
}

impl Validate for ProfileForm {
    type Output = ProfileUpdate;

    fn validate(&self) -> Result<ProfileUpdate, FieldErrors> {
        let today = Utc::now().date_naive();
        let mut errors = schema_errors(self);
        errors.check(
            "date_of_birth",
            self.date_of_birth.is_none_or(|d| d < today),
            "Date of birth must be in the past",
        );
        errors.into_result()?;
        Ok(ProfileUpdate {
            first_name: Some(self.first_name.trim().to_string()),
            last_name: Some(self.last_name.trim().to_string()),
            phone: optional(&self.phone),
            headline: optional(&self.headline),
            bio: optional(&self.bio),
            date_of_birth: self.date_of_birth,
            gender: optional(&self.gender),
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            location: optional(&self.location),
            website: optional(&self.website),
            languages: self
                .languages
                .iter()
                .filter_map(|l| optional(l))
                .collect(),
            is_available: Some(self.is_available),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, validator::Validate)]
pub struct SkillForm {
    #[validate(
        custom(function = "not_blank", message = "Skill name is required"),
        length(max = 100, message = "Skill name may not be longer than 100 characters")
    )]
    pub name: String,
    pub level: SkillLevel,
    #[validate(range(max = 80, message = "Years of experience must be 80 or less"))]
    pub years_of_experience: Option<u8>,
}

impl Validate for SkillForm {
    type Output = NewSkill;

    fn validate(&self) -> Result<NewSkill, FieldErrors> {
        schema_errors(self).into_result()?;
        Ok(NewSkill {
            name: self.name.trim().to_string(),
            level: self.level,
            years_of_experience: self.years_of_experience,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, validator::Validate)]
pub struct ExperienceForm {
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,
    pub company: String,
    pub location: String,
    #[validate(required(message = "Start date is required"))]
    pub start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    is_current: bool,
    #[validate(length(max = 2000, message = "Description may not be longer than 2000 characters"))]
    pub description: String,
}

impl ExperienceForm {
    pub fn from_experience(experience: &Experience) -> Self {
        Self {
            title: experience.title.clone(),
            company: experience.company.clone().unwrap_or_default(),
            location: experience.location.clone().unwrap_or_default(),
            start_date: Some(experience.start_date),
            end_date: if experience.is_current {
                None
            } else {
                experience.end_date
            },
            is_current: experience.is_current,
            description: experience.description.clone().unwrap_or_default(),
        }
    }

    pub fn is_current(&self) -> bool {
        self.is_current
    }

    /// Toggle "I currently work here". Switching it on clears the end date.
    pub fn set_current(&mut self, current: bool) {
        self.is_current = current;
        if current {
            self.end_date = None;
        }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Ignored while the entry is current.
    pub fn set_end_date(&mut self, end_date: Option<NaiveDate>) {
        if !self.is_current {
            self.end_date = end_date;
        }
    }
}

impl Validate for ExperienceForm {
    type Output = ExperienceInput;

    fn validate(&self) -> Result<ExperienceInput, FieldErrors> {
        let mut errors = schema_errors(self);
        check_period(&mut errors, self.start_date, self.end_date, self.is_current);
        errors.into_result()?;
        let Some(start_date) = self.start_date else {
            return Err(errors_for_missing_start());
        };
        Ok(ExperienceInput {
            title: self.title.trim().to_string(),
            company: optional(&self.company),
            location: optional(&self.location),
            start_date,
            end_date: self.end_date.filter(|_| !self.is_current),
            is_current: self.is_current,
            description: optional(&self.description),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, validator::Validate)]
pub struct EducationForm {
    #[validate(custom(function = "not_blank", message = "Institution is required"))]
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    #[validate(required(message = "Start date is required"))]
    pub start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    is_current: bool,
    #[validate(length(max = 2000, message = "Description may not be longer than 2000 characters"))]
    pub description: String,
}

impl EducationForm {
    pub fn from_education(education: &Education) -> Self {
        Self {
            institution: education.institution.clone(),
            degree: education.degree.clone().unwrap_or_default(),
            field_of_study: education.field_of_study.clone().unwrap_or_default(),
            start_date: Some(education.start_date),
            end_date: if education.is_current {
                None
            } else {
                education.end_date
            },
            is_current: education.is_current,
            description: education.description.clone().unwrap_or_default(),
        }
    }

    pub fn is_current(&self) -> bool {
        self.is_current
    }

    /// Toggle "currently studying here". Switching it on clears the end date.
    pub fn set_current(&mut self, current: bool) {
        self.is_current = current;
        if current {
            self.end_date = None;
        }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Ignored while the entry is current.
    pub fn set_end_date(&mut self, end_date: Option<NaiveDate>) {
        if !self.is_current {
            self.end_date = end_date;
        }
    }
}

impl Validate for EducationForm {
    type Output = EducationInput;

    fn validate(&self) -> Result<EducationInput, FieldErrors> {
        let mut errors = schema_errors(self);
        check_period(&mut errors, self.start_date, self.end_date, self.is_current);
        errors.into_result()?;
        let Some(start_date) = self.start_date else {
            return Err(errors_for_missing_start());
        };
        Ok(EducationInput {
            institution: self.institution.trim().to_string(),
            degree: optional(&self.degree),
            field_of_study: optional(&self.field_of_study),
            start_date,
            end_date: self.end_date.filter(|_| !self.is_current),
            is_current: self.is_current,
            description: optional(&self.description),
        })
    }
}

/// A finished entry needs an end date that does not precede its start.
fn check_period(
    errors: &mut FieldErrors,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    is_current: bool,
) {
    if is_current {
        return;
    }
    errors
        .check("end_date", end.is_some(), "End date is required")
        .check(
            "end_date",
            in_order(start, end),
            "End date must be after the start date",
        );
}

fn errors_for_missing_start() -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.add("start_date", "Start date is required");
    errors
}
