//! Form state and client-side validation.
//!
//! A form is a plain struct of editable values implementing [`Validate`], which either
//! produces the typed request body or a [`FieldErrors`] map. [`FormState`] wraps a form for a
//! view: it blocks submission while the values are invalid (no request is made) and merges a
//! server `422` field map into the same errors the client-side checks use.

pub mod auth_forms;
pub mod casting_forms;
pub mod field_errors;
pub mod message_form;
pub mod otp;
pub mod profile_forms;
pub mod project_forms;
mod rules;

use std::future::Future;

pub use auth_forms::{
    ChangePasswordForm, ForgotPasswordForm, LoginForm, RegistrationForm, ResetPasswordForm,
};
pub use casting_forms::{CastingCallForm, RequirementRow};
pub use field_errors::FieldErrors;
pub use message_form::MessageForm;
pub use otp::{OTP_LENGTH, OtpEvent, OtpInput};
pub use profile_forms::{EducationForm, ExperienceForm, ProfileForm, SkillForm};
pub use project_forms::ProjectForm;

use crate::errors::{Error, Result};

/// Schema check of a form's current values.
pub trait Validate {
    /// Request body produced by valid values.
    type Output;

    fn validate(&self) -> std::result::Result<Self::Output, FieldErrors>;
}

/// One form as seen by a view.
#[derive(Debug, Clone, Default)]
pub struct FormState<F> {
    values: F,
    errors: FieldErrors,
    submitting: bool,
}

impl<F: Validate> FormState<F> {
    pub fn new(values: F) -> Self {
        Self {
            values,
            errors: FieldErrors::new(),
            submitting: false,
        }
    }

    pub fn values(&self) -> &F {
        &self.values
    }

    /// Edit the values. Errors shown so far stay until the next check or submit.
    pub fn values_mut(&mut self) -> &mut F {
        &mut self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Message shown next to `field`.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.first(field)
    }

    /// Drop the message of one field, typically when the user edits it.
    pub fn clear_error(&mut self, field: &str) {
        self.errors.clear_field(field);
    }

    pub fn is_valid(&self) -> bool {
        self.values.validate().is_ok()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Run validation and show its errors. Returns whether the values are valid.
    pub fn check(&mut self) -> bool {
        match self.values.validate() {
            Ok(_) => {
                self.errors = FieldErrors::new();
                true
            }
            Err(errors) => {
                self.errors = errors;
                false
            }
        }
    }

    /// Validate, then hand the request body to `send`.
    ///
    /// Invalid values return [`Error::Form`] without calling `send`. A `422` returned by
    /// `send` has its field map merged into [`FormState::errors`].
    pub async fn submit<T, S, Fut>(&mut self, send: S) -> Result<T>
    where
        S: FnOnce(F::Output) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let body = match self.values.validate() {
            Ok(body) => body,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(Error::Form(errors));
            }
        };
        self.errors = FieldErrors::new();

        let result = {
            let _submitting = Submitting::start(&mut self.submitting);
            send(body).await
        };

        if let Err(e) = &result {
            if let Some(fields) = e.field_errors() {
                self.errors.merge(fields.clone());
            }
        }
        result
    }
}

/// Clears the submitting flag even when the submit future is dropped.
struct Submitting<'a>(&'a mut bool);

impl<'a> Submitting<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}
