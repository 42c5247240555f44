//! Field rules shared by the form derives, and the glue from `validator` to [`FieldErrors`].
//!
//! Single-field rules are declared with `#[derive(validator::Validate)]` on the form structs.
//! Rules spanning several fields (date order, toggles) are checked by hand on top of the
//! derived result with [`FieldErrors::check`].

use std::borrow::Cow;

use chrono::NaiveDate;
use validator::{ValidateEmail, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::FieldErrors;

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Run the derived rules of `form`.
pub(crate) fn schema_errors<T: validator::Validate>(form: &T) -> FieldErrors {
    validator::Validate::validate(form)
        .err()
        .map(FieldErrors::from)
        .unwrap_or_default()
}

impl From<ValidationErrors> for FieldErrors {
    /// Keeps the first message of each field. Nested rows use dotted keys
    /// (`requirements.0.role_name`), the way the backend reports them.
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        flatten(&errors, None, &mut out);
        out
    }
}

fn flatten(errors: &ValidationErrors, prefix: Option<&str>, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let key = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(error) = list.first() {
                    out.check(&key, false, message_of(error));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten(inner, Some(&key), out),
            ValidationErrorsKind::List(rows) => {
                for (index, inner) in rows {
                    flatten(inner, Some(&format!("{key}.{index}")), out);
                }
            }
        }
    }
}

fn message_of(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("Invalid value ({})", error.code),
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Non-blank text. Forms override the message with the field label.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "This field is required"));
    }
    Ok(())
}

/// Required email address. The backend does the authoritative check.
pub(crate) fn email_address(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid("required", "Email is required"));
    }
    if !value.validate_email() {
        return Err(invalid("email", "Enter a valid email address"));
    }
    Ok(())
}

pub(crate) fn password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Password is required"));
    }
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid("length", "Password must be at least 8 characters"));
    }
    Ok(())
}

/// Optional `http(s)` URL.
pub(crate) fn optional_http_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    let ok = value.is_empty()
        || url::Url::parse(value).is_ok_and(|u| matches!(u.scheme(), "http" | "https"));
    if !ok {
        return Err(invalid(
            "url",
            "Enter a valid URL starting with http:// or https://",
        ));
    }
    Ok(())
}

/// `end` may not precede `start` when both are set.
pub(crate) fn in_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => start <= end,
        _ => true,
    }
}

/// Trimmed text, `None` when blank.
pub(crate) fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
