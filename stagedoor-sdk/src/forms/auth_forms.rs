//! Sign-in, sign-up and password forms.

use stagedoor_common::UserType;

pub use super::rules::MIN_PASSWORD_LEN;
use super::rules::{email_address, not_blank, optional, password, schema_errors};
use super::{FieldErrors, Validate};
use crate::api::{Credentials, NewAccount, PasswordChange, PasswordReset};

#[derive(Clone, Default, PartialEq, Eq, validator::Validate)]
pub struct LoginForm {
    #[validate(custom(function = "email_address"))]
    pub email: String,
    #[validate(custom(function = "not_blank", message = "Password is required"))]
    pub password: String,
    pub remember: bool,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("remember", &self.remember)
            .finish_non_exhaustive()
    }
}

impl Validate for LoginForm {
    type Output = Credentials;

    fn validate(&self) -> Result<Credentials, FieldErrors> {
        schema_errors(self).into_result()?;
        Ok(Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            remember: self.remember,
        })
    }
}

#[derive(Clone, PartialEq, Eq, validator::Validate)]
pub struct RegistrationForm {
    #[validate(
        custom(function = "not_blank", message = "First name is required"),
        length(max = 100, message = "First name may not be longer than 100 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "not_blank", message = "Last name is required"),
        length(max = 100, message = "Last name may not be longer than 100 characters")
    )]
    pub last_name: String,
    #[validate(custom(function = "email_address"))]
    pub email: String,
    #[validate(custom(function = "password"))]
    pub password: String,
    #[validate(
        custom(function = "not_blank", message = "Password confirmation is required"),
        must_match(other = "password", message = "Passwords do not match")
    )]
    pub password_confirmation: String,
    pub user_type: UserType,
    pub phone: String,
    pub accept_terms: bool,
}

impl RegistrationForm {
    /// Empty form for the role picked on the landing page.
    pub fn new(user_type: UserType) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
            password_confirmation: String::new(),
            user_type,
            phone: String::new(),
            accept_terms: false,
        }
    }
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("email", &self.email)
            .field("user_type", &self.user_type)
            .finish_non_exhaustive()
    }
}

impl Validate for RegistrationForm {
    type Output = NewAccount;

    fn validate(&self) -> Result<NewAccount, FieldErrors> {
        let mut errors = schema_errors(self);
        errors.check(
            "accept_terms",
            self.accept_terms,
            "You must accept the terms and conditions",
        );
        errors.into_result()?;
        Ok(NewAccount {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            password_confirmation: self.password_confirmation.clone(),
            user_type: self.user_type,
            phone: optional(&self.phone),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, validator::Validate)]
pub struct ForgotPasswordForm {
    #[validate(custom(function = "email_address"))]
    pub email: String,
}

impl Validate for ForgotPasswordForm {
    type Output = String;

    fn validate(&self) -> Result<String, FieldErrors> {
        schema_errors(self).into_result()?;
        Ok(self.email.trim().to_string())
    }
}

/// Reset form reached from the emailed link; `email` and `token` come from its query string.
#[derive(Clone, Default, PartialEq, Eq, validator::Validate)]
pub struct ResetPasswordForm {
    #[validate(custom(function = "email_address"))]
    pub email: String,
    #[validate(custom(function = "not_blank", message = "Reset link is required"))]
    pub token: String,
    #[validate(custom(function = "password"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

impl std::fmt::Debug for ResetPasswordForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetPasswordForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Validate for ResetPasswordForm {
    type Output = PasswordReset;

    fn validate(&self) -> Result<PasswordReset, FieldErrors> {
        schema_errors(self).into_result()?;
        Ok(PasswordReset {
            email: self.email.trim().to_string(),
            token: self.token.trim().to_string(),
            password: self.password.clone(),
            password_confirmation: self.password_confirmation.clone(),
        })
    }
}

/// Password change from the account settings page.
#[derive(Clone, Default, PartialEq, Eq, validator::Validate)]
pub struct ChangePasswordForm {
    #[validate(custom(function = "not_blank", message = "Current password is required"))]
    pub current_password: String,
    #[validate(custom(function = "password"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

impl std::fmt::Debug for ChangePasswordForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordForm").finish_non_exhaustive()
    }
}

impl Validate for ChangePasswordForm {
    type Output = PasswordChange;

    fn validate(&self) -> Result<PasswordChange, FieldErrors> {
        let mut errors = schema_errors(self);
        errors.check(
            "password",
            self.password != self.current_password,
            "New password must differ from the current one",
        );
        errors.into_result()?;
        Ok(PasswordChange {
            current_password: self.current_password.clone(),
            password: self.password.clone(),
            password_confirmation: self.password_confirmation.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormState;
    use crate::test_support::test_client;
    use httpmock::prelude::*;

    const PASSWORD_MISMATCH: &str = "Passwords do not match";

    fn filled_registration() -> RegistrationForm {
        RegistrationForm {
            first_name: " Kemi ".into(),
            last_name: "Adeyemi".into(),
            email: "kemi@example.com".into(),
            password: "abcdefgh".into(),
            password_confirmation: "abcdefgh".into(),
            phone: " ".into(),
            accept_terms: true,
            ..RegistrationForm::new(UserType::Talent)
        }
    }

    #[test]
    fn registration_produces_trimmed_body() {
        let account = filled_registration().validate().unwrap();
        assert_eq!(account.first_name, "Kemi");
        assert_eq!(account.user_type, UserType::Talent);
        assert!(account.phone.is_none());
    }

    #[tokio::test]
    async fn password_mismatch_blocks_submit_without_a_request() {
        let server = MockServer::start_async().await;
        let register = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/auth/register");
                then.status(201);
            })
            .await;
        let (client, _nav) = test_client(&server.url("/api/v1/"));

        let mut form = FormState::new(RegistrationForm {
            password_confirmation: "abcdefg1".into(),
            ..filled_registration()
        });
        let auth = client.auth();
        let result = form
            .submit(|account| async move { auth.register(&account).await })
            .await;

        assert!(result.is_err());
        assert_eq!(form.error("password_confirmation"), Some(PASSWORD_MISMATCH));
        assert_eq!(register.hits_async().await, 0);
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.first("email"), Some("Email is required"));
        assert_eq!(errors.first("password"), Some("Password is required"));
    }

    #[test]
    fn change_password_rejects_reuse() {
        let form = ChangePasswordForm {
            current_password: "abcdefgh".into(),
            password: "abcdefgh".into(),
            password_confirmation: "abcdefgh".into(),
        };
        assert!(form.validate().unwrap_err().contains("password"));
    }

    #[test]
    fn debug_hides_passwords() {
        let form = LoginForm {
            email: "kemi@example.com".into(),
            password: "hunter22".into(),
            remember: true,
        };
        assert!(!format!("{form:?}").contains("hunter22"));
    }
}
