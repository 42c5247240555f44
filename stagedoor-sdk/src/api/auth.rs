//! `auth/*` endpoints.
//!
//! Credential checks (`login`, `register`, `verify-email`) are sent without the adapter's
//! global `401` teardown: for them a `401` means "wrong password", not "session expired".

use reqwest::Method;
use serde::{Deserialize, Serialize};
use stagedoor_common::{User, UserType};

use crate::HttpClient;
use crate::client::http::{OnUnauthorized, decode_json};
use crate::envelope::Envelope;
use crate::errors::Result;

/// Body of `POST auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub remember: bool,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            remember: false,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("remember", &self.remember)
            .finish_non_exhaustive()
    }
}

/// Body of `POST auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("user_type", &self.user_type)
            .finish_non_exhaustive()
    }
}

/// Body of `POST auth/reset-password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordReset {
    pub email: String,
    pub token: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Body of `PUT auth/password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub password: String,
    pub password_confirmation: String,
}

/// What `login`, `register` and `verify-email` return.
///
/// `token` is absent when the backend requires email verification before issuing one.
#[derive(Clone, PartialEq, Deserialize)]
pub struct AuthSession {
    pub user: User,
    #[serde(default, alias = "access_token")]
    pub token: Option<String>,
    #[serde(default)]
    pub requires_verification: bool,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user.id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("requires_verification", &self.requires_verification)
            .finish()
    }
}

/// `{"message": "..."}` acknowledgements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

/// `auth/*` endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: HttpClient,
}

impl AuthApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `POST auth/login`.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession> {
        self.credential_check("auth/login", credentials).await
    }

    /// `POST auth/register`.
    pub async fn register(&self, account: &NewAccount) -> Result<AuthSession> {
        self.credential_check("auth/register", account).await
    }

    /// `POST auth/verify-email` with the 6-digit code.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<AuthSession> {
        let body = serde_json::json!({ "email": email, "code": code });
        self.credential_check("auth/verify-email", &body).await
    }

    /// `POST auth/logout`. Invalidates the bearer token server-side.
    pub async fn logout(&self) -> Result<()> {
        let builder = self.client.request(Method::POST, "auth/logout")?;
        self.client
            .send_with(builder, OnUnauthorized::Report)
            .await?;
        Ok(())
    }

    /// `GET auth/me`: the user behind the current token.
    pub async fn me(&self) -> Result<User> {
        let envelope: Envelope<MeBody> = self.client.get_json("auth/me").await?;
        Ok(envelope.into_inner().into_user())
    }

    /// `POST auth/resend-verification`.
    pub async fn resend_verification(&self, email: &str) -> Result<Acknowledgement> {
        let body = serde_json::json!({ "email": email });
        let ack: Option<Acknowledgement> = self
            .client
            .post_json("auth/resend-verification", &body)
            .await?;
        Ok(ack.unwrap_or_default())
    }

    /// `POST auth/forgot-password`.
    pub async fn forgot_password(&self, email: &str) -> Result<Acknowledgement> {
        let body = serde_json::json!({ "email": email });
        let ack: Option<Acknowledgement> =
            self.client.post_json("auth/forgot-password", &body).await?;
        Ok(ack.unwrap_or_default())
    }

    /// `POST auth/reset-password`.
    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<Acknowledgement> {
        let ack: Option<Acknowledgement> =
            self.client.post_json("auth/reset-password", reset).await?;
        Ok(ack.unwrap_or_default())
    }

    /// `PUT auth/password`.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<Acknowledgement> {
        let ack: Option<Acknowledgement> = self.client.put_json("auth/password", change).await?;
        Ok(ack.unwrap_or_default())
    }

    async fn credential_check<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthSession> {
        let builder = self.client.request(Method::POST, path)?.json(body);
        let response = self
            .client
            .send_with(builder, OnUnauthorized::Report)
            .await?;
        let envelope: Envelope<AuthSession> = decode_json(response).await?;
        Ok(envelope.into_inner())
    }
}

/// `auth/me` answers with either the user or `{"user": {..}}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum MeBody {
    Keyed { user: User },
    Plain(User),
}

impl MeBody {
    fn into_user(self) -> User {
        match self {
            MeBody::Keyed { user } | MeBody::Plain(user) => user,
        }
    }
}
