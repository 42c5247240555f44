//! Typed wrappers over the REST endpoints, one handle per resource.
//!
//! Every function maps to exactly one request (except the composed
//! [`ReferenceApi::casting_form_data`]) and returns the canonical shape documented on it.
//! Errors are the adapter's, propagated untouched.

pub mod applications;
pub mod auth;
pub mod casting_calls;
pub mod messages;
pub mod notifications;
pub mod projects;
pub mod recruiters;
pub mod reference;
pub mod search;
pub mod talents;
pub mod verification;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::HttpClient;
use crate::errors::Result;

pub use applications::ApplicationsApi;
pub use auth::{
    Acknowledgement, AuthApi, AuthSession, Credentials, NewAccount, PasswordChange, PasswordReset,
};
pub use casting_calls::CastingCallsApi;
pub use messages::MessagesApi;
pub use notifications::NotificationsApi;
pub use projects::ProjectsApi;
pub use recruiters::RecruitersApi;
pub use reference::{CastingFormData, ReferenceApi};
pub use search::SearchApi;
pub use talents::TalentsApi;
pub use verification::VerificationApi;

/// A file picked by the user, ready to be sent as one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    /// MIME type, e.g. `image/jpeg`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub(crate) fn into_part(self) -> Result<Part> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?)
    }

    /// Single-part form with this file under `field`.
    pub(crate) fn into_form(self, field: &'static str) -> Result<Form> {
        Ok(Form::new().part(field, self.into_part()?))
    }
}

/// `{"count": n}` or `{"unread_count": n}`, optionally under `data`.
#[derive(Debug, Deserialize)]
pub(crate) struct Count {
    #[serde(alias = "unread_count", alias = "total")]
    pub(crate) count: u64,
}

/// Page and status filters shared by the owner listings.
pub(crate) fn page_query(page: Option<u32>, status: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(page) = page {
        query.push(("page", page.to_string()));
    }
    if let Some(status) = status {
        query.push(("status", status.to_string()));
    }
    query
}

impl HttpClient {
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    pub fn talents(&self) -> TalentsApi {
        TalentsApi::new(self.clone())
    }

    pub fn recruiters(&self) -> RecruitersApi {
        RecruitersApi::new(self.clone())
    }

    pub fn projects(&self) -> ProjectsApi {
        ProjectsApi::new(self.clone())
    }

    pub fn applications(&self) -> ApplicationsApi {
        ApplicationsApi::new(self.clone())
    }

    pub fn messages(&self) -> MessagesApi {
        MessagesApi::new(self.clone())
    }

    pub fn notifications(&self) -> NotificationsApi {
        NotificationsApi::new(self.clone())
    }

    pub fn casting_calls(&self) -> CastingCallsApi {
        CastingCallsApi::new(self.clone())
    }

    pub fn search(&self) -> SearchApi {
        SearchApi::new(self.clone())
    }

    pub fn verification(&self) -> VerificationApi {
        VerificationApi::new(self.clone())
    }

    pub fn reference(&self) -> ReferenceApi {
        ReferenceApi::new(self.clone())
    }
}
