//! `recruiter/profile`.

use stagedoor_common::recruiter::{RecruiterProfile, RecruiterProfileUpdate};

use crate::HttpClient;
use crate::envelope::Envelope;
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct RecruitersApi {
    client: HttpClient,
}

impl RecruitersApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET recruiter/profile`.
    pub async fn profile(&self) -> Result<RecruiterProfile> {
        let envelope: Envelope<RecruiterProfile> = self.client.get_json("recruiter/profile").await?;
        Ok(envelope.into_inner())
    }

    /// `PUT recruiter/profile`.
    pub async fn update_profile(&self, update: &RecruiterProfileUpdate) -> Result<RecruiterProfile> {
        let envelope: Envelope<RecruiterProfile> =
            self.client.put_json("recruiter/profile", update).await?;
        Ok(envelope.into_inner())
    }
}
