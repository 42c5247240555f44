//! Talent applications and the recruiter's review of them.

use serde::Serialize;
use stagedoor_common::Id;
use stagedoor_common::application::{Application, ApplicationInput, ApplicationStatus};

use super::page_query;
use crate::HttpClient;
use crate::envelope::{Envelope, Page};
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct ApplicationsApi {
    client: HttpClient,
}

#[derive(Serialize)]
struct StatusChange<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

impl ApplicationsApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET applications?page=&status=`: the talent's own applications.
    pub async fn mine(
        &self,
        page: Option<u32>,
        status: Option<ApplicationStatus>,
    ) -> Result<Page<Application>> {
        let query = page_query(page, status.as_ref().map(ApplicationStatus::as_str));
        self.client.get_json_with_query("applications", query).await
    }

    /// `POST casting-calls/{id}/apply`.
    pub async fn apply(&self, casting_call_id: Id, input: &ApplicationInput) -> Result<Application> {
        let envelope: Envelope<Application> = self
            .client
            .post_json(&format!("casting-calls/{casting_call_id}/apply"), input)
            .await?;
        Ok(envelope.into_inner())
    }

    /// `DELETE applications/{id}`.
    pub async fn withdraw(&self, id: Id) -> Result<()> {
        self.client.delete(&format!("applications/{id}")).await
    }

    /// `GET casting-calls/{id}/applications?page=&status=`: recruiter view.
    pub async fn for_casting_call(
        &self,
        casting_call_id: Id,
        page: Option<u32>,
        status: Option<ApplicationStatus>,
    ) -> Result<Page<Application>> {
        let query = page_query(page, status.as_ref().map(ApplicationStatus::as_str));
        self.client
            .get_json_with_query(&format!("casting-calls/{casting_call_id}/applications"), query)
            .await
    }

    /// `PATCH applications/{id}/status`.
    pub async fn update_status(
        &self,
        id: Id,
        status: ApplicationStatus,
        note: Option<&str>,
    ) -> Result<Application> {
        let body = StatusChange {
            status: status.as_str(),
            note,
        };
        let envelope: Envelope<Application> = self
            .client
            .patch_json(&format!("applications/{id}/status"), &body)
            .await?;
        Ok(envelope.into_inner())
    }
}
