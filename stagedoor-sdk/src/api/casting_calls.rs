//! `casting-calls/*`: public browsing and recruiter management.

use stagedoor_common::Id;
use stagedoor_common::casting::{CastingCall, CastingCallInput, CastingCallStatus};
use stagedoor_common::search::CastingCallFilters;

use super::page_query;
use crate::HttpClient;
use crate::envelope::{Envelope, Page};
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct CastingCallsApi {
    client: HttpClient,
}

impl CastingCallsApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET casting-calls` with filters: open calls visible to talents.
    pub async fn list(&self, filters: &CastingCallFilters) -> Result<Page<CastingCall>> {
        self.client
            .get_json_with_query("casting-calls", filters.to_pairs())
            .await
    }

    /// `GET casting-calls/{id}`.
    pub async fn get(&self, id: Id) -> Result<CastingCall> {
        let envelope: Envelope<CastingCall> =
            self.client.get_json(&format!("casting-calls/{id}")).await?;
        Ok(envelope.into_inner())
    }

    /// `GET recruiter/casting-calls?page=&status=`: the recruiter's own calls.
    pub async fn mine(
        &self,
        page: Option<u32>,
        status: Option<CastingCallStatus>,
    ) -> Result<Page<CastingCall>> {
        let query = page_query(page, status.as_ref().map(CastingCallStatus::as_str));
        self.client
            .get_json_with_query("recruiter/casting-calls", query)
            .await
    }

    /// `POST casting-calls`. New calls start as drafts.
    pub async fn create(&self, input: &CastingCallInput) -> Result<CastingCall> {
        let envelope: Envelope<CastingCall> = self.client.post_json("casting-calls", input).await?;
        Ok(envelope.into_inner())
    }

    /// `PUT casting-calls/{id}`.
    pub async fn update(&self, id: Id, input: &CastingCallInput) -> Result<CastingCall> {
        let envelope: Envelope<CastingCall> = self
            .client
            .put_json(&format!("casting-calls/{id}"), input)
            .await?;
        Ok(envelope.into_inner())
    }

    /// `DELETE casting-calls/{id}`.
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.client.delete(&format!("casting-calls/{id}")).await
    }

    /// `POST casting-calls/{id}/publish`.
    pub async fn publish(&self, id: Id) -> Result<CastingCall> {
        self.transition(id, "publish").await
    }

    /// `POST casting-calls/{id}/close`.
    pub async fn close(&self, id: Id) -> Result<CastingCall> {
        self.transition(id, "close").await
    }

    async fn transition(&self, id: Id, action: &str) -> Result<CastingCall> {
        let envelope: Envelope<CastingCall> = self
            .client
            .post_empty(&format!("casting-calls/{id}/{action}"))
            .await?;
        Ok(envelope.into_inner())
    }
}
