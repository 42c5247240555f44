//! Recruiter `projects`.

use stagedoor_common::Id;
use stagedoor_common::project::{Project, ProjectInput, ProjectStatus};

use super::page_query;
use crate::HttpClient;
use crate::envelope::{Envelope, Page};
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct ProjectsApi {
    client: HttpClient,
}

impl ProjectsApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET projects?page=&status=`: the recruiter's own projects.
    pub async fn list(&self, page: Option<u32>, status: Option<ProjectStatus>) -> Result<Page<Project>> {
        let query = page_query(page, status.as_ref().map(ProjectStatus::as_str));
        self.client.get_json_with_query("projects", query).await
    }

    /// `GET projects/{id}`.
    pub async fn get(&self, id: Id) -> Result<Project> {
        let envelope: Envelope<Project> = self.client.get_json(&format!("projects/{id}")).await?;
        Ok(envelope.into_inner())
    }

    /// `POST projects`.
    pub async fn create(&self, input: &ProjectInput) -> Result<Project> {
        let envelope: Envelope<Project> = self.client.post_json("projects", input).await?;
        Ok(envelope.into_inner())
    }

    /// `PUT projects/{id}`.
    pub async fn update(&self, id: Id, input: &ProjectInput) -> Result<Project> {
        let envelope: Envelope<Project> =
            self.client.put_json(&format!("projects/{id}"), input).await?;
        Ok(envelope.into_inner())
    }

    /// `DELETE projects/{id}`.
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.client.delete(&format!("projects/{id}")).await
    }
}
