//! Dropdown reference data under `public/*`.

use stagedoor_common::reference::ReferenceItem;

use crate::HttpClient;
use crate::envelope::Envelope;
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct ReferenceApi {
    client: HttpClient,
}

/// Everything the casting-call form needs before it can render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastingFormData {
    pub categories: Vec<ReferenceItem>,
    pub skills: Vec<ReferenceItem>,
    pub locations: Vec<ReferenceItem>,
}

impl ReferenceApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET public/categories`.
    pub async fn categories(&self) -> Result<Vec<ReferenceItem>> {
        self.list("public/categories").await
    }

    /// `GET public/skills`.
    pub async fn skills(&self) -> Result<Vec<ReferenceItem>> {
        self.list("public/skills").await
    }

    /// `GET public/locations`.
    pub async fn locations(&self) -> Result<Vec<ReferenceItem>> {
        self.list("public/locations").await
    }

    /// The three lists above, fetched concurrently. Fails if any of them fails.
    pub async fn casting_form_data(&self) -> Result<CastingFormData> {
        let (categories, skills, locations) =
            futures_util::try_join!(self.categories(), self.skills(), self.locations())?;
        Ok(CastingFormData {
            categories,
            skills,
            locations,
        })
    }

    async fn list(&self, path: &str) -> Result<Vec<ReferenceItem>> {
        let envelope: Envelope<Vec<ReferenceItem>> = self.client.get_json(path).await?;
        Ok(envelope.into_inner())
    }
}
