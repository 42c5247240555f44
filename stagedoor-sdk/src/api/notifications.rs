//! In-app `notifications`.

use stagedoor_common::Id;
use stagedoor_common::notification::Notification;

use super::Count;
use crate::HttpClient;
use crate::envelope::{Envelope, Page};
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct NotificationsApi {
    client: HttpClient,
}

impl NotificationsApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET notifications?page=&unread=1`.
    pub async fn list(&self, page: Option<u32>, unread_only: bool) -> Result<Page<Notification>> {
        let mut query = Vec::new();
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        if unread_only {
            query.push(("unread", "1".to_string()));
        }
        self.client.get_json_with_query("notifications", query).await
    }

    /// `GET notifications/unread-count`.
    pub async fn unread_count(&self) -> Result<u64> {
        let envelope: Envelope<Count> = self.client.get_json("notifications/unread-count").await?;
        Ok(envelope.into_inner().count)
    }

    /// `POST notifications/{id}/read`.
    pub async fn mark_read(&self, id: Id) -> Result<()> {
        let _: serde::de::IgnoredAny = self
            .client
            .post_empty(&format!("notifications/{id}/read"))
            .await?;
        Ok(())
    }

    /// `POST notifications/read-all`.
    pub async fn mark_all_read(&self) -> Result<()> {
        let _: serde::de::IgnoredAny = self.client.post_empty("notifications/read-all").await?;
        Ok(())
    }

    /// `DELETE notifications/{id}`.
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.client.delete(&format!("notifications/{id}")).await
    }
}
