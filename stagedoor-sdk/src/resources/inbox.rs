//! Messaging and notifications.
//!
//! There is no push channel: the conversation list, the open thread and the unread badges are
//! kept current by polling at the intervals from `[polling]`.

use stagedoor_common::Id;
use stagedoor_common::message::{Conversation, Message, NewConversation};
use stagedoor_common::notification::Notification;

use super::Stagedoor;
use super::keys::{self, family};
use crate::envelope::Page;
use crate::errors::Result;
use crate::query::{Polled, QueryKey, QueryResult};

impl Stagedoor {
    // === Reads ===

    pub async fn conversations(&self) -> QueryResult<Vec<Conversation>> {
        let api = self.client.messages();
        self.query(keys::conversations(), async move { api.conversations().await })
            .await
    }

    pub async fn thread(&self, conversation_id: Id) -> QueryResult<Vec<Message>> {
        let api = self.client.messages();
        self.query(keys::thread(conversation_id), async move {
            api.thread(conversation_id).await
        })
        .await
    }

    pub async fn unread_messages(&self) -> QueryResult<u64> {
        let api = self.client.messages();
        self.query(keys::unread_messages(), async move { api.unread_count().await })
            .await
    }

    pub async fn notifications(
        &self,
        page: Option<u32>,
        unread_only: bool,
    ) -> QueryResult<Page<Notification>> {
        let api = self.client.notifications();
        self.query(keys::notifications(page, unread_only), async move {
            api.list(page, unread_only).await
        })
        .await
    }

    pub async fn unread_notifications(&self) -> QueryResult<u64> {
        let api = self.client.notifications();
        self.query(keys::unread_notifications(), async move {
            api.unread_count().await
        })
        .await
    }

    // === Polling ===

    /// Keep the conversation list current while the inbox is open.
    pub fn poll_conversations(&self) -> Polled<Vec<Conversation>> {
        let api = self.client.messages();
        let interval = Self::poll_interval(self.config().polling.conversations_secs);
        self.cache.poll(keys::conversations(), interval, move || {
            let api = api.clone();
            async move { api.conversations().await }
        })
    }

    /// Keep the open thread current.
    pub fn poll_thread(&self, conversation_id: Id) -> Polled<Vec<Message>> {
        let api = self.client.messages();
        let interval = Self::poll_interval(self.config().polling.thread_secs);
        self.cache
            .poll(keys::thread(conversation_id), interval, move || {
                let api = api.clone();
                async move { api.thread(conversation_id).await }
            })
    }

    /// Unread notification badge.
    pub fn poll_unread_notifications(&self) -> Polled<u64> {
        let api = self.client.notifications();
        let interval = Self::poll_interval(self.config().polling.notifications_secs);
        self.cache
            .poll(keys::unread_notifications(), interval, move || {
                let api = api.clone();
                async move { api.unread_count().await }
            })
    }

    /// Unread message badge, on the notification interval.
    pub fn poll_unread_messages(&self) -> Polled<u64> {
        let api = self.client.messages();
        let interval = Self::poll_interval(self.config().polling.notifications_secs);
        self.cache.poll(keys::unread_messages(), interval, move || {
            let api = api.clone();
            async move { api.unread_count().await }
        })
    }

    // === Writes ===

    pub async fn send_message(&self, conversation_id: Id, body: &str) -> Result<Message> {
        let api = self.client.messages();
        self.mutate(
            [keys::thread(conversation_id), family(keys::CONVERSATIONS)],
            api.send(conversation_id, body),
        )
        .await
    }

    /// Message someone new (from a profile or an application).
    pub async fn start_conversation(&self, new: &NewConversation) -> Result<Conversation> {
        let api = self.client.messages();
        self.mutate(
            [family(keys::CONVERSATIONS), family(keys::THREADS)],
            api.start_conversation(new),
        )
        .await
    }

    pub async fn mark_conversation_read(&self, conversation_id: Id) -> Result<()> {
        let api = self.client.messages();
        self.mutate(
            [family(keys::CONVERSATIONS), family(keys::UNREAD_MESSAGES)],
            api.mark_read(conversation_id),
        )
        .await
    }

    pub async fn mark_notification_read(&self, id: Id) -> Result<()> {
        let api = self.client.notifications();
        self.mutate(notification_families(), api.mark_read(id)).await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        let api = self.client.notifications();
        self.mutate(notification_families(), api.mark_all_read())
            .await
    }

    pub async fn delete_notification(&self, id: Id) -> Result<()> {
        let api = self.client.notifications();
        self.mutate(notification_families(), api.delete(id)).await
    }
}

fn notification_families() -> [QueryKey; 2] {
    [
        family(keys::NOTIFICATIONS),
        family(keys::UNREAD_NOTIFICATIONS),
    ]
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::test_support::signed_in_client;

    fn message_json(id: u64, body: &str) -> serde_json::Value {
        json!({ "id": id, "conversation_id": 5, "sender_id": 11, "body": body })
    }

    #[tokio::test]
    async fn sending_refreshes_the_thread_only() {
        let server = MockServer::start_async().await;
        let thread = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/messages/conversations/5");
                then.status(200).json_body(json!({ "data": [message_json(1, "Hello")] }));
            })
            .await;
        let other = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/messages/conversations/6");
                then.status(200).json_body(json!([]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/messages/conversations/5")
                    .json_body(json!({ "body": "See you Friday" }));
                then.status(201).json_body(message_json(2, "See you Friday"));
            })
            .await;
        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/messages");
        let stagedoor = Stagedoor::new(client);

        stagedoor.thread(5).await.unwrap();
        stagedoor.thread(6).await.unwrap();
        stagedoor.send_message(5, "See you Friday").await.unwrap();
        stagedoor.thread(5).await.unwrap();
        stagedoor.thread(6).await.unwrap();

        assert_eq!(thread.hits_async().await, 2);
        assert_eq!(other.hits_async().await, 1);
    }

    #[tokio::test]
    async fn mark_all_read_resets_the_badge() {
        let server = MockServer::start_async().await;
        let count = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/notifications/unread-count");
                then.status(200).json_body(json!({ "unread_count": 3 }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/notifications/read-all");
                then.status(204);
            })
            .await;
        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/notifications");
        let stagedoor = Stagedoor::new(client);

        assert_eq!(*stagedoor.unread_notifications().await.unwrap(), 3);
        stagedoor.mark_all_notifications_read().await.unwrap();
        stagedoor.unread_notifications().await.unwrap();
        assert_eq!(count.hits_async().await, 2);
    }

    #[tokio::test]
    async fn badge_poller_publishes_and_stops() {
        let server = MockServer::start_async().await;
        let count = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/notifications/unread-count");
                then.status(200).json_body(json!({ "data": { "count": 2 } }));
            })
            .await;
        let (client, _nav) = signed_in_client(&server.url("/api/v1/"), "tok", "/talent/dashboard");
        let stagedoor = Stagedoor::new(client);
        assert!(stagedoor.config().polling.notifications_secs >= 1);

        let mut polled = stagedoor.poll_unread_notifications();
        assert_eq!(*polled.next().await.unwrap().unwrap(), 2);
        assert!(polled.handle().is_running());
        polled.stop();

        let hits = count.hits_async().await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(count.hits_async().await, hits);
        assert_eq!(
            *stagedoor
                .cache()
                .peek::<u64>(&keys::unread_notifications())
                .unwrap(),
            2
        );
    }
}
