//! `messages/*`: conversations and threads.

use serde::Serialize;
use stagedoor_common::Id;
use stagedoor_common::message::{Conversation, Message, NewConversation};

use super::Count;
use crate::HttpClient;
use crate::envelope::Envelope;
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct MessagesApi {
    client: HttpClient,
}

#[derive(Serialize)]
struct Body<'a> {
    body: &'a str,
}

impl MessagesApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// `GET messages/conversations`, most recent first.
    pub async fn conversations(&self) -> Result<Vec<Conversation>> {
        let envelope: Envelope<Vec<Conversation>> =
            self.client.get_json("messages/conversations").await?;
        Ok(envelope.into_inner())
    }

    /// `GET messages/conversations/{id}`: the messages of one thread, oldest first.
    pub async fn thread(&self, conversation_id: Id) -> Result<Vec<Message>> {
        let envelope: Envelope<ThreadBody> = self
            .client
            .get_json(&format!("messages/conversations/{conversation_id}"))
            .await?;
        Ok(envelope.into_inner().into_messages())
    }

    /// `POST messages/conversations/{id}`.
    pub async fn send(&self, conversation_id: Id, body: &str) -> Result<Message> {
        let envelope: Envelope<Message> = self
            .client
            .post_json(&format!("messages/conversations/{conversation_id}"), &Body { body })
            .await?;
        Ok(envelope.into_inner())
    }

    /// `POST messages`: opens a conversation (or reuses the existing one) with a first message.
    pub async fn start_conversation(&self, new: &NewConversation) -> Result<Conversation> {
        let envelope: Envelope<Conversation> = self.client.post_json("messages", new).await?;
        Ok(envelope.into_inner())
    }

    /// `POST messages/conversations/{id}/read`.
    pub async fn mark_read(&self, conversation_id: Id) -> Result<()> {
        let _: serde::de::IgnoredAny = self
            .client
            .post_empty(&format!("messages/conversations/{conversation_id}/read"))
            .await?;
        Ok(())
    }

    /// `GET messages/unread-count`.
    pub async fn unread_count(&self) -> Result<u64> {
        let envelope: Envelope<Count> = self.client.get_json("messages/unread-count").await?;
        Ok(envelope.into_inner().count)
    }
}

/// A thread is a bare message list or `{"conversation": .., "messages": [..]}`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ThreadBody {
    Messages(Vec<Message>),
    WithConversation { messages: Vec<Message> },
}

impl ThreadBody {
    fn into_messages(self) -> Vec<Message> {
        match self {
            ThreadBody::Messages(messages) | ThreadBody::WithConversation { messages } => messages,
        }
    }
}
