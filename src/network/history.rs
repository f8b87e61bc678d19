use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::common::types::{ChatMessage, User};

/// One record from `GET /conversations/{id}/messages/`. Every record embeds
/// the conversation's participant list; the chat partner is resolved from it.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub sender: User,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub participants: Vec<User>,
}

/// Result of a history load: the seeded log plus the resolved chat partner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationHistory {
    pub messages: Vec<ChatMessage>,
    pub partner: Option<User>,
}

/// Fetches message history and issues deletes against the REST collaborator.
pub struct HistoryLoader {
    http: Client,
    api_base: String,
    token: String,
}

impl HistoryLoader {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into(),
            token: token.into(),
        }
    }

    /// Load the ordered message log for a conversation and resolve the chat
    /// partner as the first embedded participant whose id differs from
    /// `current_user_id`.
    ///
    /// Transport and decode failures are logged and surface as an empty
    /// history; the caller never sees an error.
    pub async fn load(&self, conversation_id: &str, current_user_id: i64) -> ConversationHistory {
        if conversation_id.is_empty() {
            log::error!("Invalid conversation id: empty");
            return ConversationHistory::default();
        }

        let records = match self.fetch(conversation_id).await {
            Ok(records) => records,
            Err(err) => {
                log::error!("Error fetching conversation data: {err}");
                return ConversationHistory::default();
            }
        };

        let partner = records.first().and_then(|record| {
            record
                .participants
                .iter()
                .find(|user| user.id != current_user_id)
                .cloned()
        });
        if partner.is_none() && !records.is_empty() {
            log::error!("No valid chat partner found in conversation {conversation_id}");
        }

        let messages = records
            .into_iter()
            .map(|record| ChatMessage {
                id: Some(record.id),
                sender: record.sender,
                content: record.content,
                timestamp: record.timestamp,
            })
            .collect();

        ConversationHistory { messages, partner }
    }

    async fn fetch(&self, conversation_id: &str) -> Result<Vec<MessageRecord>, reqwest::Error> {
        self.http
            .get(format!(
                "{}/conversations/{}/messages/",
                self.api_base, conversation_id
            ))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Request a server-side delete. Returns true only on the empty-success
    /// status; the message log must not be touched on any other outcome.
    pub async fn delete_message(&self, conversation_id: &str, message_id: i64) -> bool {
        let url = format!(
            "{}/conversations/{}/messages/{}/",
            self.api_base, conversation_id, message_id
        );
        match self.http.delete(&url).bearer_auth(&self.token).send().await {
            Ok(response) if response.status() == StatusCode::NO_CONTENT => true,
            Ok(response) => {
                log::error!(
                    "Error deleting message {message_id}: status {}",
                    response.status()
                );
                false
            }
            Err(err) => {
                log::error!("Error deleting message {message_id}: {err}");
                false
            }
        }
    }
}
