use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity record for a chat participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Domain model đại diện một tin nhắn chat.
///
/// History records carry a server-assigned id; live frames arrive without
/// one, so `id` is optional. Only entries with an id can be deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Option<i64>,
    pub sender: User,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Lifecycle of the realtime connection. Transitions are one-way; a closed
/// channel is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Open,
    Closed,
}
