use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::common::types::User;

/// Flavour carried by an `online_status` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

/// Sự kiện từ kênh realtime gửi lên session, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    ChatMessage {
        message: String,
        user: User,
        timestamp: DateTime<Utc>,
    },
    Typing {
        user: User,
        receiver: i64,
    },
    OnlineStatus {
        status: PresenceStatus,
        online_users: Vec<User>,
    },
}
