use serde::Serialize;

/// Khung dữ liệu gửi xuống kênh realtime, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    ChatMessage { message: String, user: i64 },
    Typing { user: i64, receiver: i64 },
}

/// User intent sent from the surrounding application into the session.
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Send the composed message over the channel.
    SendMessage(String),
    /// A keystroke in the composer; notifies the partner that we are typing.
    Keystroke,
    /// Delete a message by id, server-side first.
    DeleteMessage(i64),
    /// Tear the session down.
    Close,
}
