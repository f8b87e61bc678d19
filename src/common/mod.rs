pub mod commands;
pub mod events;
pub mod types;

pub use commands::{OutboundFrame, SessionAction};
pub use events::{InboundFrame, PresenceStatus};
pub use types::{ChatMessage, ConnectionState, User};
