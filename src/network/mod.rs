pub mod channel;
pub mod history;

pub use channel::RealtimeChannel;
pub use history::{ConversationHistory, HistoryLoader};
