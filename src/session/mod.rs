pub mod controller;
pub mod presence;
pub mod state;
pub mod store;
pub mod typing;

pub use controller::{SessionController, SessionHandle};
pub use presence::PresenceTracker;
pub use state::SessionState;
pub use store::MessageStore;
pub use typing::TypingIndicator;
