use crate::common::types::{ConnectionState, User};
use crate::session::presence::PresenceTracker;
use crate::session::store::MessageStore;

/// Rendered view of one open conversation.
///
/// The controller owns the live copy and publishes a snapshot through a
/// watch channel after every state transition; the surrounding application
/// only ever sees these snapshots.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub messages: MessageStore,
    pub presence: PresenceTracker,
    /// The partner currently typing, if any. Derived from the controller's
    /// typing indicator when the snapshot is published.
    pub typing_user: Option<User>,
    /// Resolved chat partner; `None` until history yields one.
    pub partner: Option<User>,
    /// True while the history fetch is in flight.
    pub loading: bool,
    pub connection: ConnectionState,
}
