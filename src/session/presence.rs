use crate::common::types::User;

/// Set of users currently reported online for the conversation context.
///
/// Online events append without deduplication, so a user reported online
/// twice appears twice until an offline event removes every matching entry.
/// That duplication mirrors the wire protocol's behavior and is kept as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresenceTracker {
    online: Vec<User>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_online(&mut self, users: Vec<User>) {
        self.online.extend(users);
    }

    /// Remove every tracked user whose id appears in `users`.
    pub fn apply_offline(&mut self, users: &[User]) {
        self.online
            .retain(|online| !users.iter().any(|user| user.id == online.id));
    }

    pub fn online_users(&self) -> &[User] {
        &self.online
    }
}
