use tokio::time::{Duration, Instant};

use crate::common::types::User;

/// How long the indicator stays up after the last qualifying typing event.
pub const TYPING_CLEAR_AFTER: Duration = Duration::from_millis(2000);

/// Two-state machine for the inbound typing indicator: idle, or some user is
/// typing with an armed clear deadline.
///
/// Re-arming overwrites the deadline, so at most one clear is ever pending.
/// The controller's event loop sleeps on `clear_deadline` and calls `clear`
/// when it elapses.
#[derive(Debug, Clone, Default)]
pub struct TypingIndicator {
    typing_user: Option<User>,
    clear_at: Option<Instant>,
}

impl TypingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `user` as typing and (re)arm the clear deadline.
    pub fn set(&mut self, user: User) {
        self.typing_user = Some(user);
        self.clear_at = Some(Instant::now() + TYPING_CLEAR_AFTER);
    }

    /// Drop the indicator and cancel any pending clear.
    pub fn clear(&mut self) {
        self.typing_user = None;
        self.clear_at = None;
    }

    pub fn user(&self) -> Option<&User> {
        self.typing_user.as_ref()
    }

    /// Deadline for the automatic clear, if one is armed.
    pub fn clear_deadline(&self) -> Option<Instant> {
        self.clear_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> User {
        User {
            id: 2,
            username: "bob".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn set_arms_a_two_second_deadline() {
        let mut typing = TypingIndicator::new();
        let before = Instant::now();
        typing.set(bob());

        assert_eq!(typing.user().map(|u| u.id), Some(2));
        assert_eq!(typing.clear_deadline(), Some(before + TYPING_CLEAR_AFTER));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_the_pending_deadline() {
        let mut typing = TypingIndicator::new();
        typing.set(bob());
        let first = typing.clear_deadline().unwrap();

        tokio::time::advance(Duration::from_millis(1500)).await;
        typing.set(bob());
        let second = typing.clear_deadline().unwrap();

        assert_eq!(second, first + Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_disarms_the_deadline() {
        let mut typing = TypingIndicator::new();
        typing.set(bob());
        typing.clear();

        assert!(typing.user().is_none());
        assert!(typing.clear_deadline().is_none());
    }
}
