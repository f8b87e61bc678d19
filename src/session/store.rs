use crate::common::types::ChatMessage;

/// Ordered, mutable log of messages for one conversation.
///
/// Order is arrival order. History seeds the log once, live messages append,
/// and confirmed deletes remove; the log is never re-sorted by timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageStore {
    messages: Vec<ChatMessage>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the log with the loaded history. Used once per session.
    pub fn seed(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    /// Append a live message to the end of the log.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Remove the first entry with a matching id. No-op when absent.
    pub fn remove(&mut self, id: i64) {
        if let Some(index) = self.messages.iter().position(|m| m.id == Some(id)) {
            self.messages.remove(index);
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::User;
    use chrono::Utc;

    fn message(id: Option<i64>, content: &str) -> ChatMessage {
        ChatMessage {
            id,
            sender: User {
                id: 2,
                username: "bob".to_string(),
            },
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn append_keeps_arrival_order() {
        let mut store = MessageStore::new();
        store.seed(vec![message(Some(1), "first")]);
        store.push(message(None, "second"));
        store.push(message(None, "third"));

        let contents: Vec<_> = store.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn remove_deletes_first_match_only() {
        let mut store = MessageStore::new();
        store.seed(vec![
            message(Some(5), "a"),
            message(Some(5), "b"),
            message(Some(6), "c"),
        ]);

        store.remove(5);
        let contents: Vec<_> = store.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["b", "c"]);
    }

    #[test]
    fn remove_missing_id_is_a_no_op() {
        let mut store = MessageStore::new();
        store.push(message(Some(1), "a"));
        store.remove(99);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_never_matches_live_messages_without_id() {
        let mut store = MessageStore::new();
        store.push(message(None, "live"));
        store.remove(0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn seed_replaces_previous_contents() {
        let mut store = MessageStore::new();
        store.push(message(Some(1), "stale"));
        store.seed(vec![message(Some(2), "fresh")]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].content, "fresh");
    }
}
