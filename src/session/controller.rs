use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::common::commands::{OutboundFrame, SessionAction};
use crate::common::events::{InboundFrame, PresenceStatus};
use crate::common::types::{ChatMessage, ConnectionState};
use crate::config::AppConfig;
use crate::network::channel::RealtimeChannel;
use crate::network::history::HistoryLoader;
use crate::session::state::SessionState;
use crate::session::typing::TypingIndicator;

/// Handle held by the surrounding application: user intents go in through
/// `actions`, rendered state comes out through `state`.
pub struct SessionHandle {
    pub actions: mpsc::Sender<SessionAction>,
    pub state: watch::Receiver<SessionState>,
}

/// Composes the history loader, realtime channel, message log, typing
/// indicator and presence set for one mounted conversation.
///
/// One controller per conversation activation; switching conversations means
/// dropping this one and building a fresh one, so no channel, timer or log
/// ever leaks across activations.
pub struct SessionController {
    conversation_id: String,
    current_user_id: i64,
    token: String,
    ws_base: String,
    history: HistoryLoader,
    typing: TypingIndicator,
    state: SessionState,
    state_tx: watch::Sender<SessionState>,
    action_rx: mpsc::Receiver<SessionAction>,
}

impl SessionController {
    /// Build a controller for one conversation, returning it together with
    /// the handle the surrounding application keeps.
    pub fn new(
        config: AppConfig,
        conversation_id: String,
        current_user_id: i64,
        token: String,
    ) -> (Self, SessionHandle) {
        let (action_tx, action_rx) = mpsc::channel(100);

        let state = SessionState {
            loading: true,
            ..SessionState::default()
        };
        let (state_tx, state_rx) = watch::channel(state.clone());

        let history = HistoryLoader::new(config.api_base.clone(), token.clone());

        let controller = Self {
            conversation_id,
            current_user_id,
            token,
            ws_base: config.ws_base,
            history,
            typing: TypingIndicator::new(),
            state,
            state_tx,
            action_rx,
        };
        let handle = SessionHandle {
            actions: action_tx,
            state: state_rx,
        };

        (controller, handle)
    }

    /// Drive the session: load history, open the channel exactly once, then
    /// process inbound frames and user actions until teardown.
    pub async fn run(mut self) {
        self.load_history().await;
        let mut channel = self.open_channel().await;

        loop {
            let deadline = self.typing.clear_deadline();

            tokio::select! {
                action = self.action_rx.recv() => {
                    let Some(action) = action else { break };
                    if matches!(action, SessionAction::Close) {
                        break;
                    }
                    self.handle_action(action, &mut channel).await;
                }
                frame = Self::next_frame(&mut channel) => {
                    match frame {
                        Some(frame) => self.apply_frame(frame),
                        None => {
                            // Transport ended. No reconnect; the session stays
                            // up with a closed channel and its local state.
                            channel = None;
                            if self.state.connection != ConnectionState::Closed {
                                self.state.connection = ConnectionState::Closed;
                                self.publish();
                            }
                        }
                    }
                }
                _ = Self::typing_expired(deadline) => {
                    self.typing.clear();
                    self.publish();
                }
            }
        }

        // Teardown order: cancel the typing timer first, then close the
        // channel, then publish the final snapshot.
        self.typing.clear();
        if let Some(mut channel) = channel {
            channel.close().await;
        }
        self.state.connection = ConnectionState::Closed;
        self.publish();
    }

    async fn load_history(&mut self) {
        let history = self
            .history
            .load(&self.conversation_id, self.current_user_id)
            .await;
        self.state.messages.seed(history.messages);
        self.state.partner = history.partner;
        self.state.loading = false;
        self.publish();
    }

    async fn open_channel(&mut self) -> Option<RealtimeChannel> {
        if self.conversation_id.is_empty() {
            log::error!("Invalid conversation id: empty");
            self.state.connection = ConnectionState::Closed;
            self.publish();
            return None;
        }

        match RealtimeChannel::open(&self.ws_base, &self.conversation_id, &self.token).await {
            Ok(channel) => {
                self.state.connection = ConnectionState::Open;
                self.publish();
                Some(channel)
            }
            Err(err) => {
                log::error!("WebSocket error: {err}");
                self.state.connection = ConnectionState::Closed;
                self.publish();
                None
            }
        }
    }

    async fn handle_action(&mut self, action: SessionAction, channel: &mut Option<RealtimeChannel>) {
        match action {
            SessionAction::SendMessage(content) => self.send_message(content, channel).await,
            SessionAction::Keystroke => self.signal_typing(channel).await,
            SessionAction::DeleteMessage(id) => self.delete_message(id).await,
            // Handled by the run loop before dispatch.
            SessionAction::Close => {}
        }
    }

    async fn send_message(&mut self, content: String, channel: &mut Option<RealtimeChannel>) {
        if content.trim().is_empty() {
            log::error!("Cannot send message: empty message");
            return;
        }

        match channel {
            Some(channel) if channel.is_open() => {
                channel
                    .send(&OutboundFrame::ChatMessage {
                        message: content,
                        user: self.current_user_id,
                    })
                    .await;
            }
            _ => log::error!("WebSocket is not open. Message not sent."),
        }
    }

    /// Emitted on every keystroke in the composer, unthrottled.
    async fn signal_typing(&mut self, channel: &mut Option<RealtimeChannel>) {
        let Some(partner) = self.state.partner.clone() else {
            log::error!("Cannot send typing event: no chat partner resolved");
            return;
        };

        match channel {
            Some(channel) if channel.is_open() => {
                channel
                    .send(&OutboundFrame::Typing {
                        user: self.current_user_id,
                        receiver: partner.id,
                    })
                    .await;
            }
            _ => log::error!("Cannot send typing event: WebSocket is not open."),
        }
    }

    /// Non-optimistic delete: the log only changes after the server confirms.
    async fn delete_message(&mut self, id: i64) {
        if self
            .history
            .delete_message(&self.conversation_id, id)
            .await
        {
            self.state.messages.remove(id);
            self.publish();
        }
    }

    /// Apply one inbound frame as a pure transition over the session state.
    fn apply_frame(&mut self, frame: InboundFrame) {
        match frame {
            InboundFrame::ChatMessage {
                message,
                user,
                timestamp,
            } => {
                self.state.messages.push(ChatMessage {
                    id: None,
                    sender: user,
                    content: message,
                    timestamp,
                });
                // A delivered message means typing has ended, whoever it was.
                self.typing.clear();
            }
            InboundFrame::Typing { user, receiver } => {
                // Only show the indicator when we are the addressee and the
                // event is not our own echo.
                if receiver == self.current_user_id && user.id != self.current_user_id {
                    self.typing.set(user);
                }
            }
            InboundFrame::OnlineStatus {
                status,
                online_users,
            } => match status {
                PresenceStatus::Online => self.state.presence.apply_online(online_users),
                PresenceStatus::Offline => self.state.presence.apply_offline(&online_users),
            },
        }
        self.publish();
    }

    /// The typing indicator owns who is typing; the snapshot's `typing_user`
    /// is derived from it here rather than maintained in parallel.
    fn publish(&self) {
        let mut state = self.state.clone();
        state.typing_user = self.typing.user().cloned();
        let _ = self.state_tx.send(state);
    }

    async fn next_frame(channel: &mut Option<RealtimeChannel>) -> Option<InboundFrame> {
        match channel {
            Some(channel) => channel.next_frame().await,
            None => std::future::pending().await,
        }
    }

    async fn typing_expired(deadline: Option<Instant>) {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::User;
    use chrono::Utc;

    fn controller() -> (SessionController, SessionHandle) {
        SessionController::new(
            AppConfig::default(),
            "7".to_string(),
            1,
            "token".to_string(),
        )
    }

    fn user(id: i64, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
        }
    }

    #[tokio::test]
    async fn chat_message_appends_and_clears_typing() {
        let (mut session, handle) = controller();
        session.apply_frame(InboundFrame::Typing {
            user: user(2, "bob"),
            receiver: 1,
        });

        session.apply_frame(InboundFrame::ChatMessage {
            message: "hi".to_string(),
            user: user(2, "bob"),
            timestamp: Utc::now(),
        });

        assert_eq!(session.state.messages.len(), 1);
        assert_eq!(session.state.messages.messages()[0].content, "hi");
        assert!(session.state.messages.messages()[0].id.is_none());
        assert!(handle.state.borrow().typing_user.is_none());
        assert!(session.typing.clear_deadline().is_none());
    }

    #[tokio::test]
    async fn messages_accumulate_in_arrival_order() {
        let (mut session, _handle) = controller();
        for content in ["one", "two", "three"] {
            session.apply_frame(InboundFrame::ChatMessage {
                message: content.to_string(),
                user: user(2, "bob"),
                timestamp: Utc::now(),
            });
        }

        let contents: Vec<_> = session
            .state
            .messages
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn typing_addressed_to_us_sets_the_indicator() {
        let (mut session, handle) = controller();
        session.apply_frame(InboundFrame::Typing {
            user: user(2, "bob"),
            receiver: 1,
        });

        // The published snapshot reflects the indicator, its single source
        // of truth.
        assert_eq!(handle.state.borrow().typing_user.as_ref().map(|u| u.id), Some(2));
        assert!(session.typing.clear_deadline().is_some());
    }

    #[tokio::test]
    async fn misdirected_typing_is_a_strict_no_op() {
        let (mut session, handle) = controller();
        session.apply_frame(InboundFrame::Typing {
            user: user(2, "bob"),
            receiver: 9,
        });

        assert!(handle.state.borrow().typing_user.is_none());
        assert!(session.typing.clear_deadline().is_none());
    }

    #[tokio::test]
    async fn own_typing_echo_never_sets_the_indicator() {
        let (mut session, handle) = controller();
        session.apply_frame(InboundFrame::Typing {
            user: user(1, "alice"),
            receiver: 1,
        });

        assert!(handle.state.borrow().typing_user.is_none());
    }

    #[tokio::test]
    async fn online_status_frames_drive_the_presence_set() {
        let (mut session, _handle) = controller();
        session.apply_frame(InboundFrame::OnlineStatus {
            status: PresenceStatus::Online,
            online_users: vec![user(3, "x")],
        });
        assert_eq!(session.state.presence.online_users().len(), 1);

        session.apply_frame(InboundFrame::OnlineStatus {
            status: PresenceStatus::Offline,
            online_users: vec![user(3, "x")],
        });
        assert!(session.state.presence.online_users().is_empty());
    }
}
