use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::common::commands::OutboundFrame;
use crate::common::events::InboundFrame;
use crate::common::types::ConnectionState;

/// Duplex connection to one conversation's realtime event stream.
///
/// Exactly one channel per session; once the transport ends the channel is
/// `Closed` for good, there is no reconnect.
pub struct RealtimeChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    state: ConnectionState,
}

impl RealtimeChannel {
    /// Connect to `{ws_base}/ws/chat/{conversation_id}/?token={token}`. The
    /// token is an opaque credential supplied by the surrounding application.
    pub async fn open(
        ws_base: &str,
        conversation_id: &str,
        token: &str,
    ) -> Result<Self, tungstenite::Error> {
        let url = format!("{ws_base}/ws/chat/{conversation_id}/?token={token}");
        let (stream, _response) = connect_async(&url).await?;
        log::info!("WebSocket connection established");

        Ok(Self {
            stream,
            state: ConnectionState::Open,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Serialize and send one outbound frame. Anything but the `Open` state
    /// logs an error and drops the frame; there is no retry.
    pub async fn send(&mut self, frame: &OutboundFrame) {
        if self.state != ConnectionState::Open {
            log::error!("WebSocket is not open. Frame not sent.");
            return;
        }

        let payload = match serde_json::to_string(frame) {
            Ok(payload) => payload,
            Err(err) => {
                log::error!("Failed to serialize outbound frame: {err}");
                return;
            }
        };

        if let Err(err) = self.stream.send(WsMessage::Text(payload)).await {
            log::error!("WebSocket error: {err}");
        }
    }

    /// Wait for the next recognized inbound frame.
    ///
    /// Malformed or unrecognized payloads are logged and skipped with no
    /// state change. Returns `None` once the transport ends, after which the
    /// channel is `Closed`.
    pub async fn next_frame(&mut self) -> Option<InboundFrame> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    match serde_json::from_str::<InboundFrame>(&text) {
                        Ok(frame) => return Some(frame),
                        Err(err) => log::error!("Error parsing WebSocket message: {err}"),
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    self.state = ConnectionState::Closed;
                    return None;
                }
                // Ping/pong and binary frames carry no session events.
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    log::error!("WebSocket error: {err}");
                    self.state = ConnectionState::Closed;
                    return None;
                }
            }
        }
    }

    /// Close the underlying transport. Idempotent; safe in any state.
    pub async fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Closed;
        if let Err(err) = self.stream.close(None).await {
            log::debug!("WebSocket close: {err}");
        }
    }
}
