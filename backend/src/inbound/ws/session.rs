//! Per-connection WebSocket loop.
//!
//! Forwards frames queued by the presence registry and the message notifier,
//! answers pings, and closes idle sockets. The public contract pings every 5s
//! and considers a connection idle after 10s without client traffic. Tests
//! shorten both intervals.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time;
use tracing::{info, warn};

use crate::domain::UserId;
use crate::inbound::ws::messages::OutboundFrame;
use crate::inbound::ws::presence::{ConnectionId, PresenceRegistry};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

/// Registration for one accepted socket.
pub(super) struct Connection {
    pub(super) presence: Arc<PresenceRegistry>,
    pub(super) user: UserId,
    pub(super) id: ConnectionId,
    pub(super) inbox: UnboundedReceiver<OutboundFrame>,
}

pub(super) async fn handle_ws_session(
    connection: Connection,
    session: Session,
    stream: MessageStream,
) {
    let Connection {
        presence,
        user,
        id,
        inbox,
    } = connection;
    WsSession { inbox }.run(session, stream).await;
    presence.unregister(&user, id);
    info!(user_id = %user, "websocket disconnected");
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    UnexpectedPayload,
    Replaced,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    inbox: UnboundedReceiver<OutboundFrame>,
}

impl WsSession {
    async fn run(&mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                frame = self.inbox.recv() => {
                    forward_frame(&mut session, frame).await
                }
                message = stream.recv() => {
                    handle_stream_message(&mut session, &mut last_heartbeat, message).await
                }
            };

            if let Err(error) = result {
                log_shutdown_reason(&error);
                close_session_if_needed(session, close_action_for(&error)).await;
                return;
            }
        }
    }
}

async fn handle_heartbeat_tick(
    session: &mut Session,
    last_heartbeat: &Instant,
) -> Result<(), SessionError> {
    if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }

    session.ping(b"").await.map_err(SessionError::Network)
}

/// Send a queued frame. A closed inbox means a reconnect replaced this
/// connection in the registry.
async fn forward_frame(
    session: &mut Session,
    frame: Option<OutboundFrame>,
) -> Result<(), SessionError> {
    let Some(frame) = frame else {
        return Err(SessionError::Replaced);
    };
    match serde_json::to_string(&frame) {
        Ok(body) => session.text(body).await.map_err(SessionError::Network),
        Err(error) => {
            warn!(error = %error, "Failed to serialize WebSocket payload");
            Ok(())
        }
    }
}

async fn handle_stream_message(
    session: &mut Session,
    last_heartbeat: &mut Instant,
    message: Option<Result<Message, ProtocolError>>,
) -> Result<(), SessionError> {
    let Some(message) = message else {
        return Err(SessionError::StreamClosed);
    };

    match message {
        Ok(message) => handle_message(session, last_heartbeat, message).await,
        Err(error) => Err(SessionError::Protocol(error)),
    }
}

async fn handle_message(
    session: &mut Session,
    last_heartbeat: &mut Instant,
    message: Message,
) -> Result<(), SessionError> {
    match message {
        Message::Ping(payload) => {
            *last_heartbeat = Instant::now();
            session
                .pong(&payload)
                .await
                .map_err(SessionError::Network)
        }
        Message::Pong(_) | Message::Nop => {
            *last_heartbeat = Instant::now();
            Ok(())
        }
        Message::Text(_) | Message::Binary(_) | Message::Continuation(_) => {
            warn!("Rejected client payload on push-only WebSocket");
            Err(SessionError::UnexpectedPayload)
        }
        Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
    }
}

fn log_shutdown_reason(error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => {
            warn!("WebSocket heartbeat timeout; closing connection");
        }
        SessionError::Protocol(error) => {
            warn!(error = %error, "WebSocket protocol error");
        }
        SessionError::Network(error) => {
            warn!(error = %error, "WebSocket send failed; closing connection");
        }
        SessionError::UnexpectedPayload
        | SessionError::Replaced
        | SessionError::ClientClosed(_)
        | SessionError::StreamClosed => {}
    }
}

fn close_action_for(error: &SessionError) -> CloseAction {
    match error {
        SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("heartbeat timeout".to_owned()),
        })),
        SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Protocol,
            description: Some("protocol error".to_owned()),
        })),
        SessionError::UnexpectedPayload => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Policy,
            description: Some("push-only socket".to_owned()),
        })),
        SessionError::Replaced => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("replaced by a newer connection".to_owned()),
        })),
        SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
        SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
    }
}

async fn close_session_if_needed(session: Session, close_action: CloseAction) {
    if let CloseAction::Close(reason) = close_action {
        if let Err(error) = session.close(reason).await {
            warn!(error = %error, "Failed to close WebSocket session");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
