//! WebSocket-focused test helpers.
//!
//! Integration tests under `backend/tests/` compile as separate crates, so
//! the awc socket plumbing lives here instead of in each suite.

use actix_web::http::header;
use awc::ws::{Codec, Frame, Message};
use awc::BoxedSocket;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;

/// Client side of an upgraded connection.
pub(crate) type Socket = actix_codec::Framed<BoxedSocket, Codec>;

/// Origin every harness server accepts.
pub(crate) const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Open `/ws` on `base_url` with `token` in the query string.
pub(crate) async fn connect(base_url: &str, token: &str) -> Socket {
    let (_response, socket) = awc::Client::default()
        .ws(format!("{base_url}/ws?token={token}"))
        .set_header(header::ORIGIN, ALLOWED_ORIGIN)
        .connect()
        .await
        .expect("websocket handshake");
    socket
}

/// Next JSON text frame, answering pings so the session stays alive.
pub(crate) async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let frame = socket
            .next()
            .await
            .expect("socket open")
            .expect("valid frame");
        match frame {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json frame"),
            Frame::Ping(payload) => socket
                .send(Message::Pong(payload))
                .await
                .expect("send pong"),
            Frame::Pong(_) => continue,
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

/// Skip frames until one has `"type": kind`.
pub(crate) async fn next_of_type(socket: &mut Socket, kind: &str) -> Value {
    loop {
        let frame = next_json(socket).await;
        if frame["type"] == kind {
            return frame;
        }
    }
}
