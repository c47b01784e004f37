//! WebSocket session tests against a live listener.

use super::*;
use crate::domain::{MessageBody, Role};
use crate::inbound::http::test_utils::{TEST_ORIGIN, TestBackend};
use crate::inbound::ws;
use actix_web::http::StatusCode;
use actix_web::{App, HttpServer, dev::ServerHandle, http::header, web};
use awc::error::WsClientError;
use awc::{BoxedSocket, ws::Codec, ws::Frame};
use futures_util::{SinkExt, StreamExt};
use rstest::rstest;
use serde_json::Value;

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

fn start_ws_server(backend: &TestBackend) -> (String, ServerHandle) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let ws_state = backend.ws_state();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(ws_state.clone()))
            .service(ws::ws_entry)
    })
    .workers(1)
    .disable_signals()
    .listen(listener)
    .expect("listen on test socket")
    .run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{addr}"), handle)
}

async fn connect(url: &str, token: Option<&str>, origin: &str) -> Result<Socket, WsClientError> {
    let target = match token {
        Some(token) => format!("{url}/ws?token={token}"),
        None => format!("{url}/ws"),
    };
    awc::Client::default()
        .ws(target)
        .set_header(header::ORIGIN, origin)
        .connect()
        .await
        .map(|(_resp, socket)| socket)
}

/// Next JSON text frame, answering pings so the session stays alive.
async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json frame"),
            Frame::Ping(payload) => socket
                .send(awc::ws::Message::Pong(payload))
                .await
                .expect("send pong"),
            Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

/// Read until the server closes, ignoring data frames.
async fn close_reason(socket: &mut Socket) -> CloseReason {
    let wait = CLIENT_TIMEOUT * 20;
    tokio::time::timeout(wait, async {
        while let Some(frame) = socket.next().await {
            if let Frame::Close(reason) = frame.expect("frame") {
                return reason;
            }
        }
        None
    })
    .await
    .expect("close frame within timeout")
    .expect("close carries a reason")
}

#[rstest]
#[actix_rt::test]
async fn connect_announces_online_users() {
    let backend = TestBackend::new();
    let (ada, token) = backend.seed(Role::User, "ada@x.com").await;
    let (url, _server) = start_ws_server(&backend);

    let mut socket = connect(&url, Some(&token), TEST_ORIGIN)
        .await
        .expect("websocket connect");
    let frame = next_json(&mut socket).await;
    assert_eq!(frame["type"], "onlineUsers");
    assert_eq!(frame["userIds"], serde_json::json!([ada.id().to_string()]));
}

#[rstest]
#[actix_rt::test]
async fn sent_message_is_pushed_to_the_receiver() {
    let backend = TestBackend::new();
    let (sender, _) = backend.seed(Role::User, "ada@x.com").await;
    let (receiver, token) = backend.seed(Role::User, "bob@x.com").await;
    let (url, _server) = start_ws_server(&backend);

    let mut socket = connect(&url, Some(&token), TEST_ORIGIN)
        .await
        .expect("websocket connect");
    assert_eq!(next_json(&mut socket).await["type"], "onlineUsers");

    let stored = backend
        .http
        .messaging
        .send(&sender, receiver.id(), MessageBody::new("first round?").expect("body"))
        .await
        .expect("message stored");

    let frame = next_json(&mut socket).await;
    assert_eq!(frame["type"], "newMessage");
    assert_eq!(frame["message"]["id"], stored.id.to_string());
    assert_eq!(frame["message"]["senderId"], sender.id().to_string());
    assert_eq!(frame["message"]["message"], "first round?");
}

#[rstest]
#[actix_rt::test]
async fn client_text_closes_with_policy() {
    let backend = TestBackend::new();
    let (_ada, token) = backend.seed(Role::User, "ada@x.com").await;
    let (url, _server) = start_ws_server(&backend);

    let mut socket = connect(&url, Some(&token), TEST_ORIGIN)
        .await
        .expect("websocket connect");
    socket
        .send(awc::ws::Message::Text("hello?".into()))
        .await
        .expect("send text");

    let reason = close_reason(&mut socket).await;
    assert_eq!(reason.code, CloseCode::Policy);
    assert_eq!(reason.description.as_deref(), Some("push-only socket"));
}

#[rstest]
#[actix_rt::test]
async fn reconnect_closes_the_older_socket() {
    let backend = TestBackend::new();
    let (ada, token) = backend.seed(Role::User, "ada@x.com").await;
    let (url, _server) = start_ws_server(&backend);

    let mut first = connect(&url, Some(&token), TEST_ORIGIN)
        .await
        .expect("first connect");
    next_json(&mut first).await;
    let mut second = connect(&url, Some(&token), TEST_ORIGIN)
        .await
        .expect("second connect");
    next_json(&mut second).await;

    let reason = close_reason(&mut first).await;
    assert_eq!(reason.code, CloseCode::Normal);
    assert_eq!(
        reason.description.as_deref(),
        Some("replaced by a newer connection")
    );
    assert_eq!(backend.presence.online(), vec![*ada.id()]);
}

#[rstest]
#[case::missing_token(None, TEST_ORIGIN, StatusCode::UNAUTHORIZED)]
#[case::garbage_token(Some("not-a-jwt"), TEST_ORIGIN, StatusCode::UNAUTHORIZED)]
#[case::foreign_origin(Some("ignored"), "https://evil.example", StatusCode::FORBIDDEN)]
#[actix_rt::test]
async fn handshake_is_refused(
    #[case] token: Option<&str>,
    #[case] origin: &str,
    #[case] expected: StatusCode,
) {
    let backend = TestBackend::new();
    let (url, _server) = start_ws_server(&backend);

    match connect(&url, token, origin).await {
        Err(WsClientError::InvalidResponseStatus(status)) => assert_eq!(status, expected),
        Err(other) => panic!("unexpected handshake error: {other:?}"),
        Ok(_) => panic!("handshake should fail"),
    }
    assert!(backend.presence.online().is_empty());
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_messages() {
    let backend = TestBackend::new();
    let (ada, token) = backend.seed(Role::User, "ada@x.com").await;
    let (url, _server) = start_ws_server(&backend);

    let mut socket = connect(&url, Some(&token), TEST_ORIGIN)
        .await
        .expect("websocket connect");
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    let reason = close_reason(&mut socket).await;
    assert_eq!(reason.code, CloseCode::Normal);
    assert_eq!(reason.description.as_deref(), Some("heartbeat timeout"));

    tokio::time::timeout(CLIENT_TIMEOUT * 20, async {
        while backend.presence.lookup(ada.id()).is_some() {
            tokio::time::sleep(HEARTBEAT_INTERVAL).await;
        }
    })
    .await
    .expect("presence entry removed after close");
}
