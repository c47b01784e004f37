//! Server harness and shared world for the behaviour suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. It serves the full `/api` tree and the
//! WebSocket entry over the in-memory store. The `WorldFixture` stops the
//! server even if a step panics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
use argon2::Params;
use async_trait::async_trait;
use awc::Client;
use mockable::DefaultClock;
use nightlist::Trace;
use nightlist::domain::ports::{ResetCodeMailer, ResetCodeMailerError};
use nightlist::domain::{Age, BootstrapAccount, Email, FullName, Password, Role};
use nightlist::inbound::http::configure_api;
use nightlist::inbound::http::state::{HttpState, HttpStatePorts};
use nightlist::inbound::ws;
use nightlist::inbound::ws::state::WsState;
use nightlist::inbound::ws::{PresenceRegistry, WsMessageNotifier};
use nightlist::outbound::memory::MemoryStore;
use nightlist::outbound::security::{Argon2PasswordHasher, JwtTokenCodec};
use rstest::fixture;
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;
use url::Url;

use crate::ws_support::{ALLOWED_ORIGIN, Socket};

/// Password given to every account the harness creates.
pub(crate) const PASSWORD: &str = "correct-horse-battery";

const MULTIPART_BOUNDARY: &str = "nightlist-bdd-boundary";

/// Captures reset codes instead of delivering them.
#[derive(Default)]
pub(crate) struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    /// Most recent code sent to `email`.
    pub(crate) fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .expect("mailer lock")
            .iter()
            .rev()
            .find(|(recipient, _)| recipient == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl ResetCodeMailer for RecordingMailer {
    async fn send_reset_code(
        &self,
        recipient: &Email,
        code: &str,
    ) -> Result<(), ResetCodeMailerError> {
        self.sent
            .lock()
            .expect("mailer lock")
            .push((recipient.to_string(), code.to_owned()));
        Ok(())
    }
}

/// A logged-in account known to the scenario by a short alias.
#[derive(Debug, Clone)]
pub(crate) struct Account {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) token: String,
}

pub(crate) struct NightlistWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) http: HttpState,
    pub(crate) mailer: Arc<RecordingMailer>,
    pub(crate) accounts: HashMap<String, Account>,
    pub(crate) sockets: HashMap<String, Socket>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_event_id: Option<String>,
}

impl NightlistWorld {
    /// Account registered under `alias`.
    pub(crate) fn account(&self, alias: &str) -> Account {
        self.accounts
            .get(alias)
            .cloned()
            .unwrap_or_else(|| panic!("no account named {alias}"))
    }
}

pub(crate) type SharedWorld = Rc<RefCell<NightlistWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(self.world.clone());
    }
}

pub(crate) fn shutdown(world: SharedWorld) {
    // `LocalSet` must be driven on the thread that owns it, so we lock the world
    // while calling `block_on`. The future must not try to lock the world.
    let sockets = std::mem::take(&mut world.borrow_mut().sockets);
    let ctx = world.borrow();
    let server = ctx.server.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        drop(sockets);
        server.stop(true).await;
    });
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

/// Run `operation` against the socket opened for `alias`, then put it back.
pub(crate) fn with_socket<R, F>(
    world: &SharedWorld,
    alias: &str,
    operation: impl FnOnce(Socket) -> F,
) -> R
where
    F: std::future::Future<Output = (Socket, R)>,
{
    let socket = world
        .borrow_mut()
        .sockets
        .remove(alias)
        .unwrap_or_else(|| panic!("{alias} has no open socket"));
    let (socket, result) = with_world_async(world, |_| operation(socket));
    world.borrow_mut().sockets.insert(alias.to_owned(), socket);
    result
}

/// One outgoing request.
pub(crate) struct RequestSpec<'a> {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) token: Option<String>,
    pub(crate) payload: Option<Value>,
    pub(crate) label: &'a str,
}

fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).expect("json response body")
    }
}

fn record_response(world: &SharedWorld, status: u16, body: Value) {
    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(status);
    ctx.last_body = Some(body);
}

/// Send a JSON (or bodiless) request and record status and body.
pub(crate) fn perform_json_request(world: &SharedWorld, spec: RequestSpec<'_>) -> (u16, Value) {
    let RequestSpec {
        method,
        path,
        token,
        payload,
        label,
    } = spec;
    let (status, body) = with_world_async(world, |base_url| async move {
        let mut request = Client::default().request(method, format!("{base_url}{path}"));
        if let Some(token) = token {
            request = request.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
        }
        let mut response = match payload {
            Some(payload) => request.send_json(&payload).await.expect(label),
            None => request.send().await.expect(label),
        };
        let status = response.status().as_u16();
        let body = response.body().await.expect(label);
        (status, decode_body(&body))
    });
    record_response(world, status, body.clone());
    (status, body)
}

/// One multipart form part.
pub(crate) enum FormPart<'a> {
    Text(&'a str, &'a str),
    Image(&'a str, &'a [u8]),
}

fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match part {
            FormPart::Text(name, value) => out.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                    .as_bytes(),
            ),
            FormPart::Image(name, data) => {
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}.png\"\r\n\
                         Content-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(data);
                out.extend_from_slice(b"\r\n");
            }
        }
    }
    out.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    out
}

/// Send a multipart form and record status and body.
pub(crate) fn perform_multipart_request(
    world: &SharedWorld,
    method: Method,
    path: &str,
    token: &str,
    parts: &[FormPart<'_>],
) -> (u16, Value) {
    let body = multipart_body(parts);
    let path = path.to_owned();
    let token = token.to_owned();
    let (status, json) = with_world_async(world, |base_url| async move {
        let mut response = Client::default()
            .request(method, format!("{base_url}{path}"))
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            ))
            .send_body(body)
            .await
            .expect("multipart request");
        let status = response.status().as_u16();
        let bytes = response.body().await.expect("multipart response body");
        (status, decode_body(&bytes))
    });
    record_response(world, status, json.clone());
    (status, json)
}

fn email_for(alias: &str) -> String {
    format!("{alias}@nightlist.test")
}

/// Log `email` in over HTTP and remember the account as `alias`.
pub(crate) fn login_as(world: &SharedWorld, alias: &str, email: &str, password: &str) -> u16 {
    let (status, body) = perform_json_request(
        world,
        RequestSpec {
            method: Method::POST,
            path: "/api/auth/login".to_owned(),
            token: None,
            payload: Some(serde_json::json!({ "email": email, "password": password })),
            label: "login request",
        },
    );
    if status == 200 {
        let account = Account {
            id: body["user"]["id"].as_str().expect("user id").to_owned(),
            email: email.to_owned(),
            token: body["token"].as_str().expect("token").to_owned(),
        };
        world.borrow_mut().accounts.insert(alias.to_owned(), account);
    }
    status
}

/// Sign `alias` up as a regular user through the API and log them in.
pub(crate) fn sign_up(world: &SharedWorld, alias: &str) {
    let email = email_for(alias);
    let (status, _) = perform_json_request(
        world,
        RequestSpec {
            method: Method::POST,
            path: "/api/auth/signup".to_owned(),
            token: None,
            payload: Some(serde_json::json!({
                "fullName": alias,
                "email": email,
                "password": PASSWORD,
                "confirmPassword": PASSWORD,
                "age": 25
            })),
            label: "signup request",
        },
    );
    assert_eq!(status, 201, "signup for {alias}");
    assert_eq!(login_as(world, alias, &email, PASSWORD), 200);
}

/// Create an admin or vendor account directly, then log it in.
pub(crate) fn bootstrap(world: &SharedWorld, alias: &str, role: Role) {
    let email = email_for(alias);
    let account = BootstrapAccount {
        full_name: FullName::new(alias).expect("full name"),
        email: Email::new(&email).expect("email"),
        password: Password::new(PASSWORD).expect("password"),
        age: Age::new(35).expect("age"),
        role,
    };
    let accounts = world.borrow().http.accounts.clone();
    let created = with_world_async(world, |_| async move { accounts.bootstrap(account).await })
        .expect("bootstrap account");
    assert!(created, "{alias} already exists");
    assert_eq!(login_as(world, alias, &email, PASSWORD), 200);
}

/// Open a WebSocket for `alias` and wait for the presence frame.
pub(crate) fn open_socket(world: &SharedWorld, alias: &str) {
    let token = world.borrow().account(alias).token;
    let socket = with_world_async(world, |base_url| async move {
        let mut socket = crate::ws_support::connect(&base_url, &token).await;
        crate::ws_support::next_of_type(&mut socket, "onlineUsers").await;
        socket
    });
    world.borrow_mut().sockets.insert(alias.to_owned(), socket);
}

async fn spawn_server(
    http_state: HttpState,
    ws_state: WsState,
) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let http_data = web::Data::new(http_state);
    let ws_data = web::Data::new(ws_state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(http_data.clone())
            .app_data(ws_data.clone())
            .wrap(Trace)
            .configure(configure_api)
            .service(ws::ws_entry)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

fn create_runtime_and_local() -> (Runtime, LocalSet) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();

    (runtime, local)
}

fn build_states(mailer: Arc<RecordingMailer>) -> (HttpState, WsState) {
    let store = Arc::new(MemoryStore::new());
    let presence = Arc::new(PresenceRegistry::new());
    let hasher =
        Argon2PasswordHasher::with_cost(Params::MIN_M_COST, 1).expect("cheap argon2 parameters");
    let http = HttpState::new(HttpStatePorts {
        identities: store.clone(),
        events: store.clone(),
        conversations: store.clone(),
        feedback: store.clone(),
        reset_codes: store,
        hasher: Arc::new(hasher),
        tokens: Arc::new(JwtTokenCodec::new(b"behaviour-suite-signing-secret-0123456789")),
        mailer,
        notifier: Arc::new(WsMessageNotifier::new(presence.clone())),
        clock: Arc::new(DefaultClock),
    });
    let ws = WsState::new(
        http.guard.clone(),
        presence,
        vec![Url::parse(ALLOWED_ORIGIN).expect("allowed origin")],
    );
    (http, ws)
}

#[fixture]
pub(crate) fn world() -> WorldFixture {
    let (runtime, local) = create_runtime_and_local();
    let mailer = Arc::new(RecordingMailer::default());
    let (http, ws_state) = build_states(mailer.clone());
    let (base_url, server) = local
        .block_on(&runtime, spawn_server(http.clone(), ws_state))
        .expect("spawn harness server");

    WorldFixture {
        world: Rc::new(RefCell::new(NightlistWorld {
            runtime,
            local,
            base_url,
            server,
            http,
            mailer,
            accounts: HashMap::new(),
            sockets: HashMap::new(),
            last_status: None,
            last_body: None,
            last_event_id: None,
        })),
    }
}
