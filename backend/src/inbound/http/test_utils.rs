//! Test helpers for inbound HTTP and WebSocket components.
//!
//! [`TestBackend`] wires the real services over a [`MemoryStore`] with the
//! wall clock, because issued tokens are checked against the current time.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use argon2::Params;
use mockable::DefaultClock;
use url::Url;

use crate::Trace;
use crate::domain::ports::TokenCodec;
use crate::domain::{
    Age, BootstrapAccount, Email, FullName, Identity, LoginCredentials, Password, Role,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::ws::state::WsState;
use crate::inbound::ws::{PresenceRegistry, WsMessageNotifier};
use crate::outbound::mail::LogMailer;
use crate::outbound::memory::MemoryStore;
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenCodec};

/// Signing secret shared by every test backend.
pub(crate) const TEST_SECRET: &[u8] = b"nightlist-test-signing-secret-0123456789";

/// Password given to every seeded account.
pub(crate) const TEST_PASSWORD: &str = "correct-horse-battery";

/// Origin accepted by [`TestBackend::ws_state`].
pub(crate) const TEST_ORIGIN: &str = "http://localhost:3000";

/// Real services over an in-memory store.
pub(crate) struct TestBackend {
    pub store: MemoryStore,
    pub presence: Arc<PresenceRegistry>,
    pub tokens: Arc<JwtTokenCodec>,
    pub http: HttpState,
}

impl TestBackend {
    pub(crate) fn new() -> Self {
        let store = MemoryStore::new();
        let presence = Arc::new(PresenceRegistry::new());
        let tokens = Arc::new(JwtTokenCodec::new(TEST_SECRET));
        let hasher = Argon2PasswordHasher::with_cost(Params::MIN_M_COST, 1)
            .expect("cheap argon2 parameters");
        let shared = Arc::new(store.clone());
        let http = HttpState::new(HttpStatePorts {
            identities: shared.clone(),
            events: shared.clone(),
            conversations: shared.clone(),
            feedback: shared.clone(),
            reset_codes: shared,
            hasher: Arc::new(hasher),
            tokens: tokens.clone(),
            mailer: Arc::new(LogMailer),
            notifier: Arc::new(WsMessageNotifier::new(presence.clone())),
            clock: Arc::new(DefaultClock),
        });
        Self {
            store,
            presence,
            tokens,
            http,
        }
    }

    pub(crate) fn ws_state(&self) -> WsState {
        WsState::new(
            self.http.guard.clone(),
            self.presence.clone(),
            vec![Url::parse(TEST_ORIGIN).expect("test origin")],
        )
    }

    /// Create an account with [`TEST_PASSWORD`] and log it in.
    pub(crate) async fn seed(&self, role: Role, email: &str) -> (Identity, String) {
        let created = self
            .http
            .accounts
            .bootstrap(BootstrapAccount {
                full_name: FullName::new("Seeded Person").expect("name"),
                email: Email::new(email).expect("email"),
                password: Password::new(TEST_PASSWORD).expect("password"),
                age: Age::new(30).expect("age"),
                role,
            })
            .await
            .expect("bootstrap account");
        assert!(created, "{email} seeded twice");
        self.login(email).await
    }

    /// Log in an existing account that uses [`TEST_PASSWORD`].
    pub(crate) async fn login(&self, email: &str) -> (Identity, String) {
        let outcome = self
            .http
            .accounts
            .login(LoginCredentials::try_from_parts(email, TEST_PASSWORD).expect("credentials"))
            .await
            .expect("login");
        (outcome.identity, outcome.token.token)
    }

    /// Token for `identity` signed with [`TEST_SECRET`].
    pub(crate) fn token_for(&self, identity: &Identity) -> String {
        self.tokens
            .issue(identity.id(), chrono::Utc::now())
            .expect("issue token")
            .token
    }
}

/// Service with every API route, the shared error configs and [`Trace`].
pub(crate) async fn init_api(
    backend: &TestBackend,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(backend.http.clone()))
            .wrap(Trace)
            .configure(configure_api),
    )
    .await
}

/// `Authorization` header value for `token`.
pub(crate) fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
