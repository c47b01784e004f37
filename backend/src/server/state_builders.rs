//! Builders for the HTTP and WebSocket state shared by every worker.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use nightlist::domain::ports::{
    ConversationRepository, EventRepository, FeedbackRepository, IdentityRepository,
    ResetCodeRepository,
};
use nightlist::inbound::http::state::{HttpState, HttpStatePorts};
use nightlist::inbound::ws::state::WsState;
use nightlist::inbound::ws::{PresenceRegistry, WsMessageNotifier};
use nightlist::outbound::memory::MemoryStore;
use nightlist::outbound::persistence::{
    DbPool, DieselConversationRepository, DieselEventRepository, DieselFeedbackRepository,
    DieselIdentityRepository, DieselResetCodeRepository,
};
use nightlist::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Repository half of [`HttpStatePorts`].
struct RepositoryPorts {
    identities: Arc<dyn IdentityRepository>,
    events: Arc<dyn EventRepository>,
    conversations: Arc<dyn ConversationRepository>,
    feedback: Arc<dyn FeedbackRepository>,
    reset_codes: Arc<dyn ResetCodeRepository>,
}

fn diesel_ports(pool: &DbPool) -> RepositoryPorts {
    RepositoryPorts {
        identities: Arc::new(DieselIdentityRepository::new(pool.clone())),
        events: Arc::new(DieselEventRepository::new(pool.clone())),
        conversations: Arc::new(DieselConversationRepository::new(pool.clone())),
        feedback: Arc::new(DieselFeedbackRepository::new(pool.clone())),
        reset_codes: Arc::new(DieselResetCodeRepository::new(pool.clone())),
    }
}

fn memory_ports() -> RepositoryPorts {
    let store = Arc::new(MemoryStore::new());
    RepositoryPorts {
        identities: store.clone(),
        events: store.clone(),
        conversations: store.clone(),
        feedback: store.clone(),
        reset_codes: store,
    }
}

/// Select Diesel adapters when a pool is configured, else the memory store.
fn build_repository_ports(pool: Option<&DbPool>) -> RepositoryPorts {
    match pool {
        Some(pool) => diesel_ports(pool),
        None => {
            info!("serving repositories from the in-memory store");
            memory_ports()
        }
    }
}

/// Application data registered on every worker.
#[derive(Clone)]
pub(crate) struct AppStates {
    pub(crate) http: web::Data<HttpState>,
    pub(crate) ws: web::Data<WsState>,
}

/// Wire services and adapters from the server configuration.
///
/// The presence registry is shared between the WebSocket entry and the
/// message notifier so REST sends reach connected receivers.
pub(crate) fn build_states(config: &ServerConfig) -> AppStates {
    let RepositoryPorts {
        identities,
        events,
        conversations,
        feedback,
        reset_codes,
    } = build_repository_ports(config.db_pool.as_ref());
    let presence = Arc::new(PresenceRegistry::new());

    let http = HttpState::new(HttpStatePorts {
        identities,
        events,
        conversations,
        feedback,
        reset_codes,
        hasher: Arc::new(Argon2PasswordHasher::new()),
        tokens: config.tokens.clone(),
        mailer: config.mailer.clone(),
        notifier: Arc::new(WsMessageNotifier::new(presence.clone())),
        clock: Arc::new(DefaultClock),
    });
    let ws = WsState::new(
        http.guard.clone(),
        presence,
        config.allowed_origins.clone(),
    );

    AppStates {
        http: web::Data::new(http),
        ws: web::Data::new(ws),
    }
}
