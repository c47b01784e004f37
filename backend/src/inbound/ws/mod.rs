//! WebSocket inbound adapter for presence and message push.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list, bearer token)
//! - register the connection with the [`presence::PresenceRegistry`]
//! - run the per-connection session loop until the socket closes

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use serde::Deserialize;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{error, info, warn};
use url::Url;

use crate::domain::TraceId;
use crate::inbound::http::caller::bearer_token;

mod session;

pub mod messages;
pub mod notifier;
pub mod presence;
pub mod state;

pub use notifier::WsMessageNotifier;
pub use presence::PresenceRegistry;

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// `token` query parameter, falling back to the `Authorization` header.
fn upgrade_token(req: &HttpRequest) -> Option<String> {
    web::Query::<TokenQuery>::from_query(req.query_string())
        .ok()
        .and_then(|query| query.into_inner().token)
        .filter(|token| !token.trim().is_empty())
        .or_else(|| bearer_token(req))
}

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        warn!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        warn!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }
    validate_origin(origin_header, &state.allowed_origins)?;

    let token = upgrade_token(&req);
    let identity = state
        .guard
        .authenticate(token.as_deref())
        .await
        .inspect_err(|err| warn!(code = ?err.code(), "Rejected WS upgrade without valid token"))?;

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorInternalServerError("WebSocket upgrade failed")
    })?;

    let user = *identity.id();
    let (outbound, inbox) = unbounded_channel();
    let connection = state.presence.register(user, outbound);
    info!(user_id = %user, "websocket connected");
    let trace_id = TraceId::current().unwrap_or_else(TraceId::generate);
    actix_web::rt::spawn(TraceId::scope(
        trace_id,
        session::handle_ws_session(
            session::Connection {
                presence: state.presence.clone(),
                user,
                id: connection,
                inbox,
            },
            session,
            messages,
        ),
    ));
    Ok(response)
}

fn validate_origin(origin_header: &HeaderValue, allowed: &[Url]) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            warn!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        warn!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if is_allowed_origin(&origin, allowed) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

/// Returns true when `origin` has the same scheme, host and port as an
/// allow-list entry.
fn is_allowed_origin(origin: &Url, allowed: &[Url]) -> bool {
    origin.host_str().is_some()
        && allowed
            .iter()
            .any(|entry| entry.origin() == origin.origin())
}
