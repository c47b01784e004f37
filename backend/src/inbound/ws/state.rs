//! Shared WebSocket adapter state.

use std::sync::Arc;

use url::Url;

use crate::domain::AccessGuard;
use crate::inbound::ws::presence::PresenceRegistry;

/// Dependency bundle for the WebSocket entry and its sessions.
#[derive(Clone)]
pub struct WsState {
    pub guard: Arc<AccessGuard>,
    pub presence: Arc<PresenceRegistry>,
    /// Exact origins (`scheme://host[:port]`) permitted to upgrade.
    pub allowed_origins: Arc<[Url]>,
}

impl WsState {
    /// Construct state from the shared guard and presence registry.
    pub fn new(
        guard: Arc<AccessGuard>,
        presence: Arc<PresenceRegistry>,
        allowed_origins: Vec<Url>,
    ) -> Self {
        Self {
            guard,
            presence,
            allowed_origins: allowed_origins.into(),
        }
    }
}
