//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use nightlist::domain::ports::ResetCodeMailer;
use nightlist::outbound::persistence::DbPool;
use nightlist::outbound::security::JwtTokenCodec;
use url::Url;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) tokens: Arc<JwtTokenCodec>,
    pub(crate) mailer: Arc<dyn ResetCodeMailer>,
    pub(crate) allowed_origins: Vec<Url>,
}

impl ServerConfig {
    /// Construct a configuration backed by the in-memory store.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        tokens: Arc<JwtTokenCodec>,
        mailer: Arc<dyn ResetCodeMailer>,
    ) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            tokens,
            mailer,
            allowed_origins: Vec::new(),
        }
    }

    /// Attach a database connection pool for the persistence adapters.
    ///
    /// When provided, every repository port is served by its Diesel adapter.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Origins allowed to open the WebSocket.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<Url>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
