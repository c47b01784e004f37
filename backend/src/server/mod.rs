//! Server construction and middleware wiring.

mod bootstrap;
mod config;
mod settings;
mod state_builders;

pub use bootstrap::{load_bootstrap_accounts, seed_bootstrap_accounts};
pub use config::ServerConfig;
pub use settings::AppSettings;
pub(crate) use state_builders::{AppStates, build_states};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use nightlist::Trace;
#[cfg(debug_assertions)]
use nightlist::doc::ApiDoc;
use nightlist::inbound::http::configure_api;
use nightlist::inbound::http::health::{HealthState, live, ready};
use nightlist::inbound::ws;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    states: AppStates,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppStates { http, ws: ws_state } = states;

    let app = App::new()
        .app_data(health_state)
        .app_data(http)
        .app_data(ws_state)
        .wrap(Trace)
        .configure(configure_api)
        .service(ws::ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server from prepared state.
///
/// # Parameters
/// - `health_state`: shared readiness state, marked ready once the socket binds.
/// - `config`: the [`ServerConfig`] the states were built from.
/// - `states`: services and adapters from [`build_states`].
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub(crate) fn create_server(
    health_state: web::Data<HealthState>,
    config: &ServerConfig,
    states: AppStates,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || build_app(server_health_state.clone(), states.clone()))
        .bind(config.bind_addr())?
        .run();

    health_state.mark_ready();
    Ok(server)
}
