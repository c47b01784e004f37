//! Backend entry-point: loads settings, wires adapters and serves the API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use nightlist::domain::ports::ResetCodeMailer;
use nightlist::inbound::http::health::HealthState;
use nightlist::inbound::http::token_config::fingerprint::secret_fingerprint;
use nightlist::inbound::http::token_config::{BuildMode, token_settings_from_env};
use nightlist::outbound::mail::{LogMailer, SmtpMailer};
use nightlist::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use nightlist::outbound::security::JwtTokenCodec;

use server::{
    AppSettings, ServerConfig, build_states, create_server, load_bootstrap_accounts,
    seed_bootstrap_accounts,
};

fn build_mailer(settings: &AppSettings) -> color_eyre::Result<Arc<dyn ResetCodeMailer>> {
    match settings.smtp()? {
        Some(smtp) => {
            let host = smtp.host.clone();
            let mailer = SmtpMailer::new(smtp).wrap_err("configure SMTP relay")?;
            info!(%host, "reset codes delivered over SMTP");
            Ok(Arc::new(mailer))
        }
        None => {
            warn!("no SMTP relay configured; reset codes are only logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

async fn connect_database(url: String, max_size: u32) -> color_eyre::Result<DbPool> {
    let migration_url = url.clone();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
        .await
        .wrap_err("migration task panicked")?
        .wrap_err("apply database migrations")?;
    info!(applied, "database migrations applied");

    DbPool::new(PoolConfig::new(url).with_max_size(max_size))
        .await
        .wrap_err("build database pool")
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("load settings: {err}"))?;

    let token_settings =
        token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
            .wrap_err("load token signing secret")?;
    info!(
        fingerprint = %secret_fingerprint(token_settings.secret()),
        ephemeral = token_settings.is_ephemeral(),
        "token signing secret loaded"
    );
    let tokens = Arc::new(JwtTokenCodec::new(token_settings.secret()));
    drop(token_settings);

    let mut config = ServerConfig::new(settings.bind_addr()?, tokens, build_mailer(&settings)?)
        .with_allowed_origins(settings.allowed_origins()?);
    match settings.database_url.clone() {
        Some(url) => {
            let pool = connect_database(url, settings.database_max_connections()).await?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database configured; data is lost on restart"),
    }

    let states = build_states(&config);
    if let Some(path) = settings.bootstrap_accounts.as_deref() {
        let accounts = load_bootstrap_accounts(path)?;
        let created = seed_bootstrap_accounts(&states.http.accounts, accounts).await?;
        info!(created, path = %path.display(), "bootstrap accounts seeded");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, &config, states)?;
    info!(addr = %config.bind_addr(), "listening");
    server.await?;
    Ok(())
}
