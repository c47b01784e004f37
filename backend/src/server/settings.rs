//! Process configuration loaded via OrthoConfig.
//!
//! Every field can come from the command line (`--bind-addr`), the
//! environment (`NIGHTLIST_BIND_ADDR`) or a configuration file.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use nightlist::outbound::mail::SmtpSettings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid WebSocket origin {value}: {source}")]
    Origin {
        value: String,
        source: url::ParseError,
    },
    #[error("SMTP host is set but {field} is missing")]
    IncompleteSmtp { field: &'static str },
}

/// Runtime settings for the backend process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "NIGHTLIST")]
pub struct AppSettings {
    /// Listen address, `0.0.0.0:8080` when unset.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. The in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Pool size for the PostgreSQL connection pool.
    pub database_max_connections: Option<u32>,
    /// JSON file of accounts created at startup when missing.
    pub bootstrap_accounts: Option<PathBuf>,
    /// SMTP relay for reset codes. Codes are only logged when unset.
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    /// Comma-separated origins allowed to open the WebSocket.
    pub ws_allowed_origins: Option<String>,
}

impl AppSettings {
    /// Configured listen address, falling back to the default.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured pool size, falling back to the default.
    pub fn database_max_connections(&self) -> u32 {
        self.database_max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Parsed WebSocket origin allow-list.
    pub fn allowed_origins(&self) -> Result<Vec<Url>, SettingsError> {
        self.ws_allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                Url::parse(value).map_err(|source| SettingsError::Origin {
                    value: value.to_owned(),
                    source,
                })
            })
            .collect()
    }

    /// SMTP relay settings, when a host is configured.
    pub fn smtp(&self) -> Result<Option<SmtpSettings>, SettingsError> {
        let Some(host) = self.smtp_host.clone() else {
            return Ok(None);
        };
        let from = self
            .smtp_from
            .clone()
            .ok_or(SettingsError::IncompleteSmtp { field: "smtp_from" })?;
        Ok(Some(SmtpSettings {
            host,
            port: self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            from,
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "NIGHTLIST_BIND_ADDR",
        "NIGHTLIST_DATABASE_URL",
        "NIGHTLIST_DATABASE_MAX_CONNECTIONS",
        "NIGHTLIST_BOOTSTRAP_ACCOUNTS",
        "NIGHTLIST_SMTP_HOST",
        "NIGHTLIST_SMTP_PORT",
        "NIGHTLIST_SMTP_USERNAME",
        "NIGHTLIST_SMTP_PASSWORD",
        "NIGHTLIST_SMTP_FROM",
        "NIGHTLIST_WS_ALLOWED_ORIGINS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("nightlist")]).expect("config should load")
    }

    /// Every variable unset except `overrides`.
    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.database_max_connections(), 10);
        assert!(settings.database_url.is_none());
        assert!(settings.smtp().expect("smtp").is_none());
        assert_eq!(
            settings.allowed_origins().expect("origins"),
            vec![Url::parse("http://localhost:3000").expect("url")]
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("NIGHTLIST_BIND_ADDR", "127.0.0.1:9090"),
            ("NIGHTLIST_DATABASE_MAX_CONNECTIONS", "3"),
            ("NIGHTLIST_SMTP_HOST", "smtp.example.com"),
            ("NIGHTLIST_SMTP_FROM", "no-reply@example.com"),
            (
                "NIGHTLIST_WS_ALLOWED_ORIGINS",
                "https://app.example.com, http://localhost:5173",
            ),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("addr"),
            "127.0.0.1:9090".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.database_max_connections(), 3);
        let smtp = settings.smtp().expect("smtp").expect("configured");
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 587);
        assert_eq!(settings.allowed_origins().expect("origins").len(), 2);
    }

    #[rstest]
    fn smtp_host_without_sender_is_rejected() {
        let _guard = lock_env(env_with(&[("NIGHTLIST_SMTP_HOST", "smtp.example.com")]));

        let err = load_from_empty_args().smtp().expect_err("missing sender");
        assert!(matches!(
            err,
            SettingsError::IncompleteSmtp { field: "smtp_from" }
        ));
    }

    #[rstest]
    fn malformed_origin_is_reported() {
        let _guard = lock_env(env_with(&[("NIGHTLIST_WS_ALLOWED_ORIGINS", "not a url")]));

        let err = load_from_empty_args()
            .allowed_origins()
            .expect_err("bad origin");
        assert!(matches!(err, SettingsError::Origin { .. }));
    }
}
