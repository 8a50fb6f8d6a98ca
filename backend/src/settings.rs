//! Server settings loaded via OrthoConfig.
//!
//! Values come from `USERS_API_*` environment variables, configuration files,
//! and command-line flags, merged by OrthoConfig. Absent optional values fall
//! back to the defaults below; the database URL is required.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_POOL_MAX_SIZE: u32 = 1;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Errors raised when settings are incomplete or inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("USERS_API_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    #[error("pool_max_size must be at least 1")]
    EmptyPool,
}

/// Configuration values for the HTTP server and its user store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS_API")]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled store connections.
    pub pool_max_size: Option<u32>,
    /// Seconds to wait for a store connection.
    pub connection_timeout_secs: Option<u64>,
    /// Apply embedded migrations at startup.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl ServerSettings {
    /// Interface to bind, falling back to all interfaces.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Port to bind, falling back to 3000.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// `(host, port)` pair accepted by `HttpServer::bind`.
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host().to_owned(), self.port())
    }

    /// The configured database URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when unset or blank.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Connection pool configuration derived from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the database URL is missing or the
    /// pool size is zero.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let max_size = self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE);
        if max_size == 0 {
            return Err(SettingsError::EmptyPool);
        }
        let timeout = Duration::from_secs(
            self.connection_timeout_secs
                .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS),
        );
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(max_size)
            .with_connection_timeout(timeout))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "USERS_API_HOST",
        "USERS_API_PORT",
        "USERS_API_DATABASE_URL",
        "USERS_API_POOL_MAX_SIZE",
        "USERS_API_CONNECTION_TIMEOUT_SECS",
        "USERS_API_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("users-api")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_addr(), ("0.0.0.0".to_owned(), 3000));
        assert!(settings.run_migrations);
        assert_eq!(
            settings.database_url(),
            Err(SettingsError::MissingDatabaseUrl)
        );
        assert!(settings.pool_config().is_err());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("USERS_API_HOST", Some("127.0.0.1".to_owned())),
            ("USERS_API_PORT", Some("8080".to_owned())),
            (
                "USERS_API_DATABASE_URL",
                Some("postgres://users:secret@db/users".to_owned()),
            ),
            ("USERS_API_POOL_MAX_SIZE", Some("4".to_owned())),
            ("USERS_API_CONNECTION_TIMEOUT_SECS", Some("5".to_owned())),
            ("USERS_API_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        let pool = settings.pool_config().expect("complete settings");

        assert_eq!(settings.bind_addr(), ("127.0.0.1".to_owned(), 8080));
        assert!(!settings.run_migrations);
        assert_eq!(pool.database_url(), "postgres://users:secret@db/users");
        assert_eq!(pool.max_size(), 4);
    }

    #[rstest]
    fn zero_sized_pool_is_rejected() {
        let _guard = lock_env([
            (
                "USERS_API_DATABASE_URL",
                Some("postgres://localhost/users".to_owned()),
            ),
            ("USERS_API_POOL_MAX_SIZE", Some("0".to_owned())),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.pool_config().map(|_| ()),
            Err(SettingsError::EmptyPool)
        );
    }
}
