//! PostgreSQL client implementation
//!
//! A [`PostgreSQLClient`] owns a small `deadpool-postgres` pool for one store.
//! Row sources and sinks build a client at the start of an operation and drop
//! it at the end, so connections never outlive the fetch or the write.

use crate::config::{ConnectionSettings, SecretString, SslMode};
use crate::domain::{Result, TablemaskError};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::fmt;
use std::time::Duration;
use tokio_postgres::NoTls;

/// Which side of the copy a store is on
///
/// Decides whether connection failures are reported as source or target
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRole {
    Source,
    Target,
}

impl StoreRole {
    pub fn connection_error(&self, message: String) -> TablemaskError {
        match self {
            StoreRole::Source => TablemaskError::SourceConnection(message),
            StoreRole::Target => TablemaskError::TargetConnection(message),
        }
    }
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreRole::Source => f.write_str("source"),
            StoreRole::Target => f.write_str("target"),
        }
    }
}

/// Everything needed to open connections to one database
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: SecretString,
    pub settings: ConnectionSettings,
}

impl ConnectionParams {
    /// `host:port/database`, safe to log
    pub fn describe(&self) -> String {
        format!("{}:{}/{}", self.host, self.settings.port, self.database)
    }

    fn pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.settings.port)
            .dbname(&self.database)
            .user(&self.user)
            .password(self.password.expose_secret().as_ref())
            .application_name(env!("CARGO_PKG_NAME"))
            .connect_timeout(Duration::from_secs(self.settings.connect_timeout_seconds))
            .ssl_mode(match self.settings.ssl_mode {
                SslMode::Disable => tokio_postgres::config::SslMode::Disable,
                SslMode::Prefer => tokio_postgres::config::SslMode::Prefer,
                SslMode::Require | SslMode::VerifyCa | SslMode::VerifyFull => {
                    tokio_postgres::config::SslMode::Require
                }
            });
        config
    }
}

/// PostgreSQL client for one store
pub struct PostgreSQLClient {
    pool: Pool,
    role: StoreRole,
    location: String,
    statement_timeout_seconds: u64,
}

impl PostgreSQLClient {
    /// Build the connection pool
    ///
    /// No connection is opened until [`PostgreSQLClient::get_connection`].
    ///
    /// # Errors
    ///
    /// Returns a connection error for `role` if the TLS connector or the pool
    /// cannot be built.
    pub fn new(params: &ConnectionParams, role: StoreRole) -> Result<Self> {
        let settings = &params.settings;
        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = match settings.ssl_mode {
            SslMode::Disable => Manager::from_config(params.pg_config(), NoTls, manager_config),
            mode => {
                let connector = native_tls::TlsConnector::builder()
                    .danger_accept_invalid_certs(!mode.verifies_certificate())
                    .danger_accept_invalid_hostnames(!mode.verifies_hostname())
                    .build()
                    .map_err(|e| role.connection_error(format!("Failed to build TLS connector: {e}")))?;
                Manager::from_config(
                    params.pg_config(),
                    MakeTlsConnector::new(connector),
                    manager_config,
                )
            }
        };

        let timeout = Some(Duration::from_secs(settings.connect_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(settings.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .build()
            .map_err(|e| role.connection_error(format!("Failed to create connection pool: {e}")))?;

        tracing::debug!(
            role = %role,
            location = %params.describe(),
            ssl_mode = %settings.ssl_mode,
            max_connections = settings.max_connections,
            "PostgreSQL pool created"
        );

        Ok(Self {
            pool,
            role,
            location: params.describe(),
            statement_timeout_seconds: settings.statement_timeout_seconds,
        })
    }

    /// Get a connection with the statement timeout applied
    ///
    /// # Errors
    ///
    /// Returns a connection error if the server cannot be reached, rejects the
    /// credentials, or refuses the timeout setting.
    pub async fn get_connection(&self) -> Result<Object> {
        let client = self.pool.get().await.map_err(|e| {
            self.role
                .connection_error(format!("Failed to connect to {}: {e}", self.location))
        })?;

        if let Some(timeout_query) = statement_timeout_sql(self.statement_timeout_seconds) {
            client.batch_execute(&timeout_query).await.map_err(|e| {
                self.role.connection_error(format!(
                    "Failed to set statement timeout on {}: {}",
                    self.location,
                    describe_pg_error(&e)
                ))
            })?;
        }

        tracing::debug!(role = %self.role, location = %self.location, "Connection acquired");
        Ok(client)
    }

    /// `host:port/database`
    pub fn location(&self) -> &str {
        &self.location
    }
}

/// `SET statement_timeout` for a timeout in seconds, `None` when disabled
///
/// The value is capped at the largest timeout the server accepts.
fn statement_timeout_sql(seconds: u64) -> Option<String> {
    if seconds == 0 {
        return None;
    }
    let millis = seconds.saturating_mul(1000).min(i32::MAX as u64);
    Some(format!("SET statement_timeout = {millis}"))
}

/// Renders a driver error with the server message and detail when present
pub fn describe_pg_error(error: &tokio_postgres::Error) -> String {
    match error.as_db_error() {
        Some(db) => {
            let mut message = format!("{}: {}", db.severity(), db.message());
            if let Some(detail) = db.detail() {
                message.push_str(&format!(" ({detail})"));
            }
            message
        }
        None => {
            let mut message = error.to_string();
            let mut source = std::error::Error::source(error);
            while let Some(cause) = source {
                message.push_str(&format!(": {cause}"));
                source = cause.source();
            }
            message
        }
    }
}
