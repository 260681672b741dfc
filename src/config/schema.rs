//! Configuration schema types
//!
//! Every section is optional in the TOML file; missing keys take the defaults
//! defined here.

use crate::masking::MaskingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main Tablemask configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TablemaskConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source database settings
    #[serde(default)]
    pub source: ConnectionSettings,

    /// Target database settings
    #[serde(default)]
    pub target: ConnectionSettings,

    /// Write settings
    #[serde(default)]
    pub write: WriteConfig,

    /// Masking engine settings
    #[serde(default)]
    pub masking: MaskingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TablemaskConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate("source")?;
        self.target.validate("target")?;
        self.write.validate()?;
        self.masking.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (fetch and mask, don't write)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// TLS negotiation mode, named as in libpq
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    /// Whether the server certificate must chain to a trusted root
    pub fn verifies_certificate(&self) -> bool {
        matches!(self, SslMode::VerifyCa | SslMode::VerifyFull)
    }

    /// Whether the server host name must match the certificate
    pub fn verifies_hostname(&self) -> bool {
        matches!(self, SslMode::VerifyFull)
    }
}

impl std::str::FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "disable" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-full" => Ok(SslMode::VerifyFull),
            _ => Err(format!(
                "Invalid ssl_mode '{s}'. Must be one of: disable, prefer, require, verify-ca, verify-full"
            )),
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        };
        f.write_str(name)
    }
}

/// Connection settings shared by the source and target stores
///
/// Host, database and credentials are given on the command line; everything
/// else lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Server port
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// TLS mode
    #[serde(default)]
    pub ssl_mode: SslMode,

    /// Connection timeout in seconds
    #[serde(default = "default_pg_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// Statement timeout in seconds, 0 disables it
    #[serde(default = "default_pg_statement_timeout_seconds")]
    pub statement_timeout_seconds: u64,

    /// Maximum number of connections in the pool
    #[serde(default = "default_pg_max_connections")]
    pub max_connections: usize,
}

/// Largest statement timeout PostgreSQL accepts (`i32::MAX` milliseconds)
pub const MAX_STATEMENT_TIMEOUT_SECONDS: u64 = i32::MAX as u64 / 1000;

impl ConnectionSettings {
    fn validate(&self, section: &str) -> Result<(), String> {
        if self.port == 0 {
            return Err(format!("{section}.port must be > 0"));
        }

        if self.connect_timeout_seconds == 0 {
            return Err(format!("{section}.connect_timeout_seconds must be > 0"));
        }

        if self.statement_timeout_seconds > MAX_STATEMENT_TIMEOUT_SECONDS {
            return Err(format!(
                "{section}.statement_timeout_seconds must be at most {MAX_STATEMENT_TIMEOUT_SECONDS}, got {}",
                self.statement_timeout_seconds
            ));
        }

        if self.max_connections == 0 || self.max_connections > 100 {
            return Err(format!(
                "{section}.max_connections must be between 1 and 100, got {}",
                self.max_connections
            ));
        }

        Ok(())
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: default_pg_port(),
            ssl_mode: SslMode::default(),
            connect_timeout_seconds: default_pg_connect_timeout_seconds(),
            statement_timeout_seconds: default_pg_statement_timeout_seconds(),
            max_connections: default_pg_max_connections(),
        }
    }
}

/// Target write settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteConfig {
    /// Rows per INSERT statement
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Commit all rows in a single transaction
    #[serde(default = "default_true")]
    pub transactional: bool,
}

impl WriteConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 || self.batch_size > 10000 {
            return Err(format!(
                "write.batch_size must be between 1 and 10000, got {}",
                self.batch_size
            ));
        }
        Ok(())
    }
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            transactional: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_connect_timeout_seconds() -> u64 {
    30
}

fn default_pg_statement_timeout_seconds() -> u64 {
    60
}

fn default_pg_max_connections() -> usize {
    2
}

fn default_batch_size() -> usize {
    500
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connection_settings_validation() {
        let mut settings = ConnectionSettings::default();
        assert!(settings.validate("source").is_ok());

        settings.max_connections = 0;
        let err = settings.validate("source").unwrap_err();
        assert!(err.starts_with("source.max_connections"));

        settings.max_connections = 101;
        assert!(settings.validate("target").is_err());

        settings.max_connections = 4;
        settings.connect_timeout_seconds = 0;
        assert!(settings.validate("target").is_err());
    }

    #[test]
    fn test_statement_timeout_upper_bound() {
        let mut settings = ConnectionSettings {
            statement_timeout_seconds: MAX_STATEMENT_TIMEOUT_SECONDS,
            ..ConnectionSettings::default()
        };
        assert!(settings.validate("source").is_ok());

        settings.statement_timeout_seconds = MAX_STATEMENT_TIMEOUT_SECONDS + 1;
        let err = settings.validate("source").unwrap_err();
        assert!(err.starts_with("source.statement_timeout_seconds"));

        settings.statement_timeout_seconds = u64::MAX / 100;
        assert!(settings.validate("target").is_err());
    }

    #[test]
    fn test_statement_timeout_zero_is_allowed() {
        let settings = ConnectionSettings {
            statement_timeout_seconds: 0,
            ..ConnectionSettings::default()
        };
        assert!(settings.validate("source").is_ok());
    }

    #[test]
    fn test_write_config_validation() {
        let mut config = WriteConfig::default();
        assert!(config.validate().is_ok());

        config.batch_size = 0;
        assert!(config.validate().is_err());

        config.batch_size = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ssl_mode_parsing() {
        assert_eq!("verify-full".parse::<SslMode>().unwrap(), SslMode::VerifyFull);
        assert_eq!("disable".parse::<SslMode>().unwrap(), SslMode::Disable);
        assert!("allow".parse::<SslMode>().is_err());
        assert_eq!(SslMode::VerifyCa.to_string(), "verify-ca");
        assert!(SslMode::VerifyCa.verifies_certificate());
        assert!(!SslMode::VerifyCa.verifies_hostname());
        assert!(!SslMode::Require.verifies_certificate());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert_eq!(config.local_path, "./logs");
        assert_eq!(config.local_rotation, "daily");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logging_rotation_validation() {
        let config = LoggingConfig {
            local_rotation: "size".to_string(),
            ..LoggingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: TablemaskConfig = toml::from_str("").unwrap();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.source.port, 5432);
        assert_eq!(config.target.ssl_mode, SslMode::Prefer);
        assert_eq!(config.write.batch_size, 500);
        assert!(config.write.transactional);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config: TablemaskConfig = toml::from_str(
            r#"
[source]
ssl_mode = "require"
max_connections = 4

[write]
transactional = false
"#,
        )
        .unwrap();
        assert_eq!(config.source.ssl_mode, SslMode::Require);
        assert_eq!(config.source.max_connections, 4);
        assert_eq!(config.source.connect_timeout_seconds, 30);
        assert_eq!(config.target.max_connections, 2);
        assert!(!config.write.transactional);
        assert_eq!(config.write.batch_size, 500);
    }

    #[test]
    fn test_unknown_ssl_mode_rejected() {
        let result: Result<TablemaskConfig, _> = toml::from_str("[target]\nssl_mode = \"allow\"\n");
        assert!(result.is_err());
    }
}
