//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{ConnectionSettings, TablemaskConfig};
use crate::domain::errors::TablemaskError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "tablemask.toml";

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "TABLEMASK_CONFIG";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into TablemaskConfig
/// 4. Applies environment variable overrides (TABLEMASK_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use tablemask::config::loader::load_config;
///
/// let config = load_config("tablemask.toml")?;
/// # Ok::<(), tablemask::domain::TablemaskError>(())
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TablemaskConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TablemaskError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TablemaskError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: TablemaskConfig = toml::from_str(&contents)
        .map_err(|e| TablemaskError::Configuration(format!("Failed to parse TOML: {e}")))?;

    finish(config)
}

/// Resolves and loads the configuration for a command
///
/// An explicit path (from `--config` or `TABLEMASK_CONFIG`) must exist. With
/// no explicit path, `tablemask.toml` in the working directory is used if
/// present, and built-in defaults otherwise. Environment overrides and
/// validation apply in every case.
pub fn load_config_or_default(explicit: Option<&Path>) -> Result<TablemaskConfig> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));

    if let Some(path) = explicit {
        return load_config(path);
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return load_config(default_path);
    }

    tracing::debug!("No configuration file found, using built-in defaults");
    finish(TablemaskConfig::default())
}

fn finish(mut config: TablemaskConfig) -> Result<TablemaskConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        TablemaskError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
pub fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| TablemaskError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TablemaskError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.parse().map(Some).map_err(|_| {
            TablemaskError::Configuration(format!("Invalid {name} value: {val}"))
        }),
        Err(_) => Ok(None),
    }
}

fn apply_connection_overrides(settings: &mut ConnectionSettings, section: &str) -> Result<()> {
    let var = |key: &str| format!("TABLEMASK_{section}_{key}");

    if let Some(port) = env_parse(&var("PORT"))? {
        settings.port = port;
    }
    if let Ok(val) = std::env::var(var("SSL_MODE")) {
        settings.ssl_mode = val.parse().map_err(TablemaskError::Configuration)?;
    }
    if let Some(seconds) = env_parse(&var("CONNECT_TIMEOUT_SECONDS"))? {
        settings.connect_timeout_seconds = seconds;
    }
    if let Some(seconds) = env_parse(&var("STATEMENT_TIMEOUT_SECONDS"))? {
        settings.statement_timeout_seconds = seconds;
    }
    if let Some(max) = env_parse(&var("MAX_CONNECTIONS"))? {
        settings.max_connections = max;
    }
    Ok(())
}

/// Applies environment variable overrides using the TABLEMASK_* prefix
///
/// Environment variables follow the pattern: TABLEMASK_<SECTION>_<KEY>
/// For example: TABLEMASK_SOURCE_PORT, TABLEMASK_WRITE_BATCH_SIZE
pub fn apply_env_overrides(config: &mut TablemaskConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("TABLEMASK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(dry_run) = env_parse("TABLEMASK_APPLICATION_DRY_RUN")? {
        config.application.dry_run = dry_run;
    }

    apply_connection_overrides(&mut config.source, "SOURCE")?;
    apply_connection_overrides(&mut config.target, "TARGET")?;

    // Write overrides
    if let Some(size) = env_parse("TABLEMASK_WRITE_BATCH_SIZE")? {
        config.write.batch_size = size;
    }
    if let Some(transactional) = env_parse("TABLEMASK_WRITE_TRANSACTIONAL")? {
        config.write.transactional = transactional;
    }

    config.masking.apply_env_overrides()?;

    // Logging overrides
    if let Some(enabled) = env_parse("TABLEMASK_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("TABLEMASK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("TABLEMASK_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
