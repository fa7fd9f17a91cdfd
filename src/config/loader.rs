//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the persisted inventory file path.
pub const ENV_DATA_FILE: &str = "INVENTORY_DATA_FILE";
/// Environment variable overriding the low-stock threshold.
pub const ENV_LOW_STOCK_THRESHOLD: &str = "LOW_STOCK_THRESHOLD";
/// Environment variable overriding the listener bind address.
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {name}: {value}")]
    Env { name: &'static str, value: String },

    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: built-in defaults, an optional TOML file, then
/// environment overrides, validated as a whole.
pub fn load(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env_overrides(config: &mut ServiceConfig) -> Result<(), ConfigError> {
    if let Ok(value) = env::var(ENV_DATA_FILE) {
        config.store.data_file = value.into();
    }
    if let Ok(value) = env::var(ENV_LOW_STOCK_THRESHOLD) {
        config.store.low_stock_threshold = value.parse().map_err(|_| ConfigError::Env {
            name: ENV_LOW_STOCK_THRESHOLD,
            value,
        })?;
    }
    if let Ok(value) = env::var(ENV_BIND_ADDRESS) {
        config.listener.bind_address = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.toml");
        fs::write(
            &path,
            r#"
            [listener]
            bind_address = "127.0.0.1:9100"
            "#,
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9100");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.toml");
        fs::write(&path, "listener = 7").unwrap();

        assert!(matches!(load(Some(&path)), Err(ConfigError::Parse(_))));
    }

    // Environment overrides are process-global, so every case touching these
    // variables runs inside one test; no other test reads them.
    #[test]
    fn test_defaults_then_env_overrides() {
        let config = load(None).unwrap();
        assert_eq!(config.store.low_stock_threshold, 10);

        env::set_var(ENV_DATA_FILE, "/tmp/env-inventory.json");
        env::set_var(ENV_LOW_STOCK_THRESHOLD, "25");
        let overridden = load(None);
        env::set_var(ENV_LOW_STOCK_THRESHOLD, "not-a-number");
        let rejected = load(None);
        env::remove_var(ENV_DATA_FILE);
        env::remove_var(ENV_LOW_STOCK_THRESHOLD);

        let overridden = overridden.unwrap();
        assert_eq!(
            overridden.store.data_file,
            std::path::PathBuf::from("/tmp/env-inventory.json")
        );
        assert_eq!(overridden.store.low_stock_threshold, 25);

        assert!(matches!(rejected, Err(ConfigError::Env { .. })));
    }
}
