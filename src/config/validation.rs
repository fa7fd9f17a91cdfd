//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and required paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic configuration problem.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The bind address does not parse as `host:port`.
    #[error("invalid bind address: {0}")]
    BindAddress(String),

    /// The inventory data file path is empty.
    #[error("inventory data file path is empty")]
    EmptyDataFile,

    /// The request timeout is zero.
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.store.data_file.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyDataFile);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
