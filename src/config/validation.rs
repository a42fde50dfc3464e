//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the bind address is a usable `host:port`
//! - Check names can be carried in a response header
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PlatformConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::Ipv6Addr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::PlatformConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address {address:?}: {reason}")]
    BindAddress { address: String, reason: &'static str },

    #[error("name must not be empty")]
    EmptyName,

    #[error("app name {0:?} cannot be used as a server header")]
    AppNameNotHeaderSafe(String),
}

/// Validate a whole platform config.
pub fn validate_config(config: &PlatformConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_bind_address(&config.bind_address) {
        errors.push(e);
    }

    if matches!(config.name.as_deref(), Some(n) if n.trim().is_empty()) {
        errors.push(ValidationError::EmptyName);
    }

    if config.engine.server_header {
        let app_name = config
            .app_name
            .as_deref()
            .unwrap_or(&config.engine.app_name);
        if HeaderValue::from_str(app_name).is_err() {
            errors.push(ValidationError::AppNameNotHeaderSafe(app_name.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that `address` looks like `host:port`, `[v6]:port` or `:port`.
///
/// Hostnames are not resolved here; that happens at bind time.
pub fn validate_bind_address(address: &str) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::BindAddress {
        address: address.to_string(),
        reason,
    };

    let (host, port) = address.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;

    if port.parse::<u16>().is_err() {
        return Err(invalid("port must be a number between 0 and 65535"));
    }

    if let Some(inner) = host.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| invalid("unterminated IPv6 bracket"))?;
        inner
            .parse::<Ipv6Addr>()
            .map_err(|_| invalid("invalid IPv6 address"))?;
        return Ok(());
    }

    if host.contains(':') {
        return Err(invalid("IPv6 hosts must be bracketed"));
    }
    if host.chars().any(char::is_whitespace) {
        return Err(invalid("host contains whitespace"));
    }

    Ok(())
}
