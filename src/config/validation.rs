//! Configuration validation.
//!
//! Returns every problem found rather than stopping at the first, so an
//! operator can fix a config file in one pass.

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::{AppConfig, StoreBackend};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Check value ranges and cross-field consistency.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be greater than zero",
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new(
            "listener.max_body_bytes",
            "must be greater than zero",
        ));
    }

    for (field, name) in [
        ("trace.inbound_header", &config.trace.inbound_header),
        ("trace.outbound_header", &config.trace.outbound_header),
    ] {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                field,
                format!("'{name}' is not a valid header name"),
            ));
        }
    }

    if config.logging.level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::new(
            "logging.level",
            format!("unknown level '{}'", config.logging.level),
        ));
    }
    if config.logging.file && config.logging.directory.trim().is_empty() {
        errors.push(ValidationError::new(
            "logging.directory",
            "required when file logging is enabled",
        ));
    }

    let inventory = &config.inventory;
    if inventory.default_page_size == 0 {
        errors.push(ValidationError::new(
            "inventory.default_page_size",
            "must be at least 1",
        ));
    }
    if inventory.max_page_size < inventory.default_page_size {
        errors.push(ValidationError::new(
            "inventory.max_page_size",
            "must not be smaller than default_page_size",
        ));
    }
    if inventory.backend == StoreBackend::Mysql {
        if inventory.database_url.as_deref().map_or(true, str::is_empty) {
            errors.push(ValidationError::new(
                "inventory.database_url",
                "required for the mysql backend",
            ));
        }
        if inventory.max_connections == 0 {
            errors.push(ValidationError::new(
                "inventory.max_connections",
                "must be greater than zero",
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_mysql_requires_url() {
        let mut config = AppConfig::default();
        config.inventory.backend = StoreBackend::Mysql;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "inventory.database_url");

        config.inventory.database_url = Some("mysql://root@localhost/shop".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = AppConfig::default();
        config.inventory.default_page_size = 50;
        config.inventory.max_page_size = 20;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "inventory.max_page_size");
    }

    #[test]
    fn test_bad_header_and_level() {
        let mut config = AppConfig::default();
        config.trace.outbound_header = "X Trace".into();
        config.logging.level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["trace.outbound_header", "logging.level"]);
    }
}
