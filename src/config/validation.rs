//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (pool size > 0, status codes in range)
//! - Check TLS material is configured consistently
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Non-canonical failure codes are not errors; option resolution drops them

use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::InvokerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("client.pool_size must be greater than zero")]
    ZeroPoolSize,

    #[error("client.content_type must not be empty")]
    EmptyContentType,

    #[error("client.failure_codes contains {0}, which is not an HTTP status code")]
    InvalidStatusCode(u16),

    #[error("client.tls requires cert_path and key_path together")]
    IncompleteIdentity,

    #[error("observability.log_level '{0}' is not a valid filter")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &InvokerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let client = &config.client;

    if client.pool_size == Some(0) {
        errors.push(ValidationError::ZeroPoolSize);
    }

    if matches!(&client.content_type, Some(ct) if ct.trim().is_empty()) {
        errors.push(ValidationError::EmptyContentType);
    }

    for code in &client.failure_codes {
        if !(100..=599).contains(code) {
            errors.push(ValidationError::InvalidStatusCode(*code));
        }
    }

    if let Some(tls) = &client.tls {
        if tls.cert_path.is_some() != tls.key_path.is_some() {
            errors.push(ValidationError::IncompleteIdentity);
        }
    }

    let observability = &config.observability;
    if EnvFilter::try_new(&observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }

    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
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
    use crate::config::TlsConfig;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&InvokerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = InvokerConfig::default();
        config.client.pool_size = Some(0);
        config.client.content_type = Some("  ".into());
        config.client.failure_codes = vec![500, 42, 1000];
        config.client.tls = Some(TlsConfig {
            cert_path: Some(PathBuf::from("cert.pem")),
            ..TlsConfig::default()
        });
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroPoolSize,
                ValidationError::EmptyContentType,
                ValidationError::InvalidStatusCode(42),
                ValidationError::InvalidStatusCode(1000),
                ValidationError::IncompleteIdentity,
                ValidationError::InvalidMetricsAddress("nowhere".into()),
            ]
        );
    }

    #[test]
    fn test_non_canonical_failure_codes_allowed() {
        let mut config = InvokerConfig::default();
        config.client.failure_codes = vec![200, 404];
        assert!(validate_config(&config).is_ok());
    }
}
