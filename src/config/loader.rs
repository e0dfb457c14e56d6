//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::InvokerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<InvokerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = ?path, "Configuration loaded");
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<InvokerConfig, ConfigError> {
    let config: InvokerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [client]
            content_type = "application/json"
            pool_size = 200
            failure_codes = [500, 503]

            [observability]
            log_level = "debug"
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.client.pool_size, Some(200));
        assert_eq!(config.client.failure_codes, vec![500, 503]);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.client.tls.is_none());
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_validation_errors_surface() {
        let err = parse_config("[client]\npool_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("pool_size"));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[client\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\ncontent_type = \"text/plain\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.client.content_type.as_deref(), Some("text/plain"));

        let missing = load_config(Path::new("/no/such/config.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
