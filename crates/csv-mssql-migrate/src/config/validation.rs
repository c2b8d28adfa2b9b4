//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Target validation
    if config.target.host.is_empty() {
        return Err(MigrateError::Config("target.host is required".into()));
    }
    if config.target.database.is_empty() {
        return Err(MigrateError::Config("target.database is required".into()));
    }
    if config.target.user.is_empty() {
        return Err(MigrateError::Config("target.user is required".into()));
    }
    if config.target.max_connections == 0 {
        return Err(MigrateError::Config(
            "target.max_connections must be at least 1".into(),
        ));
    }

    // Input validation
    let delimiter = config.input.delimiter;
    if !delimiter.is_ascii() || delimiter == '\n' || delimiter == '\r' {
        return Err(MigrateError::Config(format!(
            "input.delimiter must be a single ASCII character other than a line break, got {:?}",
            delimiter
        )));
    }
    if config.input.extension.is_empty() {
        return Err(MigrateError::Config("input.extension is required".into()));
    }
    if config.input.extension.starts_with('.') {
        return Err(MigrateError::Config(format!(
            "input.extension is given without the leading '.', got {:?}",
            config.input.extension
        )));
    }
    if config.input.header_separator.is_empty() {
        return Err(MigrateError::Config(
            "input.header_separator cannot be empty".into(),
        ));
    }
    if config.input.header_separator.contains(delimiter) {
        return Err(MigrateError::Config(format!(
            "input.header_separator {:?} cannot contain the delimiter {:?}",
            config.input.header_separator, delimiter
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_missing_target_host() {
        let mut config = Config::default();
        config.target.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_connections_rejected() {
        let mut config = Config::default();
        config.target.max_connections = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let mut config = Config::default();
        config.input.delimiter = '§';
        assert!(validate(&config).is_err());

        config.input.delimiter = '\n';
        assert!(validate(&config).is_err());

        config.input.delimiter = '\t';
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_extension_with_leading_dot_rejected() {
        let mut config = Config::default();
        config.input.extension = ".csv".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("input.extension"));

        config.input.extension = "CSV".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_separator_containing_delimiter_rejected() {
        let mut config = Config::default();
        config.input.delimiter = '$';
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_target_config_debug_redacts_password() {
        let mut config = Config::default();
        config.target.password = "super_secret_password_123".to_string();
        let debug_output = format!("{:?}", config.target);
        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
        assert!(
            !debug_output.contains("super_secret_password_123"),
            "Debug output should not contain actual password value"
        );
    }
}
