//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Fill an empty target password from `CSV_MIGRATE_PASSWORD`.
    pub fn with_env_password(mut self) -> Self {
        if self.target.password.is_empty() {
            if let Ok(password) = std::env::var(PASSWORD_ENV_VAR) {
                self.target.password = password;
            }
        }
        self
    }

    /// True when records are written with upsert semantics.
    pub fn is_upsert(&self) -> bool {
        self.migration.mode == WriteMode::Upsert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.target.host, "localhost");
        assert_eq!(config.target.port, 1433);
        assert_eq!(config.target.database, "MainDB");
        assert_eq!(config.input.delimiter, ';');
        assert_eq!(config.input.extension, "csv");
        assert_eq!(config.input.header_separator, "$$");
        assert_eq!(config.migration.mode, WriteMode::Insert);
        assert_eq!(config.migration.upsert_style, UpsertStyle::Conditional);
        assert!(!config.is_upsert());
    }

    #[test]
    fn test_from_yaml_overrides() {
        let yaml = r#"
target:
  host: db.internal
  port: 14330
  database: Staging
  user: loader
  password: secret
  ssl_mode: disable
input:
  delimiter: ","
  extension: txt
migration:
  mode: upsert
  upsert_style: merge
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.target.host, "db.internal");
        assert_eq!(config.target.port, 14330);
        assert_eq!(config.target.password, "secret");
        assert_eq!(config.input.delimiter, ',');
        assert_eq!(config.input.extension, "txt");
        assert!(config.is_upsert());
        assert_eq!(config.migration.upsert_style, UpsertStyle::Merge);
    }

    #[test]
    fn test_from_yaml_rejects_invalid_values() {
        assert!(Config::from_yaml("input:\n  delimiter: \"\\n\"\n").is_err());
        assert!(Config::from_yaml("migration:\n  mode: replace\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "migration:\n  mode: upsert").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert!(config.is_upsert());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, crate::error::MigrateError::Io(_)));
    }
}
