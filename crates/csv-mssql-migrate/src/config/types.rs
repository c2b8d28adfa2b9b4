//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment variable consulted when the config file carries no password.
pub const PASSWORD_ENV_VAR: &str = "CSV_MIGRATE_PASSWORD";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target database (SQL Server) configuration.
    #[serde(default)]
    pub target: TargetConfig,

    /// Input file format.
    #[serde(default)]
    pub input: InputConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Target database (SQL Server) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Database host (default: "localhost").
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port (default: 1433).
    #[serde(default = "default_mssql_port")]
    pub port: u16,

    /// Database name (default: "MainDB").
    #[serde(default = "default_database")]
    pub database: String,

    /// Username (default: "SA").
    #[serde(default = "default_user")]
    pub user: String,

    /// Password. Falls back to `CSV_MIGRATE_PASSWORD` when empty.
    #[serde(default)]
    pub password: String,

    /// SSL mode: "disable" turns encryption off, anything else requires it.
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,

    /// Maximum pooled connections (default: 1, writes are sequential).
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_mssql_port(),
            database: default_database(),
            user: default_user(),
            password: String::new(),
            ssl_mode: default_ssl_mode(),
            max_connections: default_max_connections(),
        }
    }
}

impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Layout of the delimited input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Field delimiter (default: ';').
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// File extension that marks an input file, compared case-insensitively (default: "csv").
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Token separating column name from type clause in the header (default: "$$").
    #[serde(default = "default_header_separator")]
    pub header_separator: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            extension: default_extension(),
            header_separator: default_header_separator(),
        }
    }
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Write mode (default: insert).
    #[serde(default)]
    pub mode: WriteMode,

    /// How upserts are rendered (default: conditional).
    #[serde(default)]
    pub upsert_style: UpsertStyle,
}

/// How records are written into the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Plain INSERT; an existing table aborts the file.
    #[default]
    Insert,

    /// INSERT new keys, UPDATE existing ones; an existing table is reused.
    Upsert,
}

/// SQL rendering used for upserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertStyle {
    /// `IF NOT EXISTS (...) INSERT ... ELSE UPDATE ...`
    #[default]
    Conditional,

    /// Native `MERGE` statement.
    Merge,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_mssql_port() -> u16 {
    1433
}

fn default_database() -> String {
    "MainDB".to_string()
}

fn default_user() -> String {
    "SA".to_string()
}

fn default_ssl_mode() -> String {
    "require".to_string()
}

fn default_max_connections() -> u32 {
    1
}

fn default_delimiter() -> char {
    ';'
}

fn default_extension() -> String {
    "csv".to_string()
}

fn default_header_separator() -> String {
    "$$".to_string()
}
