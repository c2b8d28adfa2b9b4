//! Error types for the migration library.

use thiserror::Error;

/// SQL Server error number for "There is already an object named ... in the database".
const MSSQL_OBJECT_EXISTS: u32 = 2714;

/// Exit code for configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;

/// Exit code for file/IO errors during startup.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML values, bad delimiter, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input line is not valid UTF-8
    #[error("Line {line} is not valid UTF-8")]
    InvalidEncoding { line: u64 },

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Error reported by the database while executing a statement
    #[error("Database error{}: {message}", code.map(|c| format!(" {}", c)).unwrap_or_default())]
    Database { code: Option<u32>, message: String },

    /// Path is neither a delimited file nor a directory containing one
    #[error("Invalid input path: {0}")]
    InvalidInput(String),

    /// File has no header line
    #[error("Input file {0} is empty (no header line)")]
    EmptyInput(String),

    /// Record field count does not match the header column count
    #[error("Record has {actual} fields but the header declares {expected} columns")]
    FieldCountMismatch { expected: usize, actual: usize },

    /// Table creation failed
    #[error("Could not create table {table}: {source}")]
    SchemaCreation {
        table: String,
        #[source]
        source: Box<MigrateError>,
    },
}

impl MigrateError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Database error with an optional server error number
    pub fn database(code: Option<u32>, message: impl Into<String>) -> Self {
        MigrateError::Database {
            code,
            message: message.into(),
        }
    }

    /// Wrap an error raised while creating `table`.
    pub fn schema_creation(table: impl Into<String>, source: MigrateError) -> Self {
        MigrateError::SchemaCreation {
            table: table.into(),
            source: Box::new(source),
        }
    }

    /// True if the database refused to create an object because it already exists.
    pub fn is_object_exists(&self) -> bool {
        match self {
            MigrateError::Database { code, .. } => *code == Some(MSSQL_OBJECT_EXISTS),
            MigrateError::SchemaCreation { source, .. } => source.is_object_exists(),
            _ => false,
        }
    }

    /// Process exit code for errors that abort the run before migration starts.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Io(_) => EXIT_IO_ERROR,
            _ => EXIT_CONFIG_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

impl From<tiberius::error::Error> for MigrateError {
    fn from(e: tiberius::error::Error) -> Self {
        let code = match &e {
            tiberius::error::Error::Server(token) => Some(token.code()),
            _ => None,
        };
        MigrateError::Database {
            code,
            message: e.to_string(),
        }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
