//! CLI error types and result alias.

use miette::Diagnostic;
use relforge_migrate::MigrationError;
use relforge_schema::SchemaError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(relforge::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(relforge::config))]
    Config(String),

    /// Schema loading or validation error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    /// Migration error
    #[error(transparent)]
    #[diagnostic(code(relforge::migration))]
    Migration(#[from] MigrationError),
}

impl CliError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Process exit code for this error.
    ///
    /// | code | meaning |
    /// |------|---------|
    /// | 1 | configuration or IO |
    /// | 2 | schema invalid |
    /// | 3 | database |
    /// | 4 | SQL generation |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) | Self::Config(_) => 1,
            Self::Schema(e) | Self::Migration(MigrationError::Validation(e)) => schema_exit_code(e),
            Self::Migration(MigrationError::SqlGeneration(_)) => 4,
            Self::Migration(_) => 3,
        }
    }
}

fn schema_exit_code(err: &SchemaError) -> i32 {
    match err {
        SchemaError::Io { .. } => 1,
        _ => 2,
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<relforge_postgres::PgError> for CliError {
    fn from(err: relforge_postgres::PgError) -> Self {
        CliError::Migration(err.into())
    }
}

impl From<dotenvy::Error> for CliError {
    fn from(err: dotenvy::Error) -> Self {
        CliError::Config(format!("Failed to load env file: {}", err))
    }
}
