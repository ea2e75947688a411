//! Error types for DDL generation and migration.

use relforge_schema::SchemaError;
use thiserror::Error;

use crate::engine::Phase;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur while generating or applying a migration.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The schema failed validation.
    #[error("schema error: {0}")]
    Validation(#[from] SchemaError),

    /// DDL could not be produced from the schema.
    #[error("sql generation error: {0}")]
    SqlGeneration(String),

    /// The database rejected a statement batch.
    #[error(
        "transaction error{}: {message}",
        .phase.map(|p| format!(" during {p}")).unwrap_or_default()
    )]
    Transaction {
        /// Phase that was running, once known.
        phase: Option<Phase>,
        /// Database error message.
        message: String,
    },

    /// The database could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The connection could not be closed cleanly.
    #[error("close connection error: {0}")]
    CloseConnection(String),

    /// The schema names a provider with no driver.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),
}

impl MigrationError {
    /// Create an SQL generation error.
    pub fn sql_generation(msg: impl Into<String>) -> Self {
        Self::SqlGeneration(msg.into())
    }

    /// Create a transaction error not yet tied to a phase.
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction {
            phase: None,
            message: msg.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a close connection error.
    pub fn close_connection(msg: impl Into<String>) -> Self {
        Self::CloseConnection(msg.into())
    }

    /// Create an unsupported provider error.
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        Self::UnsupportedProvider(provider.into())
    }

    /// Tag a transaction error with the phase it happened in.
    ///
    /// Other variants are returned unchanged, as is a transaction error that
    /// already carries a phase.
    pub fn in_phase(self, phase: Phase) -> Self {
        match self {
            Self::Transaction {
                phase: None,
                message,
            } => Self::Transaction {
                phase: Some(phase),
                message,
            },
            other => other,
        }
    }

    /// The phase that failed, if known.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Transaction { phase, .. } => *phase,
            _ => None,
        }
    }

    /// Check if the error came from the database rather than the schema.
    pub fn is_database(&self) -> bool {
        matches!(
            self,
            Self::Transaction { .. }
                | Self::Connection(_)
                | Self::CloseConnection(_)
                | Self::UnsupportedProvider(_)
        )
    }

    /// Migrations are never retried; every error is terminal for the run.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
