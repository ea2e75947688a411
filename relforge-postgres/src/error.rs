//! Error types for PostgreSQL operations.

use relforge_migrate::MigrationError;
use thiserror::Error;

/// Result type for PostgreSQL operations.
pub type PgResult<T> = Result<T, PgError>;

/// Errors that can occur during PostgreSQL operations.
#[derive(Error, Debug)]
pub enum PgError {
    /// PostgreSQL error.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),
}

impl PgError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::Postgres(e) => e.is_closed(),
            Self::Config(_) | Self::Connection(_) => true,
        }
    }
}

impl From<PgError> for MigrationError {
    fn from(err: PgError) -> Self {
        match err {
            PgError::Postgres(e) if e.is_closed() => MigrationError::connection(e.to_string()),
            PgError::Postgres(e) => match e.as_db_error() {
                Some(db) => MigrationError::transaction(format!(
                    "{} (SQLSTATE {})",
                    db.message(),
                    db.code().code()
                )),
                None => MigrationError::transaction(e.to_string()),
            },
            PgError::Config(msg) | PgError::Connection(msg) => MigrationError::connection(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PgError::config("invalid URL");
        assert!(matches!(err, PgError::Config(_)));
        assert!(err.is_connection_error());

        let err = PgError::connection("connection refused");
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_into_migration_error() {
        let err: MigrationError = PgError::connection("refused").into();
        assert!(matches!(err, MigrationError::Connection(_)));

        let err: MigrationError = PgError::config("bad url").into();
        assert!(matches!(err, MigrationError::Connection(_)));
    }
}
