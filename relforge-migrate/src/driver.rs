//! Database driver abstraction used by the migration engine.

use crate::error::MigrateResult;

/// An enum type found in the database catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEnum {
    /// Catalog object id.
    pub oid: u32,
    /// Namespace the type lives in.
    pub schema: String,
    /// Type name.
    pub name: String,
}

impl CatalogEnum {
    /// Create a new catalog enum entry.
    pub fn new(oid: u32, schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            oid,
            schema: schema.into(),
            name: name.into(),
        }
    }
}

/// A single database connection the engine runs statements on.
///
/// Statements are plain SQL text executed as-is; there is no parameter
/// binding. Implementations report statement failures as
/// [`MigrationError::Transaction`](crate::MigrationError::Transaction) without a
/// phase; the engine adds it.
#[async_trait::async_trait]
pub trait MigrationDriver: Send + Sync {
    /// Check the connection is alive.
    async fn ping(&self) -> MigrateResult<()>;

    /// List the tables in a database schema (e.g. `public`).
    async fn list_tables(&self, schema: &str) -> MigrateResult<Vec<String>>;

    /// List the user-defined enum types in every namespace.
    ///
    /// System namespaces and types owned by an extension are not listed.
    async fn list_enums(&self) -> MigrateResult<Vec<CatalogEnum>>;

    /// Execute one or more statements.
    async fn execute(&self, sql: &str) -> MigrateResult<()>;

    /// Close the connection.
    async fn close(&self) -> MigrateResult<()>;
}
