//! PostgreSQL connection used as a migration driver.

use async_trait::async_trait;
use relforge_migrate::{CatalogEnum, MigrateResult, MigrationDriver, MigrationError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, warn};

use crate::config::PgConfig;
use crate::error::{PgError, PgResult};

/// Lists user-defined enum types with their object id and namespace.
///
/// System namespaces and extension-owned types are excluded.
pub const ENUM_TYPES_QUERY: &str = "SELECT t.oid, n.nspname::text, t.typname::text \
     FROM pg_type t JOIN pg_namespace n ON n.oid = t.typnamespace \
     WHERE t.typtype = 'e' \
     AND n.nspname NOT IN ('pg_catalog', 'information_schema') \
     AND NOT EXISTS (SELECT 1 FROM pg_depend d \
     WHERE d.classid = 'pg_type'::regclass AND d.objid = t.oid AND d.deptype = 'e')";

/// Lists the base tables of one schema.
pub const TABLES_QUERY: &str = "SELECT table_name::text FROM information_schema.tables \
     WHERE table_schema = $1 AND table_type = 'BASE TABLE'";

/// A single PostgreSQL connection.
///
/// The connection task runs in the background until [`PgConnection::close`]
/// drops the client.
pub struct PgConnection {
    client: Mutex<Option<Client>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PgConnection {
    /// Open a connection.
    pub async fn connect(config: &PgConfig) -> PgResult<Self> {
        debug!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "connecting to postgres"
        );
        let (client, connection) = config
            .to_pg_config()
            .connect(NoTls)
            .await
            .map_err(|e| PgError::connection(e.to_string()))?;

        let task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "postgres connection ended with error");
            }
        });

        Ok(Self {
            client: Mutex::new(Some(client)),
            task: Mutex::new(Some(task)),
        })
    }

    /// Open a connection from a database URL.
    pub async fn connect_url(url: &str) -> PgResult<Self> {
        Self::connect(&PgConfig::from_url(url)?).await
    }

    /// Execute one or more statements in a single round-trip.
    pub async fn batch_execute(&self, sql: &str) -> PgResult<()> {
        let guard = self.client.lock().await;
        open(&guard)?.batch_execute(sql).await?;
        Ok(())
    }

    /// List the base tables of a schema.
    pub async fn tables(&self, schema: &str) -> PgResult<Vec<String>> {
        let guard = self.client.lock().await;
        let rows = open(&guard)?.query(TABLES_QUERY, &[&schema]).await?;
        rows.iter()
            .map(|row| row.try_get::<_, String>(0).map_err(PgError::from))
            .collect()
    }

    /// List every enum type.
    pub async fn enum_types(&self) -> PgResult<Vec<CatalogEnum>> {
        let guard = self.client.lock().await;
        let rows = open(&guard)?.query(ENUM_TYPES_QUERY, &[]).await?;
        rows.iter()
            .map(|row| {
                let oid: u32 = row.try_get(0)?;
                let schema: String = row.try_get(1)?;
                let name: String = row.try_get(2)?;
                Ok(CatalogEnum::new(oid, schema, name))
            })
            .collect()
    }
}

fn open(client: &Option<Client>) -> PgResult<&Client> {
    client
        .as_ref()
        .ok_or_else(|| PgError::connection("connection is closed"))
}

#[async_trait]
impl MigrationDriver for PgConnection {
    async fn ping(&self) -> MigrateResult<()> {
        self.batch_execute("SELECT 1")
            .await
            .map_err(|e| MigrationError::connection(e.to_string()))
    }

    async fn list_tables(&self, schema: &str) -> MigrateResult<Vec<String>> {
        let tables = self.tables(schema).await?;
        debug!(schema, count = tables.len(), "listed tables");
        Ok(tables)
    }

    async fn list_enums(&self) -> MigrateResult<Vec<CatalogEnum>> {
        let enums = self.enum_types().await?;
        debug!(count = enums.len(), "listed enum types");
        Ok(enums)
    }

    async fn execute(&self, sql: &str) -> MigrateResult<()> {
        debug!(sql = %sql, "executing batch");
        Ok(self.batch_execute(sql).await?)
    }

    async fn close(&self) -> MigrateResult<()> {
        // Dropping the client lets the connection task finish.
        drop(self.client.lock().await.take());

        if let Some(task) = self.task.lock().await.take() {
            task.await
                .map_err(|e| MigrationError::close_connection(e.to_string()))?;
        }
        debug!("connection closed");
        Ok(())
    }
}
