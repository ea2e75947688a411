//! Migration engine implementation.
//!
//! A run drops every table and enum type found in the database and recreates
//! the schema from scratch, in five phases:
//!
//! ```text
//! DropTables → DropEnums → CreateEnums → CreateTables → CreateRelations
//! ```
//!
//! All DDL is generated before the database is touched. The drop phases work
//! from catalog discovery, not from the declared schema, so objects that are no
//! longer declared are dropped too. The first failure ends the run.

use std::time::Instant;

use relforge_schema::{Schema, validate};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::driver::MigrationDriver;
use crate::error::{MigrateResult, MigrationError};
use crate::sql::{PostgresSqlGenerator, wrap_transaction};

/// Phases of a migration run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Drop every table in the database schema.
    DropTables,
    /// Drop every enum type.
    DropEnums,
    /// Create declared enum types.
    CreateEnums,
    /// Create declared tables without foreign keys.
    CreateTables,
    /// Add foreign key constraints.
    CreateRelations,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 5] = [
        Phase::DropTables,
        Phase::DropEnums,
        Phase::CreateEnums,
        Phase::CreateTables,
        Phase::CreateRelations,
    ];

    /// Get the phase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DropTables => "drop tables",
            Self::DropEnums => "drop enums",
            Self::CreateEnums => "create enums",
            Self::CreateTables => "create tables",
            Self::CreateRelations => "create relations",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for the migration engine.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Run all phases in one transaction.
    pub atomic: bool,
    /// Database schema searched for tables to drop.
    pub database_schema: String,
    /// Discover and plan, but execute nothing.
    pub dry_run: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            atomic: true,
            database_schema: "public".to_string(),
            dry_run: false,
        }
    }
}

impl MigrationConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether all phases share one transaction.
    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// Set the database schema searched for tables.
    pub fn database_schema(mut self, schema: impl Into<String>) -> Self {
        self.database_schema = schema.into();
        self
    }

    /// Enable dry-run mode.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// DDL generated from a schema, independent of database state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    /// `CREATE TYPE` statements.
    pub create_enums: Vec<String>,
    /// `CREATE TABLE` statements.
    pub create_tables: Vec<String>,
    /// Foreign key statements.
    pub create_relations: Vec<String>,
}

impl MigrationPlan {
    /// Validate a schema and generate its DDL.
    pub fn from_schema(schema: &Schema) -> MigrateResult<Self> {
        let index = validate(schema)?;
        let generator = PostgresSqlGenerator;
        let tables = generator.generate_table_ddl(&schema.models, &index)?;

        Ok(Self {
            create_enums: generator.generate_enum_ddl(&schema.enums),
            create_tables: tables.tables,
            create_relations: tables.relations,
        })
    }

    /// Statements for a create phase. Drop phases are not planned here.
    pub fn statements(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::CreateEnums => &self.create_enums,
            Phase::CreateTables => &self.create_tables,
            Phase::CreateRelations => &self.create_relations,
            Phase::DropTables | Phase::DropEnums => &[],
        }
    }

    /// Total number of create statements.
    pub fn len(&self) -> usize {
        self.create_enums.len() + self.create_tables.len() + self.create_relations.len()
    }

    /// Check if there is nothing to create.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the non-empty create batches, each wrapped in a transaction.
    pub fn to_sql(&self) -> String {
        [Phase::CreateEnums, Phase::CreateTables, Phase::CreateRelations]
            .into_iter()
            .map(|phase| self.statements(phase))
            .filter(|stmts| !stmts.is_empty())
            .map(wrap_transaction)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Outcome of one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    /// The phase.
    pub phase: Phase,
    /// Number of statements in the batch.
    pub statements: usize,
    /// Whether the batch was sent to the database.
    pub executed: bool,
    /// Time spent in milliseconds.
    pub duration_ms: u64,
}

/// Result of a migration run.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    /// One report per phase, in order.
    pub phases: Vec<PhaseReport>,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl MigrationResult {
    /// Number of statements sent to the database.
    pub fn executed_statements(&self) -> usize {
        self.phases
            .iter()
            .filter(|p| p.executed)
            .map(|p| p.statements)
            .sum()
    }

    /// Report for a phase.
    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    /// Get a summary of the result.
    pub fn summary(&self) -> String {
        let executed = self.phases.iter().filter(|p| p.executed).count();
        if self.dry_run {
            let planned: usize = self.phases.iter().map(|p| p.statements).sum();
            format!("dry run: {planned} statements planned")
        } else {
            format!(
                "{} statements in {} phases ({}ms)",
                self.executed_statements(),
                executed,
                self.duration_ms
            )
        }
    }
}

/// The migration engine.
pub struct MigrationEngine<D: MigrationDriver> {
    config: MigrationConfig,
    driver: D,
}

impl<D: MigrationDriver> MigrationEngine<D> {
    /// Create a new migration engine.
    pub fn new(config: MigrationConfig, driver: D) -> Self {
        Self { config, driver }
    }

    /// Get the configuration.
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Get the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Plan a migration without touching the database.
    pub fn plan(&self, schema: &Schema) -> MigrateResult<MigrationPlan> {
        MigrationPlan::from_schema(schema)
    }

    /// Run a full migration and close the connection, whatever the outcome.
    pub async fn run(&self, schema: &Schema) -> MigrateResult<MigrationResult> {
        let outcome = match self.plan(schema) {
            Ok(plan) => self.apply(&plan).await,
            Err(e) => Err(e),
        };
        let closed = self.driver.close().await;

        match (outcome, closed) {
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "failed to close connection after error");
                }
                Err(e)
            }
            (Ok(_), Err(e)) => Err(e),
            (Ok(result), Ok(())) => Ok(result),
        }
    }

    /// Apply a plan to the database.
    pub async fn apply(&self, plan: &MigrationPlan) -> MigrateResult<MigrationResult> {
        let start = Instant::now();
        self.driver.ping().await?;

        let generator = PostgresSqlGenerator;
        let database_schema = self.config.database_schema.as_str();
        let drop_tables: Vec<String> = self
            .driver
            .list_tables(database_schema)
            .await
            .map_err(|e| e.in_phase(Phase::DropTables))?
            .iter()
            .map(|t| generator.drop_table(database_schema, t))
            .collect();
        let drop_enums: Vec<String> = self
            .driver
            .list_enums()
            .await
            .map_err(|e| e.in_phase(Phase::DropEnums))?
            .iter()
            .map(|e| generator.drop_enum(&e.schema, &e.name))
            .collect();
        debug!(
            tables = drop_tables.len(),
            enums = drop_enums.len(),
            "discovered existing objects"
        );

        let batches: [(Phase, &[String]); 5] = [
            (Phase::DropTables, drop_tables.as_slice()),
            (Phase::DropEnums, drop_enums.as_slice()),
            (Phase::CreateEnums, plan.create_enums.as_slice()),
            (Phase::CreateTables, plan.create_tables.as_slice()),
            (Phase::CreateRelations, plan.create_relations.as_slice()),
        ];

        if self.config.dry_run {
            let phases = batches
                .iter()
                .map(|(phase, stmts)| {
                    for stmt in stmts.iter() {
                        debug!(%phase, sql = %stmt, "dry run");
                    }
                    PhaseReport {
                        phase: *phase,
                        statements: stmts.len(),
                        executed: false,
                        duration_ms: 0,
                    }
                })
                .collect();
            return Ok(MigrationResult {
                phases,
                duration_ms: start.elapsed().as_millis() as u64,
                dry_run: true,
            });
        }

        let phases = if self.config.atomic {
            self.apply_atomic(&batches).await
        } else {
            self.apply_each(&batches).await
        };

        match phases {
            Ok(phases) => {
                let result = MigrationResult {
                    phases,
                    duration_ms: start.elapsed().as_millis() as u64,
                    dry_run: false,
                };
                info!(summary = %result.summary(), "migration complete");
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback) = self.driver.execute("ROLLBACK;").await {
                    debug!(error = %rollback, "rollback after failure did not succeed");
                }
                Err(e)
            }
        }
    }

    /// One transaction around every phase.
    async fn apply_atomic(&self, batches: &[(Phase, &[String])]) -> MigrateResult<Vec<PhaseReport>> {
        self.driver
            .execute("BEGIN;")
            .await
            .map_err(|e| e.in_phase(Phase::DropTables))?;

        let mut reports = Vec::with_capacity(batches.len());
        for (phase, stmts) in batches {
            reports.push(self.run_phase(*phase, stmts, stmts.join("\n")).await?);
        }

        self.driver
            .execute("COMMIT;")
            .await
            .map_err(|e| e.in_phase(Phase::CreateRelations))?;
        Ok(reports)
    }

    /// One transaction per phase.
    async fn apply_each(&self, batches: &[(Phase, &[String])]) -> MigrateResult<Vec<PhaseReport>> {
        let mut reports = Vec::with_capacity(batches.len());
        for (phase, stmts) in batches {
            reports.push(self.run_phase(*phase, stmts, wrap_transaction(stmts)).await?);
        }
        Ok(reports)
    }

    async fn run_phase(
        &self,
        phase: Phase,
        stmts: &[String],
        sql: String,
    ) -> MigrateResult<PhaseReport> {
        let span = info_span!("phase", phase = %phase);
        async {
            let start = Instant::now();
            if stmts.is_empty() {
                info!("nothing to do, skipping");
                return Ok(PhaseReport {
                    phase,
                    statements: 0,
                    executed: false,
                    duration_ms: 0,
                });
            }

            debug!(%sql, "executing");
            self.driver
                .execute(&sql)
                .await
                .map_err(|e| e.in_phase(phase))?;

            let duration_ms = start.elapsed().as_millis() as u64;
            info!(statements = stmts.len(), duration_ms, "phase complete");
            Ok::<_, MigrationError>(PhaseReport {
                phase,
                statements: stmts.len(),
                executed: true,
                duration_ms,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::CatalogEnum;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use relforge_schema::{Enum, Model, Property};

    /// In-memory driver that records every statement batch.
    #[derive(Default)]
    struct RecordingDriver {
        tables: Vec<String>,
        enums: Vec<CatalogEnum>,
        fail_on: Option<&'static str>,
        listed_schema: Mutex<Option<String>>,
        executed: Mutex<Vec<String>>,
        closed: Mutex<bool>,
    }

    impl RecordingDriver {
        fn executed(&self) -> Vec<String> {
            self.executed.lock().clone()
        }
    }

    #[async_trait::async_trait]
    impl MigrationDriver for RecordingDriver {
        async fn ping(&self) -> MigrateResult<()> {
            Ok(())
        }

        async fn list_tables(&self, schema: &str) -> MigrateResult<Vec<String>> {
            *self.listed_schema.lock() = Some(schema.to_string());
            Ok(self.tables.clone())
        }

        async fn list_enums(&self) -> MigrateResult<Vec<CatalogEnum>> {
            Ok(self.enums.clone())
        }

        async fn execute(&self, sql: &str) -> MigrateResult<()> {
            self.executed.lock().push(sql.to_string());
            match self.fail_on {
                Some(needle) if sql.contains(needle) => {
                    Err(MigrationError::transaction(format!("rejected: {needle}")))
                }
                _ => Ok(()),
            }
        }

        async fn close(&self) -> MigrateResult<()> {
            *self.closed.lock() = true;
            Ok(())
        }
    }

    fn schema() -> Schema {
        Schema::default()
            .with_model(
                Model::new("User")
                    .with_property(Property::new("id", "int").with_id())
                    .with_property(Property::new("role", "Role"))
                    .with_property(Property::new("todos", "Todo[]")),
            )
            .with_model(
                Model::new("Todo")
                    .with_property(Property::new("id", "int").with_id())
                    .with_property(Property::new("ownerId", "int"))
                    .with_property(Property::new("owner", "User").with_relation("ownerId", "id")),
            )
            .with_enum(Enum::new("Role", ["ADMIN", "USER"]))
    }

    fn populated() -> RecordingDriver {
        RecordingDriver {
            tables: vec!["Legacy".to_string()],
            enums: vec![CatalogEnum::new(16384, "public", "OldRole")],
            ..Default::default()
        }
    }

    #[test]
    fn test_phase_order_and_names() {
        assert_eq!(Phase::ALL[0], Phase::DropTables);
        assert_eq!(Phase::ALL[4], Phase::CreateRelations);
        assert_eq!(Phase::CreateTables.to_string(), "create tables");
    }

    #[test]
    fn test_config_builder() {
        let config = MigrationConfig::new()
            .atomic(false)
            .database_schema("app")
            .dry_run(true);
        assert!(!config.atomic);
        assert_eq!(config.database_schema, "app");
        assert!(config.dry_run);
        assert!(MigrationConfig::default().atomic);
    }

    #[test]
    fn test_plan_from_schema() {
        let plan = MigrationPlan::from_schema(&schema()).unwrap();
        assert_eq!(plan.create_enums.len(), 1);
        assert_eq!(plan.create_tables.len(), 2);
        assert_eq!(plan.create_relations.len(), 1);
        assert_eq!(plan.len(), 4);

        let sql = plan.to_sql();
        assert!(sql.starts_with("BEGIN;\nCREATE TYPE \"Role\""));
        assert_eq!(sql.matches("COMMIT;").count(), 3);
    }

    #[test]
    fn test_plan_rejects_invalid_schema() {
        let mut s = schema();
        s.models[0].properties[0].id = false;
        let err = MigrationPlan::from_schema(&s).unwrap_err();
        assert!(matches!(err, MigrationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_atomic_run() {
        let engine = MigrationEngine::new(MigrationConfig::new(), populated());
        let result = engine.run(&schema()).await.unwrap();

        let executed = engine.driver().executed();
        assert_eq!(executed.first().map(String::as_str), Some("BEGIN;"));
        assert_eq!(executed.last().map(String::as_str), Some("COMMIT;"));
        assert_eq!(executed[1], "DROP TABLE \"public\".\"Legacy\" CASCADE;");
        assert_eq!(executed[2], "DROP TYPE \"public\".\"OldRole\";");
        assert!(executed[3].starts_with("CREATE TYPE \"Role\""));
        assert!(executed[4].contains("CREATE TABLE \"User\""));
        assert!(executed[4].contains("CREATE TABLE \"Todo\""));
        assert!(executed[5].starts_with("ALTER TABLE \"Todo\""));
        assert_eq!(executed.len(), 7);

        assert_eq!(result.phases.len(), 5);
        assert_eq!(result.executed_statements(), 6);
        assert!(*engine.driver().closed.lock());
    }

    #[tokio::test]
    async fn test_drops_are_qualified_with_database_schema() {
        let driver = RecordingDriver {
            tables: vec!["User".to_string()],
            enums: vec![CatalogEnum::new(16400, "app", "Role")],
            ..Default::default()
        };
        let engine = MigrationEngine::new(MigrationConfig::new().database_schema("app"), driver);
        engine.run(&schema()).await.unwrap();

        assert_eq!(
            engine.driver().listed_schema.lock().as_deref(),
            Some("app")
        );
        let executed = engine.driver().executed();
        assert_eq!(executed[1], "DROP TABLE \"app\".\"User\" CASCADE;");
        assert_eq!(executed[2], "DROP TYPE \"app\".\"Role\";");
        assert!(!executed.iter().any(|s| s.contains("\"public\"")));
    }

    #[tokio::test]
    async fn test_per_phase_transactions() {
        let engine = MigrationEngine::new(MigrationConfig::new().atomic(false), populated());
        engine.run(&schema()).await.unwrap();

        let executed = engine.driver().executed();
        assert_eq!(executed.len(), 5);
        for batch in &executed {
            assert!(batch.starts_with("BEGIN;\n"));
            assert!(batch.ends_with("\nCOMMIT;"));
        }
    }

    #[tokio::test]
    async fn test_empty_database_skips_drop_phases() {
        let engine = MigrationEngine::new(
            MigrationConfig::new().atomic(false),
            RecordingDriver::default(),
        );
        let result = engine.run(&schema()).await.unwrap();

        assert_eq!(engine.driver().executed().len(), 3);
        let drop_tables = result.phase(Phase::DropTables).unwrap();
        assert!(!drop_tables.executed);
        assert_eq!(drop_tables.statements, 0);
        assert!(result.phase(Phase::CreateTables).unwrap().executed);
    }

    #[tokio::test]
    async fn test_failure_stops_run_and_rolls_back() {
        let driver = RecordingDriver {
            fail_on: Some("CREATE TABLE"),
            ..populated()
        };
        let engine = MigrationEngine::new(MigrationConfig::new(), driver);
        let err = engine.run(&schema()).await.unwrap_err();

        assert_eq!(err.phase(), Some(Phase::CreateTables));
        let executed = engine.driver().executed();
        assert_eq!(executed.last().map(String::as_str), Some("ROLLBACK;"));
        assert!(!executed.iter().any(|s| s.contains("ALTER TABLE")));
        assert!(!executed.iter().any(|s| s == "COMMIT;"));
        assert!(*engine.driver().closed.lock());
    }

    #[tokio::test]
    async fn test_invalid_schema_never_touches_database() {
        let mut s = schema();
        s.enums[0].values.truncate(1);
        let engine = MigrationEngine::new(MigrationConfig::new(), populated());
        let err = engine.run(&s).await.unwrap_err();

        assert!(matches!(err, MigrationError::Validation(_)));
        assert!(engine.driver().executed().is_empty());
        assert!(*engine.driver().closed.lock());
    }

    #[tokio::test]
    async fn test_dry_run_executes_nothing() {
        let engine = MigrationEngine::new(MigrationConfig::new().dry_run(true), populated());
        let result = engine.run(&schema()).await.unwrap();

        assert!(result.dry_run);
        assert!(engine.driver().executed().is_empty());
        assert_eq!(result.phase(Phase::DropEnums).unwrap().statements, 1);
        assert_eq!(result.executed_statements(), 0);
    }
}
