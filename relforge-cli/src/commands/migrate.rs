//! `relforge migrate` command - Drop and recreate the database from the schema.

use relforge_migrate::{
    MigrationConfig, MigrationDriver, MigrationEngine, MigrationError, MigrationPlan,
    MigrationResult,
};
use relforge_postgres::PgConnection;
use relforge_schema::{Provider, Schema};

use crate::cli::MigrateArgs;
use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, success, warn};

/// Prompt shown before anything destructive happens.
pub const CONFIRM_PROMPT: &str =
    "This action will delete all existing enums and tables. Are you sure you want to proceed?";

/// Run the migrate command
pub async fn run(ctx: &Context, args: MigrateArgs) -> CliResult<()> {
    output::header("Migrate");

    output::kv("Schema", &ctx.schema_path.display().to_string());
    output::newline();

    if !args.yes && !args.dry_run && !output::confirm(CONFIRM_PROMPT) {
        output::newline();
        warn("Migration cancelled");
        return Ok(());
    }

    output::step(1, 4, "Parsing schema...");
    let schema = ctx.load_schema()?;

    output::step(2, 4, "Validating schema and generating SQL...");
    let plan = MigrationPlan::from_schema(&schema)?;
    tracing::debug!(statements = plan.len(), "planned migration");

    output::step(3, 4, "Connecting to database...");
    ctx.load_env()?;
    let url = schema.connection.resolve_url()?;
    let config = engine_config(ctx, &args);

    output::step(4, 4, "Applying migration...");
    let result = match schema.connection.provider {
        Provider::PostgreSql => {
            let driver = connect_postgres(&url).await?;
            migrate(config, driver, &schema).await?
        }
        Provider::MySql => {
            return Err(MigrationError::unsupported_provider(Provider::MySql.as_str()).into());
        }
    };

    output::newline();
    print_report(&result);
    output::newline();

    if result.dry_run {
        success(&format!("Dry run complete: {}", result.summary()));
    } else {
        success(&format!("Migration complete: {}", result.summary()));
    }

    Ok(())
}

/// Engine settings: flags win over `relforge.toml`.
pub fn engine_config(ctx: &Context, args: &MigrateArgs) -> MigrationConfig {
    let database_schema = args
        .database_schema
        .clone()
        .unwrap_or_else(|| ctx.config.migrate.database_schema.clone());

    MigrationConfig::new()
        .atomic(ctx.config.migrate.atomic && !args.non_atomic)
        .database_schema(database_schema)
        .dry_run(args.dry_run)
}

async fn migrate<D: MigrationDriver>(
    config: MigrationConfig,
    driver: D,
    schema: &Schema,
) -> CliResult<MigrationResult> {
    let engine = MigrationEngine::new(config, driver);
    Ok(engine.run(schema).await?)
}

async fn connect_postgres(url: &str) -> CliResult<PgConnection> {
    Ok(PgConnection::connect_url(url).await?)
}

fn print_report(result: &MigrationResult) {
    output::section("Phases");
    for report in &result.phases {
        let status = if report.statements == 0 {
            "skipped".to_string()
        } else if report.executed {
            format!("{} statements ({}ms)", report.statements, report.duration_ms)
        } else {
            format!("{} statements planned", report.statements)
        };
        output::kv(report.phase.as_str(), &status);
    }
}
