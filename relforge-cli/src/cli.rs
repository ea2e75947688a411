//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Relforge - schema-driven PostgreSQL migrations
#[derive(Parser, Debug)]
#[command(name = "relforge")]
#[command(version)]
#[command(about = "Relforge - schema-driven PostgreSQL migrations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Options shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Path to schema file (default: relforge.yml)
    #[arg(short, long, global = true, env = "RELFORGE_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Path to config file (default: relforge.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Dotenv file loaded before resolving `env("...")` connection URLs
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drop every table and enum, then recreate them from the schema
    Migrate(MigrateArgs),

    /// Validate the schema file
    Validate,

    /// Strip special characters from names in the schema file
    Clean,

    /// Print the DDL generated from the schema
    Sql(SqlArgs),

    /// Display version information
    Version,
}

// =============================================================================
// Migrate Command
// =============================================================================

/// Arguments for the `migrate` command
#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Run each phase in its own transaction
    #[arg(long)]
    pub non_atomic: bool,

    /// Database schema searched for existing tables
    #[arg(long)]
    pub database_schema: Option<String>,

    /// Discover and plan without changing the database
    #[arg(long)]
    pub dry_run: bool,
}

// =============================================================================
// Sql Command
// =============================================================================

/// Arguments for the `sql` command
#[derive(Args, Debug, Default)]
pub struct SqlArgs {
    /// Write the SQL to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate_flags() {
        let cli = Cli::parse_from([
            "relforge",
            "migrate",
            "--yes",
            "--non-atomic",
            "--database-schema",
            "app",
            "--schema",
            "db/schema.yml",
        ]);
        assert_eq!(cli.global.schema, Some(PathBuf::from("db/schema.yml")));
        match cli.command {
            Command::Migrate(args) => {
                assert!(args.yes);
                assert!(args.non_atomic);
                assert!(!args.dry_run);
                assert_eq!(args.database_schema.as_deref(), Some("app"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_before_command() {
        let cli = Cli::parse_from(["relforge", "-v", "--env-file", ".env.test", "validate"]);
        assert!(cli.global.verbose);
        assert_eq!(cli.global.env_file, Some(PathBuf::from(".env.test")));
        assert!(matches!(cli.command, Command::Validate));
    }
}
