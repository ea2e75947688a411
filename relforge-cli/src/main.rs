//! Relforge CLI - Command-line interface for relforge migrations.

use std::error::Error as _;

use clap::Parser;
use miette::Diagnostic;

use relforge_cli::cli::{Cli, Command};
use relforge_cli::commands::{self, Context};
use relforge_cli::error::{CliError, CliResult};
use relforge_cli::{logging, output};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    if let Command::Version = cli.command {
        return commands::version::run().await;
    }

    let ctx = Context::from_global(&cli.global)?;

    match cli.command {
        Command::Migrate(args) => commands::migrate::run(&ctx, args).await,
        Command::Validate => commands::validate::run(&ctx).await,
        Command::Clean => commands::clean::run(&ctx).await,
        Command::Sql(args) => commands::sql::run(&ctx, args).await,
        Command::Version => commands::version::run().await,
    }
}

fn report(err: &CliError) {
    output::newline();
    output::error(&err.to_string());

    let mut source = err.source();
    while let Some(cause) = source {
        output::error_detail("caused by", &cause.to_string());
        source = cause.source();
    }
    if let Some(help) = err.help() {
        output::error_detail("help", &help.to_string());
    }
}
