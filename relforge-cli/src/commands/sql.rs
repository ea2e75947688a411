//! `relforge sql` command - Print the generated DDL.

use relforge_migrate::MigrationPlan;

use crate::cli::SqlArgs;
use crate::commands::Context;
use crate::error::CliResult;
use crate::output::success;

/// Run the sql command
///
/// Only the create batches are printed; the drop batches depend on what the
/// database holds at migration time.
pub async fn run(ctx: &Context, args: SqlArgs) -> CliResult<()> {
    let schema = ctx.load_schema()?;
    let plan = MigrationPlan::from_schema(&schema)?;
    let sql = plan.to_sql();

    match args.output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", sql))?;
            success(&format!(
                "Wrote {} statements to {}",
                plan.len(),
                path.display()
            ));
        }
        None => println!("{}", sql),
    }

    Ok(())
}
