//! `relforge clean` command - Strip special characters from schema names.

use relforge_schema::{SchemaError, sanitize_schema, validate, write_schema_file};

use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, success};

/// Run the clean command
///
/// Only character-set failures are repaired. Any other validation error is
/// returned untouched, and a schema that already validates is left alone.
pub async fn run(ctx: &Context) -> CliResult<()> {
    output::header("Clean Schema");

    output::kv("Schema", &ctx.schema_path.display().to_string());
    output::newline();

    output::step(1, 3, "Parsing schema...");
    let schema = ctx.load_schema()?;

    output::step(2, 3, "Running validation checks...");
    match validate(&schema) {
        Ok(_) => {
            output::newline();
            success("Schema is valid, nothing to clean");
            return Ok(());
        }
        Err(e) if e.is_repairable() => {
            if let SchemaError::UnsafeName { name, .. } = &e {
                output::warn(&format!("Found special characters in `{}`", name));
            }
        }
        Err(e) => return Err(e.into()),
    }

    output::step(3, 3, "Sanitizing names...");
    let cleaned = sanitize_schema(&schema);
    output::newline();

    if cleaned == schema {
        output::info("No names needed changes");
        return Ok(());
    }

    write_schema_file(&ctx.schema_path, &cleaned)?;
    success(&format!("Cleaned {}", ctx.schema_path.display()));

    if let Err(e) = validate(&cleaned) {
        output::warn(&format!("Schema still has problems: {}", e));
    }

    Ok(())
}
