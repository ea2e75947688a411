//! `relforge validate` command - Validate the schema file.

use relforge_schema::validate;

use crate::commands::{Context, relation_count};
use crate::error::CliResult;
use crate::output::{self, success};

/// Run the validate command
pub async fn run(ctx: &Context) -> CliResult<()> {
    output::header("Validate Schema");

    output::kv("Schema", &ctx.schema_path.display().to_string());
    output::newline();

    output::step(1, 2, "Parsing schema...");
    let schema = ctx.load_schema()?;

    output::step(2, 2, "Running validation checks...");
    let index = validate(&schema)?;

    output::newline();
    success("Schema is valid!");
    output::newline();

    output::section("Schema Summary");
    output::kv("Provider", schema.connection.provider.as_str());
    output::kv("Models", &index.model_names.len().to_string());
    output::kv("Enums", &index.enum_names.len().to_string());

    let total_properties: usize = schema.models.iter().map(|m| m.properties.len()).sum();
    output::kv("Total Properties", &total_properties.to_string());
    output::kv("Relations", &relation_count(&schema).to_string());

    Ok(())
}
