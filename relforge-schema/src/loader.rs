//! Reading and writing YAML schema files.

use std::path::Path;

use tracing::debug;

use crate::ast::Schema;
use crate::error::{SchemaError, SchemaResult};

/// Parse a schema from YAML text.
pub fn parse_schema(input: &str) -> SchemaResult<Schema> {
    serde_yaml::from_str(input).map_err(|source| SchemaError::Yaml { source })
}

/// Load a schema from a YAML file.
pub fn load_schema_file(path: impl AsRef<Path>) -> SchemaResult<Schema> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let schema = parse_schema(&content)?;
    debug!(
        path = %path.display(),
        models = schema.models.len(),
        enums = schema.enums.len(),
        "loaded schema"
    );
    Ok(schema)
}

/// Serialize a schema back to YAML.
pub fn to_yaml(schema: &Schema) -> SchemaResult<String> {
    serde_yaml::to_string(schema).map_err(|source| SchemaError::Yaml { source })
}

/// Write a schema to a YAML file, replacing its contents.
pub fn write_schema_file(path: impl AsRef<Path>, schema: &Schema) -> SchemaResult<()> {
    let path = path.as_ref();
    let content = to_yaml(schema)?;
    std::fs::write(path, content).map_err(|source| SchemaError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), "wrote schema");
    Ok(())
}
