//! CLI command implementations.

pub mod clean;
pub mod migrate;
pub mod sql;
pub mod validate;
pub mod version;

use std::path::PathBuf;

use relforge_schema::{Schema, load_schema_file};

use crate::cli::GlobalArgs;
use crate::config::Config;
use crate::error::{CliError, CliResult};

/// Settings shared by the schema-driven commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded (or default) configuration.
    pub config: Config,
    /// Resolved schema file path.
    pub schema_path: PathBuf,
    /// Dotenv file to load before resolving the connection URL.
    pub env_file: Option<PathBuf>,
}

impl Context {
    /// Resolve settings from the global flags and the config file.
    pub fn from_global(global: &GlobalArgs) -> CliResult<Self> {
        let cwd = std::env::current_dir()?;
        let config = Config::discover(global.config.as_deref(), &cwd)?;
        let schema_path = config.schema_path(global.schema.as_deref(), &cwd);
        let env_file = config.env_file(global.env_file.as_deref());

        Ok(Self {
            config,
            schema_path,
            env_file,
        })
    }

    /// Load the schema file, failing with a configuration error when it is missing.
    pub fn load_schema(&self) -> CliResult<Schema> {
        if !self.schema_path.exists() {
            return Err(CliError::config(format!(
                "Schema file not found: {}",
                self.schema_path.display()
            )));
        }
        Ok(load_schema_file(&self.schema_path)?)
    }

    /// Load the configured dotenv file, or a `.env` found from the working directory.
    pub fn load_env(&self) -> CliResult<()> {
        match &self.env_file {
            Some(path) => {
                dotenvy::from_path(path)?;
                tracing::debug!(path = %path.display(), "loaded env file");
            }
            None => {
                if let Ok(path) = dotenvy::dotenv() {
                    tracing::debug!(path = %path.display(), "loaded env file");
                }
            }
        }
        Ok(())
    }
}

/// Count properties that declare a relation.
pub(crate) fn relation_count(schema: &Schema) -> usize {
    schema.relation_properties().count()
}
