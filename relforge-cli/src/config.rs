//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CliResult;

/// Default config file name (lives in project root)
pub const CONFIG_FILE_NAME: &str = "relforge.toml";

/// Default schema file path (relative to project root)
pub const SCHEMA_FILE_NAME: &str = "relforge.yml";

/// Relforge CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema file path
    pub schema: Option<PathBuf>,

    /// Dotenv file loaded before resolving the connection URL
    pub env_file: Option<PathBuf>,

    /// Migration configuration
    pub migrate: MigrateConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load an explicit config file, or `relforge.toml` from `dir` when it exists.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> CliResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Schema path: the flag wins over the file, which wins over the default.
    pub fn schema_path(&self, flag: Option<&Path>, dir: &Path) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.schema.clone())
            .map(|p| if p.is_absolute() { p } else { dir.join(p) })
            .unwrap_or_else(|| dir.join(SCHEMA_FILE_NAME))
    }

    /// Dotenv file: the flag wins over the file.
    pub fn env_file(&self, flag: Option<&Path>) -> Option<PathBuf> {
        flag.map(Path::to_path_buf).or_else(|| self.env_file.clone())
    }
}

/// Migration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Run all phases in one transaction
    pub atomic: bool,

    /// Database schema searched for existing tables
    pub database_schema: String,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            atomic: true,
            database_schema: "public".to_string(),
        }
    }
}
