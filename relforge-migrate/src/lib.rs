//! # relforge-migrate
//!
//! Relation inference, DDL generation and migration orchestration.
//!
//! This crate provides functionality for:
//! - Inferring relation cardinality from mirrored model properties
//! - Generating PostgreSQL enum, table and foreign key DDL
//! - Running a drop-then-create migration against a database driver
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────────┐
//! │ Schema       │────▶│ Validator      │────▶│ Relation        │
//! └──────────────┘     └────────────────┘     │ Inference       │
//!                                             └─────────────────┘
//!                                                      │
//!                                                      ▼
//!                      ┌────────────────┐     ┌─────────────────┐
//!                      │ Migration      │◀────│ SQL Gen         │
//!                      │ Engine         │     │ tables │ fks    │
//!                      └────────────────┘     └─────────────────┘
//!                              │
//!                              ▼
//!                      ┌────────────────┐
//!                      │ Driver         │
//!                      └────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use relforge_migrate::{MigrationConfig, MigrationEngine};
//!
//! async fn run(driver: impl relforge_migrate::MigrationDriver) -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = relforge_schema::load_schema_file("relforge.yml")?;
//!
//!     let engine = MigrationEngine::new(MigrationConfig::new(), driver);
//!     let result = engine.run(&schema).await?;
//!     println!("{}", result.summary());
//!
//!     Ok(())
//! }
//! ```

pub mod driver;
pub mod engine;
pub mod error;
pub mod relation;
pub mod sql;

pub use driver::{CatalogEnum, MigrationDriver};
pub use engine::{
    MigrationConfig, MigrationEngine, MigrationPlan, MigrationResult, Phase, PhaseReport,
};
pub use error::{MigrateResult, MigrationError};
pub use relation::infer_relation;
pub use sql::{PostgresSqlGenerator, TableDdl, wrap_transaction};
