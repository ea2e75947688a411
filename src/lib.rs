//! # Relforge
//!
//! A schema-driven migration compiler for PostgreSQL.
//!
//! Relforge provides:
//! - A declarative YAML schema of models, properties and enums
//! - Fail-fast validation with position-tagged errors
//! - Relation inference (1:1, 1:n) from paired model properties
//! - Drop-then-create DDL, applied in five ordered phases
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relforge::prelude::*;
//!
//! let schema = parse_schema(include_str!("../relforge.yml"))?;
//! let plan = MigrationPlan::from_schema(&schema)?;
//! println!("{}", plan.to_sql());
//! ```
//!
//! Applying a plan needs a [`migrate::MigrationDriver`]; the
//! `relforge-postgres` crate provides one for PostgreSQL.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Schema model, validation and loading.
pub mod schema {
    pub use relforge_schema::*;
}

/// DDL generation and the migration engine.
pub mod migrate {
    pub use relforge_migrate::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        MigrationConfig, MigrationDriver, MigrationEngine, MigrationError, MigrationPlan,
        PostgresSqlGenerator,
    };
    pub use crate::schema::{Schema, SchemaError, load_schema_file, parse_schema, validate};
}

// Re-export key types at the crate root
pub use migrate::{MigrationError, MigrationPlan};
pub use schema::{Schema, SchemaError};
