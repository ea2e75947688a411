//! # relforge-schema
//!
//! Schema model, type system and validation for relforge.
//!
//! This crate provides:
//! - AST types for models, properties, enums and relations
//! - The type-token to column-type mapping and default value rules
//! - Name sanitization for models, enums, properties and values
//! - Fail-fast schema validation
//! - Loading and writing YAML schema files
//!
//! ## Example
//!
//! ```rust,ignore
//! use relforge_schema::{load_schema_file, validate};
//!
//! let schema = load_schema_file("relforge.yml")?;
//! let index = validate(&schema)?;
//! println!("{} models, {} enums", index.model_names.len(), index.enum_names.len());
//! ```

pub mod ast;
pub mod error;
pub mod loader;
pub mod sanitize;
pub mod validator;

pub use ast::*;
pub use error::{SchemaError, SchemaResult, ValidationPosition};
pub use loader::{load_schema_file, parse_schema, to_yaml, write_schema_file};
pub use sanitize::{is_safe, is_safe_type, sanitize, sanitize_schema, sanitize_type};
pub use validator::{SchemaIndex, Validator, validate};
