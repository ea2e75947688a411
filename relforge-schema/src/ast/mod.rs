//! Abstract Syntax Tree (AST) types for relforge schemas.
//!
//! This module contains all the types that represent a loaded schema.

mod relation;
mod schema;
mod types;

pub use relation::*;
pub use schema::*;
pub use types::*;
