//! Relforge CLI - Command-line interface for relforge migrations.
//!
//! This crate provides the `relforge` binary: schema validation, name
//! cleanup, SQL preview and destructive drop-then-create migrations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
