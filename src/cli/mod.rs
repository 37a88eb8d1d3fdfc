//! CLI support for docql
//!
//! Provides programmatic access to the `docql` commands, so that the model
//! and query file formats can be driven without the binary.

mod execute;
pub mod files;
mod prepare;

pub use execute::{CommandOptions, execute_run, execute_sql, parameters_value};
pub use prepare::{PreparedQuery, prepare};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid model: {0}")]
    Model(#[from] crate::ModelError),

    #[error("Query generation error: {0}")]
    Generate(#[from] crate::GenerateError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown entity type: '{0}'")]
    UnknownEntity(String),

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,
}
