use std::path::PathBuf;

use brine_protogen_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtogenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {file} at line {line}, column {column}: {msg}")]
    ParseError {
        file:   String,
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Module error: {0}")]
    Module(String),

    #[error("Invalid name filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema error in {declaration}: {source}")]
    Schema {
        declaration: String,
        #[source]
        source:      SchemaError,
    },

    #[error("Cannot write {}: {source}", .path.display())]
    Output {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProtogenError {
    /// Attaches the name of the declaration being translated to a schema error.
    pub fn schema(declaration: impl Into<String>, source: SchemaError) -> Self {
        ProtogenError::Schema {
            declaration: declaration.into(),
            source,
        }
    }
}
