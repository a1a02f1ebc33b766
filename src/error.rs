//! Fatal error taxonomy.
//!
//! Only unrecoverable conditions live here; dangling references and
//! unrecognized schema constructs degrade to the `unknown` validator
//! inside the compiler instead of surfacing as errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse document: not valid JSON ({json}) nor YAML ({yaml})")]
    Parse { json: String, yaml: String },

    #[error("invalid document: {0}")]
    Ingestion(String),

    #[error("schema `{0}` has an `allOf` with no members")]
    EmptyAllOf(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
