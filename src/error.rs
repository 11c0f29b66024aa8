//! Typed errors for the data stages (loading, transform, batching, scaling).
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: expected {expected} columns, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: column `{column}` has invalid value `{value}`")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },

    #[error("line {line}: column `{column}` has unknown category `{value}`")]
    UnknownCategory {
        line: u64,
        column: String,
        value: String,
    },

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("header does not match schema: expected `{expected}`, found `{found}`")]
    SchemaMismatch { expected: String, found: String },

    #[error("line {line}: label {value} is not a binary class (0 or 1)")]
    InvalidLabel { line: u64, value: f64 },

    #[error("no rows to fit on")]
    EmptyDataset,

    #[error("expected {expected} features, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
