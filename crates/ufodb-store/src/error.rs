use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::format::FormatError;
use crate::record::RecordId;

/// Errors raised by table and record mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("table '{0}' already exists")]
    DuplicateTable(String),
    #[error("table '{0}' does not exist")]
    UnknownTable(String),
    #[error("record with id {id} not found in table '{table}'")]
    RecordNotFound { table: String, id: RecordId },
    #[error("invalid table name {name:?}: {reason}")]
    InvalidTableName { name: String, reason: &'static str },
    #[error("invalid column {column:?} in table '{table}': {reason}")]
    InvalidColumn {
        table: String,
        column: String,
        reason: &'static str,
    },
    #[error("column '{column}' does not exist in table '{table}'")]
    UnknownColumn { table: String, column: String },
    #[error("table '{0}' has no identifiers left to mint")]
    IdSpaceExhausted(String),
    #[error("rows {first}..={last} are out of range for table '{table}' with {len} rows")]
    RowOutOfRange {
        table: String,
        first: usize,
        last: usize,
        len: usize,
    },
}

/// Errors raised while saving or loading a database file.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("database file {} not found", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("malformed database file {}: {source}", path.display())]
    Malformed { path: PathBuf, source: FormatError },
}
