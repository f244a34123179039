//! Tabular input: loading, joining, sampling and cleaning.

mod clean;
mod join;
mod loader;
mod sample;
mod table;

pub use clean::{clean, CleanSummary};
pub use join::{inner_join, JoinSummary};
pub use loader::load_table;
pub use sample::sample_rows;
pub use table::{ColumnSummary, Table};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or reshaping tables.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column '{column}' not found in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("column '{0}' appears in both tables")]
    DuplicateColumn(String),

    #[error("column '{column}' has a missing value at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("column '{column}' has {got} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },
}
