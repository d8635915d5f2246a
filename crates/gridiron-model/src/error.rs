// Error type for dataset preparation and training.

use thiserror::Error;

use gridiron_core::table::TableError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("target column `{0}` not found")]
    MissingTarget(String),

    #[error("no rows left to train on")]
    EmptyDataset,

    #[error("non-numeric value in column `{column}` at row {row}")]
    NonNumeric { column: String, row: usize },

    #[error("position `{0}` was not seen when the encoder was fitted")]
    UnknownPosition(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("failed to write {path}: {source}")]
    Write { path: String, source: csv::Error },
}
