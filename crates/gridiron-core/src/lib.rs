// Shared infrastructure: configuration, the sparse table, filters, logging.

pub mod config;
pub mod filter;
pub mod logging;
pub mod table;

pub use table::{DuplicateColumns, Table, TableError, Value};
