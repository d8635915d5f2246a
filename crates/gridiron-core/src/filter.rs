// Column reconciliation: denylist removal, occupancy pruning, week ordering.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::table::{Table, TableError};

/// Identity and target columns. Never reordered, never treated as stats.
pub const META_COLUMNS: [&str; 3] = ["fullName", "position", "points"];

/// Which axis an occupancy pass prunes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOrder {
    ColumnsThenRows,
    RowsThenColumns,
}

/// Minimum share of non-missing cells a row or column must have to survive.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct OccupancyFilter {
    pub threshold: f64,
    pub order: FilterOrder,
}

impl OccupancyFilter {
    pub fn new(threshold: f64, order: FilterOrder) -> Self {
        OccupancyFilter { threshold, order }
    }

    /// Prune in the configured order until neither axis changes. At the
    /// fixpoint every column holds at least `ceil(rows * threshold)` values
    /// and every row at least `ceil(columns * threshold)`.
    pub fn apply(&self, table: &mut Table) {
        let start = table.shape();
        loop {
            let before = table.shape();
            match self.order {
                FilterOrder::ColumnsThenRows => {
                    drop_sparse_columns(table, self.threshold);
                    drop_sparse_rows(table, self.threshold);
                }
                FilterOrder::RowsThenColumns => {
                    drop_sparse_rows(table, self.threshold);
                    drop_sparse_columns(table, self.threshold);
                }
            }
            if table.shape() == before {
                break;
            }
        }
        debug!(
            threshold = self.threshold,
            order = ?self.order,
            before = ?start,
            after = ?table.shape(),
            "occupancy filter applied"
        );
    }
}

/// Smallest non-missing count that satisfies `threshold` over `n` cells.
pub fn required_count(n: usize, threshold: f64) -> usize {
    // Tolerance keeps products like 0.7 * 10 from rounding up to 8.
    let raw = n as f64 * threshold - 1e-9;
    if raw <= 0.0 { 0 } else { raw.ceil() as usize }
}

/// Drop columns below the occupancy bound. Returns how many were dropped.
pub fn drop_sparse_columns(table: &mut Table, threshold: f64) -> usize {
    let required = required_count(table.row_count(), threshold);
    let counts: Vec<usize> = (0..table.column_count())
        .map(|c| table.non_missing_in_column(c))
        .collect();
    let before = table.column_count();
    table.retain_columns(|idx, _| counts[idx] >= required);
    before - table.column_count()
}

/// Drop rows below the occupancy bound, measured against the current
/// column count. Returns how many were dropped.
pub fn drop_sparse_rows(table: &mut Table, threshold: f64) -> usize {
    let required = required_count(table.column_count(), threshold);
    let before = table.row_count();
    table.retain_rows(|_, cells| cells.iter().filter(|c| c.is_some()).count() >= required);
    before - table.row_count()
}

/// Drop every stat column with no values at all. Meta columns stay even
/// when empty, so a table without rows keeps its identity header.
pub fn drop_empty_columns(table: &mut Table) -> usize {
    let counts: Vec<usize> = (0..table.column_count())
        .map(|c| table.non_missing_in_column(c))
        .collect();
    let before = table.column_count();
    table.retain_columns(|idx, name| counts[idx] > 0 || is_meta_column(name));
    before - table.column_count()
}

/// Drop any column whose name contains a denylisted substring
/// (case-sensitive). Returns the dropped names.
pub fn drop_denylisted_columns(table: &mut Table, denylist: &[String]) -> Vec<String> {
    let mut dropped = Vec::new();
    table.retain_columns(|_, name| {
        let banned = denylist
            .iter()
            .any(|pattern| !pattern.is_empty() && name.contains(pattern.as_str()));
        if banned {
            dropped.push(name.to_string());
        }
        !banned
    });
    dropped
}

/// Read a headerless csv with one denylist substring per row.
pub fn load_denylist(path: &Path) -> Result<Vec<String>, TableError> {
    let file = std::fs::File::open(path).map_err(|e| TableError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_denylist(file).map_err(|e| TableError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn read_denylist<R: std::io::Read>(reader: R) -> Result<Vec<String>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut out = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(field) = record.get(0).map(str::trim).filter(|f| !f.is_empty()) {
            out.push(field.to_string());
        }
    }
    Ok(out)
}

/// Integer before the first `_`, e.g. `14` for `14_pointsScored`.
pub fn week_prefix(column: &str) -> Option<u32> {
    let (prefix, _) = column.split_once('_')?;
    prefix.parse().ok()
}

pub fn is_meta_column(column: &str) -> bool {
    META_COLUMNS.contains(&column)
}

/// Meta columns first (in their current order), then every other column by
/// ascending week prefix. Equal weeks keep encounter order; columns without
/// a numeric prefix go last.
pub fn order_columns_by_week(table: &mut Table) {
    let mut meta = Vec::new();
    let mut stats = Vec::new();
    for (idx, name) in table.columns().iter().enumerate() {
        if is_meta_column(name) {
            meta.push(idx);
        } else {
            stats.push((week_prefix(name), idx));
        }
    }
    stats.sort_by_key(|(week, _)| week.map_or(u64::MAX, u64::from));
    meta.extend(stats.into_iter().map(|(_, idx)| idx));
    table.select_columns(&meta);
}

/// Denylist removal, occupancy pruning and week ordering, in that order.
pub fn reconcile(table: &mut Table, denylist: &[String], filter: &OccupancyFilter) {
    let dropped = drop_denylisted_columns(table, denylist);
    if !dropped.is_empty() {
        debug!(count = dropped.len(), "denylisted columns dropped");
    }
    filter.apply(table);
    order_columns_by_week(table);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
