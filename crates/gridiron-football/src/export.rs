// Position-segmented exporter: one trimmed csv per position group.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use gridiron_core::filter::OccupancyFilter;
use gridiron_core::table::{Table, TableError};

/// Export groups, in output order. Any other position is left out.
pub const POSITION_GROUPS: [&str; 5] = ["QB", "RB", "WR", "TE", "K"];

/// One file written by the exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionExport {
    pub group: String,
    pub path: PathBuf,
    pub shape: (usize, usize),
}

/// `rb_stats.csv` for group `RB`.
pub fn group_file_name(group: &str) -> String {
    format!("{}_stats.csv", group.to_lowercase())
}

/// Rows whose `position` is exactly `group`, trimmed with `filter`. Row
/// labels from `table` are kept, so groups partition the source rows.
pub fn position_group(
    table: &Table,
    group: &str,
    filter: &OccupancyFilter,
) -> Result<Table, TableError> {
    let mut segment = table.filter_by_text("position", |p| p == Some(group))?;
    filter.apply(&mut segment);
    Ok(segment)
}

/// Split `table` into `POSITION_GROUPS` and write each to
/// `{group}_stats.csv` under `output_dir`.
pub fn export_positions(
    table: &Table,
    filter: &OccupancyFilter,
    output_dir: &Path,
) -> Result<Vec<PositionExport>, TableError> {
    let mut written = Vec::with_capacity(POSITION_GROUPS.len());
    for group in POSITION_GROUPS {
        let segment = position_group(table, group, filter)?;
        if segment.is_empty() {
            warn!(group = %group, "position group is empty; writing header only");
        }
        let path = output_dir.join(group_file_name(group));
        segment.save_csv(&path)?;
        info!(group = %group, shape = ?segment.shape(), path = %path.display(), "position group written");
        written.push(PositionExport {
            group: group.to_string(),
            path,
            shape: segment.shape(),
        });
    }
    Ok(written)
}
