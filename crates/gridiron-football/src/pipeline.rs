// Dataset build: athletes -> player stats -> wide table -> csv snapshots.
//
// Steps run strictly in order and each owns its table until it is written.
// Only the per-player stat fetch runs concurrently, bounded by the provider
// concurrency setting; results keep athlete order.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use gridiron_core::config::DatasetConfig;
use gridiron_core::filter::{drop_empty_columns, order_columns_by_week};
use gridiron_core::table::{DuplicateColumns, TableError};

use crate::export::export_positions;
use crate::normalize::{normalize_player, rows_to_table};
use crate::provider::models::athletes_to_table;
use crate::provider::{PlayerStats, PlayerStatsSource, ProviderError};

pub const PLAYERS_FILE: &str = "players.csv";
pub const PLAYER_STATS_FILE: &str = "player_stats.csv";

/// Log a progress line every this many completed lookups.
const PROGRESS_INTERVAL: usize = 500;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Counts and outputs of one build, logged and printed at the end.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub athletes: usize,
    pub active: usize,
    pub stats_found: usize,
    pub misses: usize,
    pub failures: usize,
    pub duplicates: DuplicateColumns,
    pub shape: (usize, usize),
    pub files: Vec<PathBuf>,
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = self.finished_at - self.started_at;
        writeln!(f, "Athletes fetched:   {}", self.athletes)?;
        writeln!(f, "Active athletes:    {}", self.active)?;
        writeln!(f, "Players with stats: {}", self.stats_found)?;
        writeln!(f, "Lookup misses:      {}", self.misses)?;
        writeln!(f, "Fetch failures:     {}", self.failures)?;
        if self.duplicates.is_empty() {
            writeln!(f, "No duplicate columns found")?;
        } else {
            writeln!(
                f,
                "Duplicate columns:  {} ({})",
                self.duplicates.count(),
                self.duplicates.names.join(", ")
            )?;
        }
        writeln!(f, "Shape of dataset:   {:?}", self.shape)?;
        writeln!(f, "Elapsed:            {}s", elapsed.num_seconds())?;
        write!(f, "Files written:")?;
        for path in &self.files {
            write!(f, "\n  {}", path.display())?;
        }
        Ok(())
    }
}

/// Outcome tally of the concurrent stat lookups.
#[derive(Debug, Default)]
struct FetchTally {
    found: Vec<PlayerStats>,
    misses: usize,
    failures: usize,
}

async fn fetch_all_stats<S>(source: &S, names: &[String], concurrency: usize) -> FetchTally
where
    S: PlayerStatsSource + ?Sized,
{
    let total = names.len();
    let mut results = stream::iter(names)
        .map(|name| async move { (name, source.fetch_player_stats(name).await) })
        .buffered(concurrency.max(1));

    let mut tally = FetchTally::default();
    let mut done = 0usize;
    while let Some((name, result)) = results.next().await {
        match result {
            Ok(Some(stats)) => tally.found.push(stats),
            Ok(None) => {
                debug!(player = %name, "no league stats");
                tally.misses += 1;
            }
            Err(e) => {
                warn!(player = %name, error = %e, "player stats fetch failed; skipping");
                tally.failures += 1;
            }
        }
        done += 1;
        if done % PROGRESS_INTERVAL == 0 {
            info!(done, total, "player stats progress");
        }
    }
    tally
}

/// Run the full dataset build against `source`, writing every csv under
/// `config.output_dir`.
pub async fn build_dataset<S>(
    source: &S,
    config: &DatasetConfig,
    concurrency: usize,
) -> Result<BuildSummary, BuildError>
where
    S: PlayerStatsSource + ?Sized,
{
    let started_at = Utc::now();
    let mut files = Vec::new();

    // 1. Athletes, active only.
    let athletes = source.fetch_all_athletes().await?;
    let active_flags: Vec<bool> = athletes.iter().map(|a| a.is_active()).collect();
    let mut players = athletes_to_table(&athletes);
    info!(shape = ?players.shape(), "athlete table built");
    players.retain_rows(|pos, _| active_flags[pos]);
    info!(shape = ?players.shape(), "inactive athletes removed");
    let players_path = config.output_path(PLAYERS_FILE);
    players.save_csv(&players_path)?;
    files.push(players_path);

    let names: Vec<String> = athletes
        .iter()
        .filter(|a| a.is_active())
        .filter_map(|a| a.full_name().map(str::to_string))
        .collect();

    // 2. Per-player stats. Shared lookup state loads first; a failure there
    // is a provider outage, not a per-player miss.
    source.prepare().await?;
    info!(players = names.len(), concurrency, "gathering player stats");
    let tally = fetch_all_stats(source, &names, concurrency).await;

    // 3. Wide rows.
    let rows: Vec<_> = tally.found.iter().map(normalize_player).collect();
    let mut table = rows_to_table(&rows);
    info!(shape = ?table.shape(), "player stats table built");

    // 4. Duplicate check.
    let duplicates = table.duplicate_columns();
    if duplicates.is_empty() {
        info!("no duplicate columns found");
    } else {
        for name in &duplicates.names {
            warn!(column = %name, "duplicate column");
        }
        warn!(count = duplicates.count(), "duplicate columns detected");
    }

    // 5-6. Week ordering, empty columns.
    order_columns_by_week(&mut table);
    let dropped = drop_empty_columns(&mut table);
    info!(dropped, shape = ?table.shape(), "empty columns removed");

    // 7. Full snapshot.
    let stats_path = config.output_path(PLAYER_STATS_FILE);
    table.save_csv(&stats_path)?;
    files.push(stats_path);

    // 8. Per-position snapshots.
    let exports = export_positions(
        &table,
        &config.position_filter,
        &PathBuf::from(&config.output_dir),
    )?;
    files.extend(exports.into_iter().map(|e| e.path));

    let summary = BuildSummary {
        started_at,
        finished_at: Utc::now(),
        athletes: athletes.len(),
        active: players.row_count(),
        stats_found: tally.found.len(),
        misses: tally.misses,
        failures: tally.failures,
        duplicates,
        shape: table.shape(),
        files,
    };
    info!(
        athletes = summary.athletes,
        active = summary.active,
        found = summary.stats_found,
        misses = summary.misses,
        failures = summary.failures,
        shape = ?summary.shape,
        "dataset build complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_display_lists_counts_and_files() {
        let now = Utc::now();
        let summary = BuildSummary {
            started_at: now,
            finished_at: now,
            athletes: 10,
            active: 6,
            stats_found: 4,
            misses: 1,
            failures: 1,
            duplicates: DuplicateColumns {
                names: vec!["1_rushAtt".into()],
            },
            shape: (4, 12),
            files: vec![PathBuf::from("data/players.csv")],
        };
        let text = summary.to_string();
        assert!(text.contains("Active athletes:    6"));
        assert!(text.contains("Duplicate columns:  1 (1_rushAtt)"));
        assert!(text.contains("(4, 12)"));
        assert!(text.contains("data/players.csv"));
    }
}
