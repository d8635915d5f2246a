// Offline training run: player_stats.csv -> trimmed table -> fitted model.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use gridiron_core::config::{DatasetConfig, TrainingConfig};
use gridiron_core::filter::load_denylist;
use gridiron_core::table::Table;

use crate::dataset::{extract_features, prepare_training_table};
use crate::error::ModelError;
use crate::scale::MinMaxScaler;
use crate::split::{make_rng, train_test_split};
use crate::trainer::{evaluate, fit, InferenceBackend, TrainerConfig, TrainingHistory};

pub const PLAYER_STATS_FILE: &str = "player_stats.csv";
pub const TRIMMED_FILE: &str = "player_stats_trimmed.csv";
pub const LOSS_HISTORY_FILE: &str = "loss_history.csv";

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub target: String,
    pub feature_names: Vec<String>,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Row labels of the test partition in `player_stats_trimmed.csv`.
    pub test_labels: Vec<usize>,
    pub train_mse: f64,
    /// Absent when the test partition is empty.
    pub test_mse: Option<f64>,
    pub history: TrainingHistory,
    pub trimmed_path: PathBuf,
    pub history_path: PathBuf,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Target:     {}", self.target)?;
        writeln!(f, "Features:   {}", self.feature_names.len())?;
        writeln!(f, "Rows:       {} train / {} test", self.train_rows, self.test_rows)?;
        writeln!(
            f,
            "Epochs:     {} (best {}{})",
            self.history.epochs_run(),
            self.history.best_epoch + 1,
            if self.history.stopped_early { ", stopped early" } else { "" }
        )?;
        writeln!(f, "Train Loss: {:.4}", self.train_mse)?;
        match self.test_mse {
            Some(mse) => write!(f, "Test Loss:  {mse:.4}"),
            None => write!(f, "Test Loss:  n/a"),
        }
    }
}

#[derive(Serialize)]
struct LossRow {
    epoch: usize,
    train_loss: f64,
    val_loss: f64,
}

/// Write `epoch,train_loss,val_loss`, epochs counted from 1.
pub fn write_loss_history(history: &TrainingHistory, path: &Path) -> Result<(), ModelError> {
    let write_err = |source| ModelError::Write {
        path: path.display().to_string(),
        source,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(write_err)?;
    for (i, (train, val)) in history
        .train_losses
        .iter()
        .zip(&history.val_losses)
        .enumerate()
    {
        wtr.serialize(LossRow {
            epoch: i + 1,
            train_loss: *train,
            val_loss: *val,
        })
        .map_err(write_err)?;
    }
    wtr.flush()
        .map_err(|e| write_err(csv::Error::from(e)))?;
    Ok(())
}

/// Run the whole training step from the files the dataset build wrote.
pub fn run_training(
    dataset: &DatasetConfig,
    training: &TrainingConfig,
) -> Result<TrainingReport, ModelError> {
    let table = Table::load_csv(&dataset.output_path(PLAYER_STATS_FILE), true)?;
    info!(shape = ?table.shape(), "player stats loaded");
    let denylist = load_denylist(Path::new(&dataset.columns_to_drop))?;

    let trimmed = prepare_training_table(
        table,
        &training.excluded_positions,
        &denylist,
        &dataset.global_filter,
    )?;
    let trimmed_path = dataset.output_path(TRIMMED_FILE);
    trimmed.save_csv(&trimmed_path)?;

    let target = training.target_column();
    let features = extract_features(&trimmed, &target, training.target_week)?;
    info!(rows = features.len(), features = features.width(), target = %target, "features extracted");

    let mut rng = make_rng(training.seed);
    let (train_rows, test_rows) = train_test_split(features.len(), training.test_fraction, &mut rng);
    let (train_x, train_y) = features.select(&train_rows);
    let (test_x, test_y) = features.select(&test_rows);
    let test_labels: Vec<usize> = test_rows
        .iter()
        .filter_map(|&row| trimmed.index().get(row).copied())
        .collect();

    let scaler = MinMaxScaler::fit(&train_x, features.width());
    let train_x = scaler.transform(&train_x);
    let test_x = scaler.transform(&test_x);

    let result = fit(&train_x, &train_y, &TrainerConfig::from(training), &mut rng)?;
    let device = Default::default();
    let train_mse = evaluate::<InferenceBackend>(&result.model, &train_x, &train_y, &device)
        .ok_or(ModelError::EmptyDataset)?;
    let test_mse = evaluate::<InferenceBackend>(&result.model, &test_x, &test_y, &device);

    let history_path = dataset.output_path(LOSS_HISTORY_FILE);
    write_loss_history(&result.history, &history_path)?;

    let report = TrainingReport {
        target,
        feature_names: features.feature_names,
        train_rows: train_rows.len(),
        test_rows: test_rows.len(),
        test_labels,
        train_mse,
        test_mse,
        history: result.history,
        trimmed_path,
        history_path,
    };
    info!(train_mse = report.train_mse, test_mse = ?report.test_mse, "training complete");
    Ok(report)
}
