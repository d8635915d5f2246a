// Training run over a synthetic player_stats.csv.

use std::path::Path;

use gridiron_core::config::{DatasetConfig, TrainingConfig};
use gridiron_core::filter::{FilterOrder, OccupancyFilter};
use gridiron_core::table::{Table, Value};
use gridiron_model::{run_training, ModelError};

fn write_player_stats(dir: &Path, rows: usize) {
    let positions = ["RB", "WR", "TE", "QB", "K"];
    let mut table = Table::new(["fullName", "position", "points"]);
    for i in 0..rows {
        let base = (i % 9) as f64;
        table.push_record([
            ("fullName", Value::Text(format!("Player {i}"))),
            ("position", Value::from(positions[i % positions.len()])),
            ("points", Value::from(base * 1.5)),
            ("12_receptions", Value::from(base)),
            ("12_teamWin", Value::from(1.0)),
            ("13_receptions", Value::from(base + 1.0)),
            ("13_pointsScored", Value::from(base * 2.0)),
            ("14_receptions", Value::from(base + 2.0)),
            ("14_pointsScored", Value::from(base * 2.0 + 3.0)),
        ]);
    }
    table.save_csv(&dir.join("player_stats.csv")).unwrap();
}

fn configs(dir: &Path) -> (DatasetConfig, TrainingConfig) {
    let denylist = dir.join("columns_to_drop.csv");
    std::fs::write(&denylist, "teamWin\nYardGame\n").unwrap();
    let dataset = DatasetConfig {
        output_dir: dir.display().to_string(),
        columns_to_drop: denylist.display().to_string(),
        global_filter: OccupancyFilter::new(0.5, FilterOrder::ColumnsThenRows),
        position_filter: OccupancyFilter::new(0.1, FilterOrder::RowsThenColumns),
    };
    let training = TrainingConfig {
        target_week: 14,
        target_stat: "pointsScored".into(),
        excluded_positions: vec!["QB".into(), "K".into()],
        test_fraction: 0.25,
        validation_fraction: 0.2,
        epochs: 8,
        batch_size: 8,
        patience: 3,
        learning_rate: 0.005,
        dropout: 0.1,
        hidden_units: [16, 8],
        seed: Some(11),
    };
    (dataset, training)
}

#[test]
fn training_writes_trimmed_table_and_history() {
    let dir = tempfile::tempdir().unwrap();
    write_player_stats(dir.path(), 60);
    let (dataset, training) = configs(dir.path());

    let report = run_training(&dataset, &training).unwrap();

    // 60 rows, 24 of them QB or K.
    assert_eq!(report.train_rows + report.test_rows, 36);
    assert_eq!(report.test_rows, 9);
    assert_eq!(report.target, "14_pointsScored");
    assert_eq!(
        report.feature_names,
        ["position", "points", "12_receptions", "13_receptions", "13_pointsScored"]
    );
    assert!(report.train_mse.is_finite());
    assert!(report.test_mse.is_some());

    let trimmed = Table::load_csv(&report.trimmed_path, true).unwrap();
    assert_eq!(trimmed.row_count(), 36);
    assert!(trimmed.column_index("12_teamWin").is_none());
    for row in 0..trimmed.row_count() {
        let pos = trimmed.get(row, "position").and_then(Value::as_text);
        assert!(!matches!(pos, Some("QB") | Some("K")));
    }

    let history = std::fs::read_to_string(&report.history_path).unwrap();
    let lines: Vec<&str> = history.lines().collect();
    assert_eq!(lines[0], "epoch,train_loss,val_loss");
    assert_eq!(lines.len(), report.history.epochs_run() + 1);
}

#[test]
fn seed_fixes_the_test_partition() {
    let dir = tempfile::tempdir().unwrap();
    write_player_stats(dir.path(), 60);
    let (dataset, mut training) = configs(dir.path());
    training.epochs = 1;

    let a = run_training(&dataset, &training).unwrap();
    let b = run_training(&dataset, &training).unwrap();
    assert_eq!(a.test_labels.len(), 9);
    assert_eq!(a.test_labels, b.test_labels);

    training.seed = Some(12);
    let c = run_training(&dataset, &training).unwrap();
    assert_eq!(c.test_labels.len(), 9);
    assert_ne!(a.test_labels, c.test_labels);
}

#[test]
fn missing_target_week_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_player_stats(dir.path(), 20);
    let (dataset, mut training) = configs(dir.path());
    training.target_week = 15;

    let err = run_training(&dataset, &training).unwrap_err();
    assert!(matches!(err, ModelError::MissingTarget(c) if c == "15_pointsScored"));
}
