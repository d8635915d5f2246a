// Training table preparation and predictor/target extraction.

use tracing::info;

use gridiron_core::filter::{reconcile, OccupancyFilter};
use gridiron_core::table::{Table, Value};

use crate::encode::PositionEncoder;
use crate::error::ModelError;

/// Columns never used as predictors because they carry no numeric signal.
const IDENTITY_COLUMNS: [&str; 1] = ["fullName"];

/// Drop excluded positions, then trim with the denylist, occupancy filter
/// and week ordering.
pub fn prepare_training_table(
    mut table: Table,
    excluded_positions: &[String],
    denylist: &[String],
    filter: &OccupancyFilter,
) -> Result<Table, ModelError> {
    let position = table.require_column("position")?;
    table.retain_rows(|_, cells| {
        let label = cells[position].as_ref().and_then(Value::as_text);
        !label.is_some_and(|p| excluded_positions.iter().any(|e| e == p))
    });
    info!(shape = ?table.shape(), "excluded positions removed");
    reconcile(&mut table, denylist, filter);
    info!(shape = ?table.shape(), "training table trimmed");
    Ok(table)
}

/// Numeric predictor matrix plus target vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
    pub encoder: PositionEncoder,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn width(&self) -> usize {
        self.feature_names.len()
    }

    pub fn select(&self, rows: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
        let x = rows.iter().map(|&r| self.features[r].clone()).collect();
        let y = rows.iter().map(|&r| self.targets[r]).collect();
        (x, y)
    }
}

/// Whether `column` may be a predictor for `target` in week `target_week`.
pub fn is_predictor(column: &str, target: &str, target_week: u32) -> bool {
    column != target
        && !column.starts_with(&format!("{target_week}_"))
        && !IDENTITY_COLUMNS.contains(&column)
}

/// Encode `position`, fill missing cells with 0 and split predictors from
/// the target column.
pub fn extract_features(
    table: &Table,
    target: &str,
    target_week: u32,
) -> Result<FeatureSet, ModelError> {
    let target_idx = table
        .column_index(target)
        .ok_or_else(|| ModelError::MissingTarget(target.to_string()))?;
    if table.is_empty() {
        return Err(ModelError::EmptyDataset);
    }

    let position_idx = table.column_index("position");
    let encoder = PositionEncoder::fit(
        (0..table.row_count())
            .filter_map(|r| position_idx.and_then(|c| table.cell(r, c)))
            .filter_map(Value::as_text),
    );

    let predictors: Vec<(usize, &String)> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| is_predictor(name, target, target_week))
        .collect();

    let mut features = Vec::with_capacity(table.row_count());
    let mut targets = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let mut values = Vec::with_capacity(predictors.len());
        for &(col, name) in &predictors {
            let value = match table.cell(row, col) {
                None => 0.0,
                Some(Value::Number(n)) => *n,
                Some(Value::Text(label)) if Some(col) == position_idx => {
                    encoder.encode(label)? as f64
                }
                Some(Value::Text(_)) => {
                    return Err(ModelError::NonNumeric {
                        column: name.clone(),
                        row,
                    })
                }
            };
            values.push(value);
        }
        features.push(values);
        targets.push(match table.cell(row, target_idx) {
            None => 0.0,
            Some(Value::Number(n)) => *n,
            Some(Value::Text(_)) => {
                return Err(ModelError::NonNumeric {
                    column: target.to_string(),
                    row,
                })
            }
        });
    }

    Ok(FeatureSet {
        feature_names: predictors.into_iter().map(|(_, n)| n.clone()).collect(),
        features,
        targets,
        encoder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_core::filter::FilterOrder;

    fn table() -> Table {
        let mut t = Table::new(["fullName", "position", "points"]);
        let rows = [
            ("Ada", "RB", 10.0, Some(3.0), Some(12.0)),
            ("Bo", "WR", 8.0, None, Some(7.0)),
            ("Ed", "QB", 20.0, Some(1.0), Some(25.0)),
            ("Ky", "K", 9.0, Some(0.0), Some(9.0)),
            ("Ty", "TE", 6.0, Some(2.0), None),
        ];
        for (name, pos, points, carries, target) in rows {
            let mut record = vec![
                ("fullName", Value::from(name)),
                ("position", Value::from(pos)),
                ("points", Value::from(points)),
            ];
            if let Some(c) = carries {
                record.push(("13_rushingAttempts", Value::from(c)));
            }
            if let Some(t) = target {
                record.push(("14_pointsScored", Value::from(t)));
            }
            record.push(("14_rushingAttempts", Value::from(1.0)));
            t.push_record(record);
        }
        t
    }

    fn excluded() -> Vec<String> {
        vec!["QB".into(), "K".into()]
    }

    #[test]
    fn prepare_drops_excluded_positions_and_denylisted_columns() {
        let filter = OccupancyFilter::new(0.5, FilterOrder::ColumnsThenRows);
        let t = prepare_training_table(table(), &excluded(), &["rushing".into()], &filter).unwrap();
        assert_eq!(t.index(), [0, 1, 4]);
        assert!(t.column_index("13_rushingAttempts").is_none());
        assert!(t.column_index("14_pointsScored").is_some());
    }

    #[test]
    fn predictor_rules() {
        assert!(is_predictor("points", "14_pointsScored", 14));
        assert!(is_predictor("position", "14_pointsScored", 14));
        assert!(is_predictor("13_rushingAttempts", "14_pointsScored", 14));
        assert!(is_predictor("1_rushingAttempts", "14_pointsScored", 14));
        assert!(!is_predictor("14_rushingAttempts", "14_pointsScored", 14));
        assert!(!is_predictor("14_pointsScored", "14_pointsScored", 14));
        assert!(!is_predictor("fullName", "14_pointsScored", 14));
    }

    #[test]
    fn features_encode_position_and_fill_missing() {
        let filter = OccupancyFilter::new(0.0, FilterOrder::ColumnsThenRows);
        let t = prepare_training_table(table(), &excluded(), &[], &filter).unwrap();
        let set = extract_features(&t, "14_pointsScored", 14).unwrap();

        assert_eq!(set.feature_names, ["position", "points", "13_rushingAttempts"]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.encoder.labels(), ["RB", "TE", "WR"]);
        // Ada RB=0, Bo WR=2 with missing carries, Ty TE=1 with missing target.
        assert_eq!(set.features[0], vec![0.0, 10.0, 3.0]);
        assert_eq!(set.features[1], vec![2.0, 8.0, 0.0]);
        assert_eq!(set.features[2], vec![1.0, 6.0, 2.0]);
        assert_eq!(set.targets, vec![12.0, 7.0, 0.0]);
    }

    #[test]
    fn missing_target_column_is_reported() {
        let err = extract_features(&table(), "15_pointsScored", 15).unwrap_err();
        assert!(matches!(err, ModelError::MissingTarget(c) if c == "15_pointsScored"));
    }

    #[test]
    fn text_in_numeric_column_is_rejected() {
        let mut t = Table::new(["position", "1_a", "2_pointsScored"]);
        t.push_record([
            ("position", Value::from("RB")),
            ("1_a", Value::from("oops")),
            ("2_pointsScored", Value::from(1.0)),
        ]);
        let err = extract_features(&t, "2_pointsScored", 2).unwrap_err();
        assert!(matches!(err, ModelError::NonNumeric { row: 0, .. }));
    }
}
