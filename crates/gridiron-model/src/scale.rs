// Min-max feature scaling.

/// Per-feature affine map onto `[0, 1]` over the data it was fitted on.
/// Values outside the fitted range map outside `[0, 1]`; nothing is clipped.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    scale: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit on `rows`, each of width `width`. A constant feature gets a
    /// scale of 1 so it maps to 0.
    pub fn fit(rows: &[Vec<f64>], width: usize) -> Self {
        let mut min = vec![f64::INFINITY; width];
        let mut max = vec![f64::NEG_INFINITY; width];
        for row in rows {
            for (j, &v) in row.iter().enumerate().take(width) {
                min[j] = min[j].min(v);
                max[j] = max[j].max(v);
            }
        }
        let mut scale = Vec::with_capacity(width);
        for j in 0..width {
            if rows.is_empty() {
                min[j] = 0.0;
                scale.push(1.0);
                continue;
            }
            let range = max[j] - min[j];
            scale.push(if range > 0.0 { 1.0 / range } else { 1.0 });
        }
        MinMaxScaler { min, scale }
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.min.iter().zip(&self.scale))
            .map(|(v, (min, scale))| (v - min) * scale)
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_values_land_in_unit_interval() {
        let train = vec![vec![1.0, 10.0], vec![3.0, 30.0], vec![2.0, 20.0]];
        let scaler = MinMaxScaler::fit(&train, 2);
        for row in scaler.transform(&train) {
            for v in row {
                assert!((0.0..=1.0).contains(&v), "{v} outside [0, 1]");
            }
        }
        assert_eq!(scaler.transform_row(&[2.0, 30.0]), vec![0.5, 1.0]);
    }

    #[test]
    fn test_values_are_not_clipped() {
        let scaler = MinMaxScaler::fit(&[vec![0.0], vec![10.0]], 1);
        assert_eq!(scaler.transform_row(&[20.0]), vec![2.0]);
        assert_eq!(scaler.transform_row(&[-5.0]), vec![-0.5]);
    }

    #[test]
    fn constant_feature_maps_to_zero() {
        let scaler = MinMaxScaler::fit(&[vec![4.0], vec![4.0]], 1);
        assert_eq!(scaler.transform_row(&[4.0]), vec![0.0]);
        assert_eq!(scaler.transform_row(&[5.0]), vec![1.0]);
    }
}
