// Figure model: what a chart shows, independent of how it is drawn.
//
// Dispatch builds `Figure`s from league aggregates; `render` turns them into
// ratatui widgets. Keeping the two apart lets tests check chart contents
// without a terminal.

/// One categorical scatter point, e.g. a team's average rank.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    /// Category index on the x axis.
    pub x: usize,
    pub y: f64,
    /// Text drawn next to the point.
    pub label: Option<String>,
    pub highlight: bool,
}

/// Five-number summary plus outliers, matplotlib style: quartiles by
/// linear interpolation, whiskers at the most extreme values within
/// 1.5 IQR of the box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub label: String,
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// `None` for an empty sample.
    pub fn from_values(label: impl Into<String>, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile(&sorted, 0.25);
        let median = percentile(&sorted, 0.5);
        let q3 = percentile(&sorted, 0.75);
        let reach = 1.5 * (q3 - q1);
        let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| (lo_fence..=hi_fence).contains(v))
            .collect();
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !(lo_fence..=hi_fence).contains(v))
            .collect();

        Some(BoxStats {
            label: label.into(),
            whisker_low: inside.first().copied().unwrap_or(q1),
            q1,
            median,
            q3,
            whisker_high: inside.last().copied().unwrap_or(q3),
            outliers,
        })
    }

    pub fn min(&self) -> f64 {
        self.outliers
            .iter()
            .copied()
            .fold(self.whisker_low, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.outliers
            .iter()
            .copied()
            .fold(self.whisker_high, f64::max)
    }
}

/// Linear-interpolated percentile of an ascending, non-empty slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// A named line. Points are `(x, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    /// Values plotted against 1-based positions.
    pub fn indexed(name: impl Into<String>, values: &[f64]) -> Self {
        Series {
            name: name.into(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| ((i + 1) as f64, *v))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Scatter {
        title: String,
        x_label: String,
        y_label: String,
        categories: Vec<String>,
        points: Vec<ScatterPoint>,
    },
    BoxPlot {
        title: String,
        x_label: String,
        y_label: String,
        boxes: Vec<BoxStats>,
    },
    Lines {
        title: String,
        x_label: String,
        y_label: String,
        series: Vec<Series>,
        legend: bool,
    },
    /// Several figures tiled in one view.
    Grid { title: String, figures: Vec<Figure> },
    Text { title: String, body: String },
}

impl Figure {
    pub fn title(&self) -> &str {
        match self {
            Figure::Scatter { title, .. }
            | Figure::BoxPlot { title, .. }
            | Figure::Lines { title, .. }
            | Figure::Grid { title, .. }
            | Figure::Text { title, .. } => title,
        }
    }

    /// Two-series training curve, epochs counted from 1.
    pub fn loss_curve(train_losses: &[f64], val_losses: &[f64]) -> Figure {
        Figure::Lines {
            title: "Model Loss".to_string(),
            x_label: "Epoch".to_string(),
            y_label: "Loss (MSE)".to_string(),
            series: vec![
                Series::indexed("train", train_losses),
                Series::indexed("validation", val_losses),
            ],
            legend: true,
        }
    }
}

/// Axis bounds covering `values` with a margin. Degenerate inputs get a
/// unit-wide range so the chart still has extent.
pub fn padded_bounds(values: impl IntoIterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return [0.0, 1.0];
    }
    let pad = if hi > lo { (hi - lo) * 0.1 } else { 0.5 };
    [lo - pad, hi + pad]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_stats_interpolates_quartiles() {
        let b = BoxStats::from_values("AAA", &[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(b.label, "AAA");
        assert!((b.q1 - 1.75).abs() < 1e-12);
        assert!((b.median - 2.5).abs() < 1e-12);
        assert!((b.q3 - 3.25).abs() < 1e-12);
        assert_eq!(b.whisker_low, 1.0);
        assert_eq!(b.whisker_high, 4.0);
        assert!(b.outliers.is_empty());
    }

    #[test]
    fn box_stats_separates_outliers() {
        let b = BoxStats::from_values("AAA", &[10.0, 11.0, 12.0, 13.0, 60.0]).unwrap();
        assert_eq!(b.outliers, vec![60.0]);
        assert_eq!(b.whisker_high, 13.0);
        assert_eq!(b.max(), 60.0);
        assert_eq!(b.min(), 10.0);
    }

    #[test]
    fn box_stats_single_and_empty() {
        let b = BoxStats::from_values("X", &[7.0]).unwrap();
        assert_eq!((b.whisker_low, b.median, b.whisker_high), (7.0, 7.0, 7.0));
        assert_eq!(BoxStats::from_values("X", &[]), None);
    }

    #[test]
    fn indexed_series_starts_at_one() {
        let s = Series::indexed("AAA", &[10.0, 20.0]);
        assert_eq!(s.points, vec![(1.0, 10.0), (2.0, 20.0)]);
    }

    #[test]
    fn loss_curve_has_two_series() {
        let fig = Figure::loss_curve(&[3.0, 2.0], &[4.0, 2.5]);
        assert_eq!(fig.title(), "Model Loss");
        let Figure::Lines { series, legend, .. } = fig else {
            panic!("expected a line figure");
        };
        assert!(legend);
        assert_eq!(series[0].name, "train");
        assert_eq!(series[1].points[1], (2.0, 2.5));
    }

    #[test]
    fn bounds_are_padded() {
        assert_eq!(padded_bounds([0.0, 10.0]), [-1.0, 11.0]);
        assert_eq!(padded_bounds([5.0]), [4.5, 5.5]);
        assert_eq!(padded_bounds(std::iter::empty()), [0.0, 1.0]);
        assert_eq!(padded_bounds([f64::NAN, 2.0]), [1.5, 2.5]);
    }
}
