// Regressor training with a trailing validation split and early stopping.

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::Backend;
use burn::tensor::ElementConversion;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use gridiron_core::config::TrainingConfig;

use crate::error::ModelError;
use crate::network::{column, matrix, PointsRegressor, RegressorConfig};
use crate::split::holdout_tail;

pub type InferenceBackend = NdArray<f32>;
pub type TrainBackend = Autodiff<InferenceBackend>;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub patience: usize,
    pub learning_rate: f64,
    pub dropout: f64,
    pub hidden_dims: [usize; 2],
    pub validation_fraction: f64,
}

impl From<&TrainingConfig> for TrainerConfig {
    fn from(config: &TrainingConfig) -> Self {
        TrainerConfig {
            epochs: config.epochs,
            batch_size: config.batch_size,
            patience: config.patience,
            learning_rate: config.learning_rate,
            dropout: config.dropout,
            hidden_dims: config.hidden_units,
            validation_fraction: config.validation_fraction,
        }
    }
}

/// Per-epoch losses. `val_losses` falls back to the training loss when no
/// validation rows exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    pub train_losses: Vec<f64>,
    pub val_losses: Vec<f64>,
    pub best_epoch: usize,
    pub stopped_early: bool,
}

impl TrainingHistory {
    pub fn epochs_run(&self) -> usize {
        self.train_losses.len()
    }
}

pub struct FitResult {
    /// Weights from the epoch with the lowest validation loss.
    pub model: PointsRegressor<InferenceBackend>,
    pub history: TrainingHistory,
}

/// Mean squared error of `model` over `rows` of `x`/`y`.
pub fn evaluate<B: Backend>(
    model: &PointsRegressor<B>,
    x: &[Vec<f64>],
    y: &[f64],
    device: &B::Device,
) -> Option<f64> {
    if x.is_empty() {
        return None;
    }
    let prediction = model.forward(matrix(x, device));
    let loss = MseLoss::new().forward(prediction, column(y, device), Reduction::Mean);
    Some(loss.into_scalar().elem::<f64>())
}

fn gather(x: &[Vec<f64>], y: &[f64], rows: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
    (
        rows.iter().map(|&r| x[r].clone()).collect(),
        rows.iter().map(|&r| y[r]).collect(),
    )
}

/// Train on already-scaled `x`/`y`. The trailing `validation_fraction` of
/// rows monitors early stopping; the rest is reshuffled every epoch.
pub fn fit(
    x: &[Vec<f64>],
    y: &[f64],
    config: &TrainerConfig,
    rng: &mut StdRng,
) -> Result<FitResult, ModelError> {
    if x.is_empty() {
        return Err(ModelError::EmptyDataset);
    }
    let device = NdArrayDevice::default();
    let width = x[0].len();

    let rows: Vec<usize> = (0..x.len()).collect();
    let (fit_rows, val_rows) = holdout_tail(&rows, config.validation_fraction);
    let (val_x, val_y) = gather(x, y, &val_rows);
    info!(
        fit = fit_rows.len(),
        validation = val_rows.len(),
        features = width,
        "training started"
    );

    let mut model: PointsRegressor<TrainBackend> = RegressorConfig {
        input_dim: width,
        hidden_dims: config.hidden_dims,
        dropout: config.dropout,
    }
    .init(&device);
    let mut optim = AdamConfig::new().init();
    let loss_fn = MseLoss::new();
    let batch_size = config.batch_size.max(1);

    let mut history = TrainingHistory::default();
    let mut best: Option<(f64, PointsRegressor<TrainBackend>)> = None;
    let mut since_best = 0;

    for epoch in 0..config.epochs {
        let mut order = fit_rows.clone();
        order.shuffle(rng);

        let mut total = 0.0;
        for batch in order.chunks(batch_size) {
            let (bx, by) = gather(x, y, batch);
            let prediction = model.forward(matrix(&bx, &device));
            let loss = loss_fn.forward(prediction, column(&by, &device), Reduction::Mean);
            total += loss.clone().into_scalar().elem::<f64>() * batch.len() as f64;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(config.learning_rate, model, grads);
        }
        let train_loss = total / fit_rows.len() as f64;
        let val_loss = evaluate(&model.valid(), &val_x, &val_y, &device).unwrap_or(train_loss);
        history.train_losses.push(train_loss);
        history.val_losses.push(val_loss);
        debug!(epoch, train_loss, val_loss, "epoch complete");

        let improved = best.as_ref().map_or(true, |(b, _)| val_loss < *b);
        if improved {
            best = Some((val_loss, model.clone()));
            history.best_epoch = epoch;
            since_best = 0;
        } else {
            since_best += 1;
            if since_best >= config.patience {
                history.stopped_early = true;
                info!(epoch, best_epoch = history.best_epoch, "early stopping");
                break;
            }
        }
    }

    let model = best.map_or(model, |(_, m)| m);
    Ok(FitResult {
        model: model.valid(),
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::make_rng;

    fn linear_data(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                let a = i as f64 / n as f64;
                let b = ((i * 7) % n) as f64 / n as f64;
                vec![a, b]
            })
            .collect();
        let y = x.iter().map(|r| 3.0 * r[0] + 2.0 * r[1] + 1.0).collect();
        (x, y)
    }

    fn config(epochs: usize, patience: usize) -> TrainerConfig {
        TrainerConfig {
            epochs,
            batch_size: 16,
            patience,
            learning_rate: 0.01,
            dropout: 0.0,
            hidden_dims: [16, 8],
            validation_fraction: 0.2,
        }
    }

    #[test]
    fn loss_decreases_on_linear_target() {
        let (x, y) = linear_data(80);
        let result = fit(&x, &y, &config(40, 40), &mut make_rng(Some(3))).unwrap();
        let h = &result.history;
        assert_eq!(h.train_losses.len(), h.val_losses.len());
        assert!(h.train_losses.last().unwrap() < h.train_losses.first().unwrap());

        let device = NdArrayDevice::default();
        let mse = evaluate(&result.model, &x, &y, &device).unwrap();
        assert!(mse < h.train_losses[0]);
    }

    #[test]
    fn history_never_exceeds_epoch_budget() {
        let (x, y) = linear_data(40);
        let result = fit(&x, &y, &config(5, 1), &mut make_rng(Some(9))).unwrap();
        let h = &result.history;
        assert!(h.epochs_run() <= 5);
        assert!(h.best_epoch < h.epochs_run());
        if h.stopped_early {
            assert_eq!(h.epochs_run(), h.best_epoch + 2);
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = fit(&[], &[], &config(1, 1), &mut make_rng(Some(1)));
        assert!(matches!(err, Err(ModelError::EmptyDataset)));
    }

    #[test]
    fn evaluate_empty_is_none() {
        let device = NdArrayDevice::default();
        let model: PointsRegressor<InferenceBackend> = RegressorConfig {
            input_dim: 2,
            hidden_dims: [4, 4],
            dropout: 0.0,
        }
        .init(&device);
        assert_eq!(evaluate(&model, &[], &[], &device), None);
    }
}
