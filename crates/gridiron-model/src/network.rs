// Feed-forward points regressor.

use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};

/// Layer sizes and dropout for [`PointsRegressor`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegressorConfig {
    pub input_dim: usize,
    pub hidden_dims: [usize; 2],
    pub dropout: f64,
}

impl RegressorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> PointsRegressor<B> {
        let [h1, h2] = self.hidden_dims;
        PointsRegressor {
            hidden1: LinearConfig::new(self.input_dim, h1).init(device),
            dropout1: DropoutConfig::new(self.dropout).init(),
            hidden2: LinearConfig::new(h1, h2).init(device),
            dropout2: DropoutConfig::new(self.dropout).init(),
            output: LinearConfig::new(h2, 1).init(device),
        }
    }
}

/// Two ReLU hidden layers, each followed by dropout, and one linear output.
#[derive(Module, Debug)]
pub struct PointsRegressor<B: Backend> {
    hidden1: Linear<B>,
    dropout1: Dropout,
    hidden2: Linear<B>,
    dropout2: Dropout,
    output: Linear<B>,
}

impl<B: Backend> PointsRegressor<B> {
    /// `[batch, features] -> [batch, 1]`
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.dropout1.forward(relu(self.hidden1.forward(x)));
        let x = self.dropout2.forward(relu(self.hidden2.forward(x)));
        self.output.forward(x)
    }

    pub fn predict(&self, rows: &[Vec<f64>], device: &B::Device) -> Vec<f64> {
        if rows.is_empty() {
            return Vec::new();
        }
        let output = self.forward(matrix(rows, device));
        output
            .into_data()
            .iter::<f32>()
            .map(f64::from)
            .collect()
    }
}

/// Row-major `[rows, width]` float tensor.
pub fn matrix<B: Backend>(rows: &[Vec<f64>], device: &B::Device) -> Tensor<B, 2> {
    let width = rows.first().map_or(0, Vec::len);
    let flat: Vec<f32> = rows.iter().flatten().map(|&v| v as f32).collect();
    Tensor::from_data(TensorData::new(flat, [rows.len(), width]), device)
}

/// `[len, 1]` column tensor.
pub fn column<B: Backend>(values: &[f64], device: &B::Device) -> Tensor<B, 2> {
    let flat: Vec<f32> = values.iter().map(|&v| v as f32).collect();
    Tensor::from_data(TensorData::new(flat, [values.len(), 1]), device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn forward_shape_is_one_output_per_row() {
        let device = Default::default();
        let config = RegressorConfig {
            input_dim: 3,
            hidden_dims: [8, 4],
            dropout: 0.1,
        };
        let model: PointsRegressor<TestBackend> = config.init(&device);
        let x = matrix::<TestBackend>(&[vec![0.1, 0.2, 0.3], vec![1.0, 0.0, 0.5]], &device);
        assert_eq!(model.forward(x).dims(), [2, 1]);
    }

    #[test]
    fn predict_returns_one_value_per_row() {
        let device = Default::default();
        let config = RegressorConfig {
            input_dim: 2,
            hidden_dims: [4, 4],
            dropout: 0.0,
        };
        let model: PointsRegressor<TestBackend> = config.init(&device);
        let preds = model.predict(&[vec![0.0, 1.0], vec![1.0, 0.0], vec![0.5, 0.5]], &device);
        assert_eq!(preds.len(), 3);
        assert!(preds.iter().all(|p| p.is_finite()));
        assert!(model.predict(&[], &device).is_empty());
    }
}
