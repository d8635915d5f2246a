// Points regression: feature preparation, scaling, and the burn network.

pub mod dataset;
pub mod encode;
pub mod error;
pub mod network;
pub mod pipeline;
pub mod scale;
pub mod split;
pub mod trainer;

pub use error::ModelError;
pub use pipeline::{run_training, TrainingReport};
pub use trainer::TrainingHistory;
