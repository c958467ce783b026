//! Error type shared by the optimizer and its state serialization.

use thiserror::Error;

pub type OptimResult<T> = std::result::Result<T, OptimError>;

#[derive(Error, Debug)]
pub enum OptimError {
    #[error("Invalid learning rate: {0}")]
    InvalidLearningRate(f32),

    #[error("Invalid momentum value: {0}")]
    InvalidMomentum(f32),

    #[error("Invalid weight_decay value: {0}")]
    InvalidWeightDecay(f32),

    #[error("Invalid parameter group: {0}")]
    InvalidGroup(String),

    #[error("Shape mismatch for '{name}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Incompatible optimizer state: {0}")]
    StateMismatch(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
