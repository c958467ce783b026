//! Hyperparameter group for the LARS optimizer.

use crate::error::{OptimError, OptimResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MOMENTUM: f32 = 0.0;
pub const DEFAULT_WEIGHT_DECAY: f32 = 0.0;
pub const DEFAULT_ETA: f32 = 1e-3;
pub const DEFAULT_EPS: f32 = 1e-9;
pub const DEFAULT_THRESHOLD: f32 = 1e-2;

/// Hyperparameters shared by every parameter of one group.
///
/// Only the learning rate is required; everything else falls back to the
/// defaults above. Call [`LarsConfig::validate`] (the optimizer constructors
/// do it for you) before using a hand-built value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LarsConfig {
    /// Global learning rate
    pub lr: f32,
    /// Momentum coefficient (0 disables the momentum buffer)
    pub momentum: f32,
    /// L2 coefficient added to the gradient
    pub weight_decay: f32,
    /// Trust-ratio scale
    pub eta: f32,
    /// Keeps the trust-ratio denominator away from zero
    pub eps: f32,
    /// Weight norm below which the trust ratio is bypassed
    pub threshold: f32,
    /// Nesterov toggle. Stored and restored with the state, not used by the update.
    #[serde(default)]
    pub nesterov: bool,
}

impl LarsConfig {
    /// Creates a config with the given learning rate and default values elsewhere.
    pub fn new(lr: f32) -> Self {
        Self {
            lr,
            momentum: DEFAULT_MOMENTUM,
            weight_decay: DEFAULT_WEIGHT_DECAY,
            eta: DEFAULT_ETA,
            eps: DEFAULT_EPS,
            threshold: DEFAULT_THRESHOLD,
            nesterov: false,
        }
    }

    pub fn with_momentum(mut self, momentum: f32) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub fn with_eta(mut self, eta: f32) -> Self {
        self.eta = eta;
        self
    }

    pub fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_nesterov(mut self, nesterov: bool) -> Self {
        self.nesterov = nesterov;
        self
    }

    /// Rejects negative learning rate, momentum or weight decay.
    ///
    /// NaN is rejected as well.
    pub fn validate(&self) -> OptimResult<()> {
        if self.lr < 0.0 || self.lr.is_nan() {
            return Err(OptimError::InvalidLearningRate(self.lr));
        }
        if self.momentum < 0.0 || self.momentum.is_nan() {
            return Err(OptimError::InvalidMomentum(self.momentum));
        }
        if self.weight_decay < 0.0 || self.weight_decay.is_nan() {
            return Err(OptimError::InvalidWeightDecay(self.weight_decay));
        }
        Ok(())
    }
}
