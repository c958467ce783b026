//! Optimizers that update model weights in place.
//!
//! Optimizers operate on plain numeric data (`ArrayD<f32>`) on the CPU. They
//! receive the current weights and the computed gradients, keyed by parameter
//! name, and apply their update rule.

pub mod config;
pub mod lars;

use crate::error::OptimResult;
use ndarray::ArrayD;
use std::collections::HashMap;

pub use config::LarsConfig;
pub use lars::{l2_norm, lars_update, Lars, ParamGroup, ParamState, UpdateOutcome, UpdateRegime};

/// Common interface of all optimizers.
pub trait Optimizer {
    /// Performs one optimization step, updating the weights.
    ///
    /// # Arguments
    ///
    /// * `parameters` - Mutable `HashMap` with the current model weights.
    ///   The key is the parameter name (e.g. "layer1.weight").
    /// * `gradients` - Gradients computed for those weights. Parameters with
    ///   no entry here are left untouched. Optimizers with weight decay add
    ///   it to these gradients in place.
    fn step(
        &mut self,
        parameters: &mut HashMap<String, ArrayD<f32>>,
        gradients: &mut HashMap<String, ArrayD<f32>>,
    ) -> OptimResult<()>;

    /// Current learning rate.
    fn learning_rate(&self) -> f32;

    /// Sets a new learning rate (for learning rate schedules).
    fn set_learning_rate(&mut self, lr: f32);
}
