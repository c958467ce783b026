//! Optimizer snapshots.
//!
//! A snapshot holds the hyperparameter groups and the allocated momentum
//! buffers. It serializes to JSON; where the JSON lives is up to the host.

use crate::error::OptimResult;
use crate::optimizers::LarsConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hyperparameters and member names of one parameter group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupState {
    pub params: Vec<String>,
    /// A missing `nesterov` key is restored as `false`.
    pub config: LarsConfig,
}

/// A flattened momentum buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferState {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// Serializable snapshot of an optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerState {
    /// Optimizer type, checked on load
    pub optimizer_type: String,
    pub param_groups: Vec<GroupState>,
    /// Momentum buffers keyed by parameter name. Parameters whose buffer was
    /// never allocated have no entry.
    #[serde(default)]
    pub state: HashMap<String, BufferState>,
}

impl OptimizerState {
    pub fn new(optimizer_type: &str) -> Self {
        Self {
            optimizer_type: optimizer_type.to_string(),
            param_groups: Vec::new(),
            state: HashMap::new(),
        }
    }

    pub fn to_json(&self) -> OptimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> OptimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Optimizers whose internal state can be saved and restored, so training can
/// resume exactly where it stopped.
pub trait Stateful {
    /// Exports hyperparameters and momentum buffers.
    fn state_dict(&self) -> OptimizerState;

    /// Restores a snapshot produced by [`Stateful::state_dict`].
    ///
    /// Fails on a different optimizer type, mismatching parameter groups,
    /// invalid hyperparameters or malformed buffers. The optimizer is left
    /// unchanged on error.
    fn load_state_dict(&mut self, state: &OptimizerState) -> OptimResult<()>;
}
