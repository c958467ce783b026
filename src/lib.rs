//! # rustylars: LARS optimizer for ndarray training loops
//!
//! **rustylars** implements layer-wise adaptive rate scaling (LARS) with
//! optional momentum and weight decay. The host training loop owns the model,
//! the forward/backward passes and the schedule; this crate supplies the
//! per-step update, the per-parameter momentum state and its snapshots.
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use ndarray::{ArrayD, IxDyn};
//! use rustylars::optimizers::{Lars, LarsConfig, Optimizer};
//!
//! // 1. Weights keyed by parameter name
//! let mut params = HashMap::new();
//! params.insert("linear.weight".to_string(), ArrayD::<f32>::ones(IxDyn(&[4, 4])));
//!
//! // 2. Optimizer with validated hyperparameters
//! let config = LarsConfig::new(0.1).with_momentum(0.9).with_weight_decay(1e-4);
//! let mut optimizer = Lars::new(params.keys().cloned(), config)?;
//!
//! // 3. Gradients from the backward pass, then one step
//! let mut grads = HashMap::new();
//! grads.insert("linear.weight".to_string(), ArrayD::<f32>::from_elem(IxDyn(&[4, 4]), 0.01));
//! optimizer.step(&mut params, &mut grads)?;
//! # Ok::<(), rustylars::OptimError>(())
//! ```

pub mod error;
pub mod optimizers;
pub mod serialization;

pub use error::{OptimError, OptimResult};
