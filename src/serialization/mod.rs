//! Saving and restoring optimizer state.
//!
//! [`OptimizerState`] is a serde-serializable copy of the hyperparameter
//! groups and momentum buffers, produced and consumed through [`Stateful`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rustylars::serialization::{OptimizerState, Stateful};
//!
//! let json = optimizer.state_dict().to_json()?;
//! let resumed = Lars::from_state_dict(&OptimizerState::from_json(&json)?)?;
//! ```

pub mod state;

pub use state::{BufferState, GroupState, OptimizerState, Stateful};
