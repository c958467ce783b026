//! LARS: layer-wise adaptive rate scaling.
//!
//! Each parameter tensor gets its own "trust ratio"
//!
//! ```text
//! local_lr = eta * ||w|| / (eps + ||g|| + weight_decay * ||w||)
//! ```
//!
//! which rescales the step to the magnitude of the weights. Tensors whose norm
//! is below `threshold` (freshly zeroed biases, for example) bypass the trust
//! ratio and get a plain SGD-with-momentum step instead.

use super::config::LarsConfig;
use super::Optimizer;
use crate::error::{OptimError, OptimResult};
use crate::serialization::state::{BufferState, GroupState, OptimizerState, Stateful};

use ndarray::{azip, ArrayD};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

/// Name stored in snapshots produced by [`Lars`].
pub const OPTIMIZER_TYPE: &str = "LARS";

/// Which branch of the update rule handled a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRegime {
    /// `||w|| < threshold`: the trust ratio is skipped.
    SmallWeight,
    /// `||w|| >= threshold`: the step is scaled by the trust ratio.
    TrustRatio,
}

/// Result of a single [`lars_update`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateOutcome {
    pub regime: UpdateRegime,
    /// Trust ratio computed for this parameter (1.0 in the small-weight regime).
    pub local_lr: f32,
    /// Factor the decayed gradient was actually multiplied by on its way into
    /// the momentum buffer or the parameter. The first momentum step in the
    /// trust-ratio regime stores the raw gradient, so this is 1.0 there even
    /// though `local_lr` is not.
    pub step_scale: f32,
}

/// Euclidean norm over all elements of a tensor.
pub fn l2_norm(tensor: &ArrayD<f32>) -> f32 {
    tensor.iter().map(|&x| x * x).sum::<f32>().sqrt()
}

/// Applies one LARS step to `param` in place.
///
/// Weight decay is added to `grad` in place (`grad += weight_decay * param`),
/// so after the call the caller's gradient holds the decayed value. `buffer`
/// is the momentum buffer of this parameter; it is only touched when
/// `config.momentum != 0`, and a `None` slot is allocated on first use.
///
/// On the first momentum step the buffer receives the raw (decayed) gradient
/// in both regimes. From the second step on, the trust-ratio regime scales
/// the gradient by `lr * local_lr` before accumulating it and then subtracts
/// the buffer unscaled, while the small-weight regime accumulates the raw
/// gradient and subtracts `lr * buffer`.
///
/// # Panics
///
/// Panics if `param`, `grad` and an existing buffer do not share one shape.
/// [`Lars::step`] checks shapes before calling this.
pub fn lars_update(
    param: &mut ArrayD<f32>,
    grad: &mut ArrayD<f32>,
    buffer: &mut Option<ArrayD<f32>>,
    config: &LarsConfig,
) -> UpdateOutcome {
    let weight_norm = l2_norm(param);

    if weight_norm < config.threshold {
        apply_weight_decay(grad, param, config.weight_decay);

        if config.momentum != 0.0 {
            let buf = accumulate(buffer, grad, config.momentum, 1.0);
            param.scaled_add(-config.lr, buf);
        } else {
            param.scaled_add(-config.lr, grad);
        }

        return UpdateOutcome {
            regime: UpdateRegime::SmallWeight,
            local_lr: 1.0,
            step_scale: config.lr,
        };
    }

    let grad_norm = l2_norm(grad);
    let local_lr = config.eta * weight_norm
        / (config.eps + grad_norm + config.weight_decay * weight_norm);

    apply_weight_decay(grad, param, config.weight_decay);

    let step_scale = if config.momentum != 0.0 {
        let first_use = buffer.is_none();
        let buf = accumulate(buffer, grad, config.momentum, config.lr * local_lr);
        param.scaled_add(-1.0, buf);
        if first_use {
            1.0
        } else {
            config.lr * local_lr
        }
    } else {
        param.scaled_add(-(config.lr * local_lr), grad);
        config.lr * local_lr
    };

    UpdateOutcome {
        regime: UpdateRegime::TrustRatio,
        local_lr,
        step_scale,
    }
}

/// `grad += weight_decay * param`
fn apply_weight_decay(grad: &mut ArrayD<f32>, param: &ArrayD<f32>, weight_decay: f32) {
    if weight_decay != 0.0 {
        grad.scaled_add(weight_decay, param);
    }
}

/// `buf = momentum * buf + scale * grad`, starting from a zero buffer.
///
/// A freshly allocated buffer always takes `grad` with scale 1.
fn accumulate<'a>(
    buffer: &'a mut Option<ArrayD<f32>>,
    grad: &ArrayD<f32>,
    momentum: f32,
    scale: f32,
) -> &'a ArrayD<f32> {
    let first_use = buffer.is_none();
    let scale = if first_use { 1.0 } else { scale };
    let buf = buffer.get_or_insert_with(|| ArrayD::zeros(grad.raw_dim()));
    azip!((b in &mut *buf, &g in grad) *b = momentum * *b + scale * g);
    buf
}

/// A set of named parameters sharing one hyperparameter group.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGroup {
    pub params: Vec<String>,
    pub config: LarsConfig,
}

impl ParamGroup {
    pub fn new<I, S>(params: I, config: LarsConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            config,
        }
    }
}

/// Per-parameter optimizer state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamState {
    /// Allocated by the first step that uses momentum.
    pub momentum_buffer: Option<ArrayD<f32>>,
}

/// LARS optimizer over named `f32` tensors.
///
/// Every managed parameter has a state entry from construction on; the
/// momentum buffer inside it is created by the first step that needs it.
#[derive(Debug, Clone)]
pub struct Lars {
    groups: Vec<ParamGroup>,
    state: HashMap<String, ParamState>,
}

impl Lars {
    /// Creates an optimizer with a single parameter group.
    pub fn new<I, S>(params: I, config: LarsConfig) -> OptimResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_groups(vec![ParamGroup::new(params, config)])
    }

    /// Creates an optimizer from several parameter groups.
    ///
    /// Every group config is validated, and a parameter may only appear once
    /// across all groups.
    pub fn with_groups(groups: Vec<ParamGroup>) -> OptimResult<Self> {
        if groups.is_empty() {
            return Err(OptimError::InvalidGroup(
                "optimizer got an empty parameter list".to_string(),
            ));
        }

        let mut state = HashMap::new();
        for group in &groups {
            group.config.validate()?;
            for name in &group.params {
                if state.insert(name.clone(), ParamState::default()).is_some() {
                    return Err(OptimError::InvalidGroup(format!(
                        "parameter '{name}' appears in more than one group"
                    )));
                }
            }
        }

        Ok(Self { groups, state })
    }

    /// Rebuilds an optimizer, including momentum buffers, from a snapshot.
    pub fn from_state_dict(snapshot: &OptimizerState) -> OptimResult<Self> {
        let groups = snapshot
            .param_groups
            .iter()
            .map(|g| ParamGroup::new(g.params.iter().cloned(), g.config))
            .collect();
        let mut optimizer = Self::with_groups(groups)?;
        optimizer.load_state_dict(snapshot)?;
        Ok(optimizer)
    }

    pub fn param_groups(&self) -> &[ParamGroup] {
        &self.groups
    }

    /// Momentum buffer of `name`, if one has been allocated.
    pub fn momentum_buffer(&self, name: &str) -> Option<&ArrayD<f32>> {
        self.state.get(name)?.momentum_buffer.as_ref()
    }

    /// Drops every momentum buffer. The next step starts accumulating anew.
    pub fn zero_state(&mut self) {
        for entry in self.state.values_mut() {
            entry.momentum_buffer = None;
        }
    }

    /// Runs `closure` (typically a loss re-evaluation) on the current
    /// parameters, then performs a step. The closure's value is returned as is.
    pub fn step_with_closure<F, L>(
        &mut self,
        parameters: &mut HashMap<String, ArrayD<f32>>,
        gradients: &mut HashMap<String, ArrayD<f32>>,
        closure: F,
    ) -> OptimResult<L>
    where
        F: FnOnce(&HashMap<String, ArrayD<f32>>) -> L,
    {
        let loss = closure(parameters);
        self.step(parameters, gradients)?;
        Ok(loss)
    }
}

fn check_shape(name: &str, expected: &[usize], actual: &[usize]) -> OptimResult<()> {
    if expected != actual {
        return Err(OptimError::ShapeMismatch {
            name: name.to_string(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

impl Optimizer for Lars {
    fn step(
        &mut self,
        parameters: &mut HashMap<String, ArrayD<f32>>,
        gradients: &mut HashMap<String, ArrayD<f32>>,
    ) -> OptimResult<()> {
        for group in &self.groups {
            for name in &group.params {
                let Some(grad) = gradients.get_mut(name) else {
                    trace!(param = %name, "no gradient, skipping");
                    continue;
                };
                let Some(param) = parameters.get_mut(name) else {
                    trace!(param = %name, "parameter not supplied, skipping");
                    continue;
                };
                let entry = self.state.entry(name.clone()).or_default();

                check_shape(name, param.shape(), grad.shape())?;
                if let Some(buf) = &entry.momentum_buffer {
                    check_shape(name, param.shape(), buf.shape())?;
                }

                let outcome = lars_update(param, grad, &mut entry.momentum_buffer, &group.config);
                debug!(
                    param = %name,
                    regime = ?outcome.regime,
                    local_lr = outcome.local_lr,
                    step_scale = outcome.step_scale,
                    "lars update"
                );
            }
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.groups.first().map(|g| g.config.lr).unwrap_or(0.0)
    }

    fn set_learning_rate(&mut self, lr: f32) {
        for group in &mut self.groups {
            group.config.lr = lr;
        }
    }
}

impl Stateful for Lars {
    fn state_dict(&self) -> OptimizerState {
        let mut snapshot = OptimizerState::new(OPTIMIZER_TYPE);

        snapshot.param_groups = self
            .groups
            .iter()
            .map(|g| GroupState {
                params: g.params.clone(),
                config: g.config,
            })
            .collect();

        for (name, entry) in &self.state {
            if let Some(buf) = &entry.momentum_buffer {
                snapshot.state.insert(
                    name.clone(),
                    BufferState {
                        shape: buf.shape().to_vec(),
                        data: buf.iter().copied().collect(),
                    },
                );
            }
        }

        snapshot
    }

    fn load_state_dict(&mut self, snapshot: &OptimizerState) -> OptimResult<()> {
        if snapshot.optimizer_type != OPTIMIZER_TYPE {
            return Err(OptimError::StateMismatch(format!(
                "cannot load {} state into a {OPTIMIZER_TYPE} optimizer",
                snapshot.optimizer_type
            )));
        }
        if snapshot.param_groups.len() != self.groups.len() {
            return Err(OptimError::StateMismatch(format!(
                "snapshot has {} parameter groups, optimizer has {}",
                snapshot.param_groups.len(),
                self.groups.len()
            )));
        }
        for (i, (saved, group)) in snapshot.param_groups.iter().zip(&self.groups).enumerate() {
            if saved.params != group.params {
                return Err(OptimError::StateMismatch(format!(
                    "parameter group {i} does not match the optimizer's parameters"
                )));
            }
            saved.config.validate()?;
        }

        // Build everything first so a bad buffer leaves the optimizer untouched.
        let managed: HashSet<&String> = self.groups.iter().flat_map(|g| &g.params).collect();
        let mut buffers = HashMap::new();
        for (name, saved) in &snapshot.state {
            if !managed.contains(name) {
                warn!(param = %name, "ignoring momentum buffer of unknown parameter");
                continue;
            }
            let buf = ArrayD::from_shape_vec(saved.shape.clone(), saved.data.clone()).map_err(
                |e| OptimError::StateMismatch(format!("momentum buffer for '{name}': {e}")),
            )?;
            buffers.insert(name.clone(), buf);
        }

        for (group, saved) in self.groups.iter_mut().zip(&snapshot.param_groups) {
            group.config = saved.config;
        }
        for (name, entry) in self.state.iter_mut() {
            entry.momentum_buffer = buffers.remove(name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, IxDyn};

    fn tensor(values: &[f32]) -> ArrayD<f32> {
        ArrayD::from_shape_vec(IxDyn(&[values.len()]), values.to_vec()).unwrap()
    }

    fn assert_close(actual: &ArrayD<f32>, expected: &ArrayD<f32>) {
        assert_eq!(actual.shape(), expected.shape());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-5, "{a} != {e}");
        }
    }

    #[test]
    fn test_l2_norm() {
        assert_eq!(l2_norm(&tensor(&[3.0, 4.0])), 5.0);
        assert_eq!(l2_norm(&tensor(&[0.0, 0.0])), 0.0);
        assert_eq!(l2_norm(&array![[1.0f32, 1.0], [1.0, 1.0]].into_dyn()), 2.0);
    }

    #[test]
    fn test_small_weight_without_momentum() {
        let config = LarsConfig::new(0.5).with_threshold(1.0).with_eta(100.0);
        let mut param = tensor(&[0.1, 0.2]);
        let mut grad = tensor(&[1.0, -1.0]);
        let mut buffer = None;

        let outcome = lars_update(&mut param, &mut grad, &mut buffer, &config);

        assert_eq!(outcome.regime, UpdateRegime::SmallWeight);
        assert_eq!(outcome.local_lr, 1.0);
        assert_eq!(outcome.step_scale, 0.5);
        assert_close(&param, &tensor(&[0.1 - 0.5, 0.2 + 0.5]));
        assert!(buffer.is_none());
    }

    #[test]
    fn test_small_weight_with_momentum_and_decay() {
        let config = LarsConfig::new(0.1)
            .with_momentum(0.9)
            .with_weight_decay(0.5)
            .with_threshold(10.0);
        let mut param = tensor(&[1.0, 2.0]);
        let mut buffer = None;

        lars_update(&mut param, &mut tensor(&[0.2, 0.4]), &mut buffer, &config);
        // d_p = [0.2 + 0.5, 0.4 + 1.0], buf = d_p
        assert_close(buffer.as_ref().unwrap(), &tensor(&[0.7, 1.4]));
        assert_close(&param, &tensor(&[1.0 - 0.07, 2.0 - 0.14]));

        let before: Vec<f32> = param.iter().copied().collect();
        lars_update(&mut param, &mut tensor(&[0.2, 0.4]), &mut buffer, &config);
        let d_p = [0.2 + 0.5 * before[0], 0.4 + 0.5 * before[1]];
        let buf = [0.9 * 0.7 + d_p[0], 0.9 * 1.4 + d_p[1]];
        assert_close(buffer.as_ref().unwrap(), &tensor(&buf));
        assert_close(
            &param,
            &tensor(&[before[0] - 0.1 * buf[0], before[1] - 0.1 * buf[1]]),
        );
    }

    #[test]
    fn test_trust_ratio_momentum_first_use_is_unscaled() {
        let config = LarsConfig::new(0.1).with_momentum(0.9).with_threshold(0.0);
        let mut param = tensor(&[3.0, 4.0]);
        let grad = tensor(&[0.6, 0.8]);
        let mut buffer = None;

        let outcome = lars_update(&mut param, &mut grad.clone(), &mut buffer, &config);
        assert_eq!(outcome.regime, UpdateRegime::TrustRatio);
        assert_eq!(outcome.step_scale, 1.0);
        assert!(outcome.local_lr < 1.0);
        assert_close(buffer.as_ref().unwrap(), &grad);
        assert_close(&param, &tensor(&[2.4, 3.2]));

        let weight_norm = l2_norm(&param);
        let local_lr = 1e-3 * weight_norm / (1e-9 + 1.0);
        let outcome = lars_update(&mut param, &mut grad.clone(), &mut buffer, &config);
        assert!((outcome.local_lr - local_lr).abs() < 1e-8);
        assert!((outcome.step_scale - 0.1 * local_lr).abs() < 1e-8);

        let scale = 0.1 * local_lr;
        let buf = [0.9 * 0.6 + scale * 0.6, 0.9 * 0.8 + scale * 0.8];
        assert_close(buffer.as_ref().unwrap(), &tensor(&buf));
        assert_close(&param, &tensor(&[2.4 - buf[0], 3.2 - buf[1]]));
    }

    #[test]
    fn test_trust_ratio_momentum_with_weight_decay() {
        let (lr, momentum, wd, eta, eps) = (0.5f32, 0.9f32, 0.1f32, 0.01f32, 1e-9f32);
        let config = LarsConfig::new(lr)
            .with_momentum(momentum)
            .with_weight_decay(wd)
            .with_eta(eta)
            .with_eps(eps)
            .with_threshold(0.0);
        let p0 = [2.0f32, 3.0];
        let g = [0.2f32, 0.4];
        let mut param = tensor(&p0);
        let mut buffer = None;

        // First use: the decayed gradient goes into the buffer unscaled.
        lars_update(&mut param, &mut tensor(&g), &mut buffer, &config);
        let buf1 = [g[0] + wd * p0[0], g[1] + wd * p0[1]];
        let p1 = [p0[0] - buf1[0], p0[1] - buf1[1]];
        assert_close(buffer.as_ref().unwrap(), &tensor(&buf1));
        assert_close(&param, &tensor(&p1));

        // Steady state: lr * local_lr scales the decayed gradient.
        let outcome = lars_update(&mut param, &mut tensor(&g), &mut buffer, &config);
        let weight_norm = (p1[0] * p1[0] + p1[1] * p1[1]).sqrt();
        let grad_norm = (g[0] * g[0] + g[1] * g[1]).sqrt();
        let local_lr = eta * weight_norm / (eps + grad_norm + wd * weight_norm);
        let d2 = [g[0] + wd * p1[0], g[1] + wd * p1[1]];
        let buf2 = [
            momentum * buf1[0] + lr * local_lr * d2[0],
            momentum * buf1[1] + lr * local_lr * d2[1],
        ];
        let p2 = [p1[0] - buf2[0], p1[1] - buf2[1]];

        assert!((outcome.local_lr - local_lr).abs() < 1e-6);
        assert_close(buffer.as_ref().unwrap(), &tensor(&buf2));
        assert_close(&param, &tensor(&p2));
    }

    #[test]
    fn test_trust_ratio_includes_weight_decay_in_denominator() {
        let config = LarsConfig::new(1.0)
            .with_weight_decay(0.5)
            .with_eta(0.1)
            .with_threshold(0.0);
        let mut param = tensor(&[3.0, 4.0]);
        let mut grad = tensor(&[0.0, 1.0]);
        let mut buffer = None;

        let outcome = lars_update(&mut param, &mut grad, &mut buffer, &config);
        let local_lr = 0.1 * 5.0 / (1e-9 + 1.0 + 0.5 * 5.0);
        assert!((outcome.local_lr - local_lr).abs() < 1e-6);

        let d_p = [0.0 + 0.5 * 3.0, 1.0 + 0.5 * 4.0];
        assert_close(
            &param,
            &tensor(&[3.0 - local_lr * d_p[0], 4.0 - local_lr * d_p[1]]),
        );
    }

    #[test]
    fn test_weight_decay_is_added_to_gradient_in_place() {
        let config = LarsConfig::new(0.1).with_weight_decay(0.5).with_momentum(0.9);
        let mut params = HashMap::from([("w".to_string(), tensor(&[1.0, 2.0]))]);
        let mut grads = HashMap::from([("w".to_string(), tensor(&[0.2, 0.4]))]);
        let mut optimizer = Lars::new(["w"], config).unwrap();

        optimizer.step(&mut params, &mut grads).unwrap();

        // grad = g0 + wd * p0
        assert_close(&grads["w"], &tensor(&[0.7, 1.4]));
    }

    #[test]
    fn test_gradient_untouched_without_weight_decay() {
        let config = LarsConfig::new(0.1).with_momentum(0.9);
        let mut param = tensor(&[1.0, 1.0]);
        let mut grad = tensor(&[0.5, 0.5]);
        let mut buffer = None;

        lars_update(&mut param, &mut grad, &mut buffer, &config);
        assert_eq!(grad, tensor(&[0.5, 0.5]));
    }

    #[test]
    fn test_with_groups_rejects_empty_and_duplicates() {
        assert!(matches!(
            Lars::with_groups(vec![]),
            Err(OptimError::InvalidGroup(_))
        ));

        let config = LarsConfig::new(0.1);
        let groups = vec![
            ParamGroup::new(["w", "b"], config),
            ParamGroup::new(["w"], config),
        ];
        assert!(matches!(
            Lars::with_groups(groups),
            Err(OptimError::InvalidGroup(_))
        ));
    }

    #[test]
    fn test_state_entries_exist_before_first_step() {
        let optimizer = Lars::new(["w", "b"], LarsConfig::new(0.1)).unwrap();
        assert_eq!(optimizer.state.len(), 2);
        assert!(optimizer.state.values().all(|s| s.momentum_buffer.is_none()));
    }

    #[test]
    fn test_shape_mismatch_leaves_param_untouched() {
        let mut optimizer = Lars::new(["w"], LarsConfig::new(0.1)).unwrap();
        let mut params = HashMap::from([("w".to_string(), tensor(&[1.0, 2.0]))]);
        let mut grads = HashMap::from([("w".to_string(), tensor(&[1.0, 2.0, 3.0]))]);

        let err = optimizer.step(&mut params, &mut grads).unwrap_err();
        assert!(matches!(err, OptimError::ShapeMismatch { .. }));
        assert_eq!(params["w"], tensor(&[1.0, 2.0]));
    }

    #[test]
    fn test_groups_use_their_own_config() {
        let groups = vec![
            ParamGroup::new(["a"], LarsConfig::new(1.0).with_threshold(10.0)),
            ParamGroup::new(["b"], LarsConfig::new(0.5).with_threshold(10.0)),
        ];
        let mut optimizer = Lars::with_groups(groups).unwrap();
        let mut params = HashMap::from([
            ("a".to_string(), tensor(&[1.0])),
            ("b".to_string(), tensor(&[1.0])),
        ]);
        let mut grads = HashMap::from([
            ("a".to_string(), tensor(&[1.0])),
            ("b".to_string(), tensor(&[1.0])),
        ]);

        optimizer.step(&mut params, &mut grads).unwrap();
        assert_close(&params["a"], &tensor(&[0.0]));
        assert_close(&params["b"], &tensor(&[0.5]));
    }

    #[test]
    fn test_set_learning_rate_applies_to_all_groups() {
        let groups = vec![
            ParamGroup::new(["a"], LarsConfig::new(1.0)),
            ParamGroup::new(["b"], LarsConfig::new(0.5)),
        ];
        let mut optimizer = Lars::with_groups(groups).unwrap();
        assert_eq!(optimizer.learning_rate(), 1.0);

        optimizer.set_learning_rate(0.01);
        assert!(optimizer.param_groups().iter().all(|g| g.config.lr == 0.01));
    }

    #[test]
    fn test_zero_state_drops_buffers() {
        let config = LarsConfig::new(0.1).with_momentum(0.9);
        let mut optimizer = Lars::new(["w"], config).unwrap();
        let mut params = HashMap::from([("w".to_string(), tensor(&[1.0, 2.0]))]);
        let mut grads = HashMap::from([("w".to_string(), tensor(&[0.1, 0.1]))]);

        optimizer.step(&mut params, &mut grads).unwrap();
        assert!(optimizer.momentum_buffer("w").is_some());

        optimizer.zero_state();
        assert!(optimizer.momentum_buffer("w").is_none());
    }

    #[test]
    fn test_load_state_dict_rejects_foreign_state() {
        let mut optimizer = Lars::new(["w"], LarsConfig::new(0.1)).unwrap();

        let foreign = OptimizerState::new("SGD");
        assert!(matches!(
            optimizer.load_state_dict(&foreign),
            Err(OptimError::StateMismatch(_))
        ));

        let mut bad_buffer = optimizer.state_dict();
        bad_buffer.state.insert(
            "w".to_string(),
            BufferState {
                shape: vec![3],
                data: vec![1.0, 2.0],
            },
        );
        assert!(matches!(
            optimizer.load_state_dict(&bad_buffer),
            Err(OptimError::StateMismatch(_))
        ));
        assert!(optimizer.momentum_buffer("w").is_none());
    }
}
