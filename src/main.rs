//! Demo training loop: linear regression on synthetic data, optimized with LARS.

use rustylars::optimizers::config::{DEFAULT_EPS, DEFAULT_ETA, DEFAULT_THRESHOLD};
use rustylars::optimizers::{Lars, LarsConfig, Optimizer, ParamGroup};
use rustylars::serialization::{OptimizerState, Stateful};

use clap::Parser;
use ndarray::{Array1, Array2, ArrayD, Ix1, IxDyn};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const WEIGHT: &str = "linear.weight";
const BIAS: &str = "linear.bias";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "rustylars: LARS optimizer demo", long_about = None)]
struct Args {
    /// Number of training epochs
    #[arg(long, default_value_t = 50)]
    epochs: usize,

    /// Number of synthetic samples
    #[arg(long, default_value_t = 256)]
    samples: usize,

    /// Number of input features
    #[arg(long, default_value_t = 8)]
    features: usize,

    /// Learning rate
    #[arg(long, default_value_t = 1.0)]
    lr: f32,

    /// Momentum coefficient
    #[arg(long, default_value_t = 0.9)]
    momentum: f32,

    /// Weight decay applied to the weight matrix (the bias is not decayed)
    #[arg(long, default_value_t = 0.0)]
    weight_decay: f32,

    /// Trust-ratio scale
    #[arg(long, default_value_t = DEFAULT_ETA)]
    eta: f32,

    /// Numerical-stability floor of the trust ratio
    #[arg(long, default_value_t = DEFAULT_EPS)]
    eps: f32,

    /// Weight norm below which the trust ratio is bypassed
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Seed for data generation and weight init
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// File to write the optimizer state (JSON) to after training
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Optimizer state file to resume from. Hyperparameters are taken from
    /// the file; --lr, --momentum, --weight-decay, --eta, --eps and
    /// --threshold are ignored. Weights are re-initialized from --seed.
    #[arg(long)]
    resume: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    // ---------- Data ----------
    let x = Array2::random_using((args.samples, args.features), Uniform::new(-1.0f32, 1.0), &mut rng);
    let true_w = Array1::random_using(args.features, Uniform::new(-2.0f32, 2.0), &mut rng);
    let noise = Array1::random_using(args.samples, Uniform::new(-0.01f32, 0.01), &mut rng);
    let y = x.dot(&true_w) + 0.5 + noise;

    // ---------- Weights and optimizer ----------
    let base = LarsConfig::new(args.lr)
        .with_momentum(args.momentum)
        .with_eta(args.eta)
        .with_eps(args.eps)
        .with_threshold(args.threshold);

    let groups = vec![
        ParamGroup::new([WEIGHT], base.with_weight_decay(args.weight_decay)),
        ParamGroup::new([BIAS], base),
    ];
    let mut optimizer = match &args.resume {
        Some(path) => {
            let state = OptimizerState::from_json(&fs::read_to_string(path)?)?;
            let optimizer = Lars::from_state_dict(&state)?;
            if optimizer.param_groups() != groups.as_slice() {
                warn!(
                    path = %path.display(),
                    "hyperparameter flags differ from the restored state and are ignored"
                );
            }
            info!(path = %path.display(), "optimizer state restored");
            optimizer
        }
        None => Lars::with_groups(groups)?,
    };

    let mut params = HashMap::new();
    params.insert(
        WEIGHT.to_string(),
        ArrayD::random_using(IxDyn(&[args.features]), Uniform::new(-0.1f32, 0.1), &mut rng),
    );
    params.insert(BIAS.to_string(), ArrayD::zeros(IxDyn(&[1])));

    info!(
        samples = args.samples,
        features = args.features,
        lr = optimizer.learning_rate(),
        resumed = args.resume.is_some(),
        "training started"
    );
    let start_time = Instant::now();

    for epoch in 0..args.epochs {
        let mut grads = gradients(&params, &x, &y)?;
        let loss = optimizer.step_with_closure(&mut params, &mut grads, |p| {
            mse_loss(p, &x, &y).unwrap_or(f32::NAN)
        })?;
        info!(epoch = epoch + 1, loss, "epoch finished");
    }

    info!(elapsed = ?start_time.elapsed(), final_loss = mse_loss(&params, &x, &y)?, "training finished");

    if let Some(path) = &args.save_state {
        fs::write(path, optimizer.state_dict().to_json()?)?;
        info!(path = %path.display(), "optimizer state saved");
    }

    Ok(())
}

/// Residuals `x·w + b - y`.
fn residuals(
    params: &HashMap<String, ArrayD<f32>>,
    x: &Array2<f32>,
    y: &Array1<f32>,
) -> Result<Array1<f32>, Box<dyn std::error::Error>> {
    let w = params
        .get(WEIGHT)
        .ok_or("missing weight parameter")?
        .view()
        .into_dimensionality::<Ix1>()?;
    let b = params
        .get(BIAS)
        .and_then(|b| b.first().copied())
        .ok_or("missing bias parameter")?;
    Ok(x.dot(&w) + b - y)
}

fn mse_loss(
    params: &HashMap<String, ArrayD<f32>>,
    x: &Array2<f32>,
    y: &Array1<f32>,
) -> Result<f32, Box<dyn std::error::Error>> {
    let r = residuals(params, x, y)?;
    Ok(r.mapv(|v| v * v).mean().unwrap_or(0.0))
}

/// Analytic MSE gradients for the weight vector and the bias.
fn gradients(
    params: &HashMap<String, ArrayD<f32>>,
    x: &Array2<f32>,
    y: &Array1<f32>,
) -> Result<HashMap<String, ArrayD<f32>>, Box<dyn std::error::Error>> {
    let r = residuals(params, x, y)?;
    let n = r.len() as f32;
    let grad_w = x.t().dot(&r) * (2.0 / n);
    let grad_b = r.sum() * (2.0 / n);

    let mut grads = HashMap::new();
    grads.insert(WEIGHT.to_string(), grad_w.into_dyn());
    grads.insert(BIAS.to_string(), ArrayD::from_elem(IxDyn(&[1]), grad_b));
    Ok(grads)
}
