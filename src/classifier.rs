/// Linear classifier trained with stochastic gradient descent on log-loss
///
/// - L2 penalty, "optimal" learning-rate schedule `eta = 1 / (alpha * (t0 + t))`
/// - balanced class weights `n / (2 * count_c)`
/// - fixed number of epochs, each over a seeded shuffle of the rows
///
/// Weights are kept as `w = wscale * raw` so the per-step L2 shrink is O(1)
/// on sparse rows.
use crate::errors::{Result, RiskError};
use crate::features::SparseVector;
use crate::pipeline_config::ClassifierConfig;
use crate::traits::Outcome;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Intercept step damping for sparse input
const SPARSE_INTERCEPT_DECAY: f64 = 0.01;
const MAX_DLOSS: f64 = 1e12;
const MIN_WSCALE: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SgdClassifier {
    weights: Vec<f64>,
    intercept: f64,
}

/// Derivative of `ln(1 + exp(-y p))` with respect to `p`
fn log_loss_dloss(p: f64, y: f64) -> f64 {
    let z = p * y;
    if z > 18.0 {
        -y * (-z).exp()
    } else if z < -18.0 {
        -y
    } else {
        -y / (z.exp() + 1.0)
    }
}

fn signed(outcome: Outcome) -> f64 {
    match outcome {
        Outcome::Pass => 1.0,
        Outcome::Fail => -1.0,
    }
}

impl SgdClassifier {
    pub fn fit(config: &ClassifierConfig, rows: &[SparseVector], labels: &[Outcome], dim: usize) -> Result<Self> {
        if rows.len() != labels.len() {
            return Err(RiskError::Training(format!(
                "rows and labels size mismatch: {} vs {}",
                rows.len(),
                labels.len()
            )));
        }

        let n_pass = labels.iter().filter(|&&l| l == Outcome::Pass).count();
        let n_fail = labels.len() - n_pass;
        if n_pass == 0 || n_fail == 0 {
            return Err(RiskError::Training(format!(
                "training rows must contain both outcomes (fail={}, pass={})",
                n_fail, n_pass
            )));
        }

        let n = labels.len() as f64;
        let (weight_pass, weight_fail) = if config.balanced {
            (n / (2.0 * n_pass as f64), n / (2.0 * n_fail as f64))
        } else {
            (1.0, 1.0)
        };

        let alpha = config.alpha;
        let typw = (1.0 / alpha.sqrt()).sqrt();
        let initial_eta0 = typw / log_loss_dloss(-typw, 1.0).max(1.0);
        let optimal_init = 1.0 / (initial_eta0 * alpha);

        let mut raw = vec![0.0; dim];
        let mut wscale = 1.0;
        let mut intercept = 0.0;
        let mut t = 1.0;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut order: Vec<usize> = (0..rows.len()).collect();

        for _epoch in 0..config.max_iter {
            order.shuffle(&mut rng);
            for &i in &order {
                let row = &rows[i];
                let y = signed(labels[i]);
                let p = row.dot(&raw) * wscale + intercept;
                let eta = 1.0 / (alpha * (optimal_init + t - 1.0));
                let dloss = log_loss_dloss(p, y).clamp(-MAX_DLOSS, MAX_DLOSS);
                let class_weight = if y > 0.0 { weight_pass } else { weight_fail };
                let update = -eta * dloss * class_weight;

                wscale *= (1.0 - eta * alpha).max(0.0);
                if wscale < MIN_WSCALE {
                    raw.iter_mut().for_each(|w| *w *= wscale);
                    wscale = 1.0;
                }

                if update != 0.0 {
                    for (j, v) in row.iter() {
                        if j < dim {
                            raw[j] += update * v / wscale;
                        }
                    }
                    intercept += update * SPARSE_INTERCEPT_DECAY;
                }
                t += 1.0;
            }
        }

        raw.iter_mut().for_each(|w| *w *= wscale);
        Ok(Self {
            weights: raw,
            intercept,
        })
    }

    /// Raw margin `w·x + b`; positive leans pass
    pub fn decision_function(&self, row: &SparseVector) -> f64 {
        row.dot(&self.weights) + self.intercept
    }
}
