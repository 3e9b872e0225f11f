/// Isotonic probability calibration over k stratified folds
///
/// For every fold the SGD model is fitted on the remaining folds, and an
/// isotonic (monotone non-decreasing) map from its decision scores to the
/// held-out labels is learned with pool-adjacent-violators. The calibrated
/// pass probability is the mean of the per-fold maps, each lightly blended
/// with its raw margin so ties on an isotonic level still follow the margin.
use crate::classifier::SgdClassifier;
use crate::errors::{Result, RiskError};
use crate::features::SparseVector;
use crate::pipeline_config::ClassifierConfig;
use crate::traits::Outcome;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Piecewise-linear monotone map, clipped to the fitted score range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsotonicCalibrator {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl IsotonicCalibrator {
    /// Fit on (score, target) pairs with targets in [0, 1]
    pub fn fit(scores: &[f64], targets: &[f64]) -> Result<Self> {
        if scores.is_empty() || scores.len() != targets.len() {
            return Err(RiskError::Training(format!(
                "isotonic fit needs matching non-empty inputs ({} scores, {} targets)",
                scores.len(),
                targets.len()
            )));
        }

        let mut pairs: Vec<(f64, f64)> = scores.iter().copied().zip(targets.iter().copied()).collect();
        pairs.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        });

        // Merge tied scores into one weighted point
        let mut xs: Vec<f64> = Vec::new();
        let mut ys: Vec<f64> = Vec::new();
        let mut ws: Vec<f64> = Vec::new();
        for (x, y) in pairs {
            match xs.last() {
                Some(&last) if last == x => {
                    let k = ys.len() - 1;
                    ys[k] = (ys[k] * ws[k] + y) / (ws[k] + 1.0);
                    ws[k] += 1.0;
                }
                _ => {
                    xs.push(x);
                    ys.push(y);
                    ws.push(1.0);
                }
            }
        }

        let fitted = pool_adjacent_violators(&ys, &ws);
        Ok(Self { x: xs, y: fitted })
    }

    pub fn predict(&self, score: f64) -> f64 {
        let n = self.x.len();
        if n == 1 || score <= self.x[0] {
            return self.y[0];
        }
        if score >= self.x[n - 1] {
            return self.y[n - 1];
        }

        // First knot strictly greater than score; score lies in [x[hi-1], x[hi])
        let hi = self.x.partition_point(|&x| x <= score);
        let lo = hi - 1;
        let span = self.x[hi] - self.x[lo];
        if span <= 0.0 {
            return self.y[lo];
        }
        let t = (score - self.x[lo]) / span;
        (self.y[lo] + t * (self.y[hi] - self.y[lo])).clamp(0.0, 1.0)
    }
}

/// Weighted least-squares non-decreasing fit of `values`
fn pool_adjacent_violators(values: &[f64], weights: &[f64]) -> Vec<f64> {
    // Each block: (mean, weight, number of points)
    let mut blocks: Vec<(f64, f64, usize)> = Vec::with_capacity(values.len());
    for (&v, &w) in values.iter().zip(weights.iter()) {
        blocks.push((v, w, 1));
        while blocks.len() > 1 {
            let (m2, w2, c2) = blocks[blocks.len() - 1];
            let (m1, w1, c1) = blocks[blocks.len() - 2];
            if m1 <= m2 {
                break;
            }
            blocks.pop();
            let merged_weight = w1 + w2;
            let last = blocks.len() - 1;
            blocks[last] = ((m1 * w1 + m2 * w2) / merged_weight, merged_weight, c1 + c2);
        }
    }

    let mut out = Vec::with_capacity(values.len());
    for (mean, _, count) in blocks {
        out.extend(std::iter::repeat(mean).take(count));
    }
    out
}

/// Weight of the margin term blended into every calibrated probability
///
/// Isotonic maps are flat on each pooled block and beyond the fitted range, so
/// inputs with different margins can land on the same level. The small
/// softsign term keeps the output strictly increasing in the margin.
const MARGIN_BLEND: f64 = 1e-3;

/// Strictly increasing map of a margin into (0, 1)
fn softsign_unit(margin: f64) -> f64 {
    0.5 + 0.5 * margin / (1.0 + margin.abs())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CalibratedFold {
    model: SgdClassifier,
    calibrator: IsotonicCalibrator,
}

impl CalibratedFold {
    fn predict_pass(&self, row: &SparseVector) -> f64 {
        let margin = self.model.decision_function(row);
        (1.0 - MARGIN_BLEND) * self.calibrator.predict(margin) + MARGIN_BLEND * softsign_unit(margin)
    }
}

/// Ensemble of (SGD model, isotonic calibrator) pairs, one per fold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibratedClassifier {
    folds: Vec<CalibratedFold>,
}

/// Fold index for every row, stratified by outcome without shuffling
///
/// Rows are dealt so that each fold receives a near-equal share of each outcome;
/// within one outcome the folds are contiguous runs in row order.
pub fn stratified_folds(labels: &[Outcome], k: usize) -> Vec<usize> {
    let mut sorted: Vec<Outcome> = labels.to_vec();
    sorted.sort_by_key(|o| o.label());

    // allocation[fold][class]
    let mut allocation = vec![[0usize; 2]; k];
    for (position, outcome) in sorted.iter().enumerate() {
        allocation[position % k][outcome.label() as usize] += 1;
    }

    let mut fold_of = vec![0usize; labels.len()];
    for class in [Outcome::Fail, Outcome::Pass] {
        let mut folds = allocation
            .iter()
            .enumerate()
            .flat_map(|(fold, counts)| std::iter::repeat(fold).take(counts[class.label() as usize]));
        for (i, _) in labels.iter().enumerate().filter(|(_, &l)| l == class) {
            fold_of[i] = folds.next().unwrap_or(k - 1);
        }
    }
    fold_of
}

impl CalibratedClassifier {
    pub fn fit(
        config: &ClassifierConfig,
        rows: &[SparseVector],
        labels: &[Outcome],
        dim: usize,
        k: usize,
    ) -> Result<Self> {
        let n_pass = labels.iter().filter(|&&l| l == Outcome::Pass).count();
        let n_fail = labels.len() - n_pass;
        if n_pass < k || n_fail < k {
            return Err(RiskError::Training(format!(
                "{}-fold calibration needs at least {} rows of each outcome (fail={}, pass={})",
                k, k, n_fail, n_pass
            )));
        }

        let fold_of = stratified_folds(labels, k);
        let mut folds = Vec::with_capacity(k);

        for fold in 0..k {
            let (mut fit_rows, mut fit_labels) = (Vec::new(), Vec::new());
            let (mut held_rows, mut held_targets) = (Vec::new(), Vec::new());
            for (i, row) in rows.iter().enumerate() {
                if fold_of[i] == fold {
                    held_rows.push(row);
                    held_targets.push(labels[i].label() as f64);
                } else {
                    fit_rows.push(row.clone());
                    fit_labels.push(labels[i]);
                }
            }

            let model = SgdClassifier::fit(config, &fit_rows, &fit_labels, dim)?;
            let scores: Vec<f64> = held_rows.iter().map(|r| model.decision_function(r)).collect();
            let calibrator = IsotonicCalibrator::fit(&scores, &held_targets)?;
            debug!(
                "Calibration fold {}: fitted on {} rows, calibrated on {}",
                fold,
                fit_rows.len(),
                held_rows.len()
            );
            folds.push(CalibratedFold { model, calibrator });
        }

        Ok(Self { folds })
    }

    /// Calibrated probability of the pass outcome, in [0, 1]
    ///
    /// Monotone in every fold's margin, and strictly so even where the
    /// isotonic levels tie.
    pub fn predict_pass(&self, row: &SparseVector) -> f64 {
        let total: f64 = self
            .folds
            .iter()
            .map(|f| f.predict_pass(row))
            .sum();
        (total / self.folds.len() as f64).clamp(0.0, 1.0)
    }

    pub fn fold_count(&self) -> usize {
        self.folds.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pav_pools_violations() {
        let fitted = pool_adjacent_violators(&[1.0, 3.0, 2.0, 4.0], &[1.0; 4]);
        assert_eq!(fitted, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn test_isotonic_clip_and_interpolate() {
        let calibrator = IsotonicCalibrator::fit(&[-1.0, 0.0, 1.0], &[0.0, 0.0, 1.0]).unwrap();
        assert_eq!(calibrator.predict(-5.0), 0.0);
        assert_eq!(calibrator.predict(5.0), 1.0);
        assert!((calibrator.predict(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_isotonic_is_monotone() {
        let scores = [0.3, -0.2, 1.5, 0.9, -1.0, 0.1, 2.0, 0.9];
        let targets = [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let calibrator = IsotonicCalibrator::fit(&scores, &targets).unwrap();

        let mut previous = -1.0;
        for step in -30..=30 {
            let p = calibrator.predict(step as f64 * 0.1);
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= previous);
            previous = p;
        }
    }

    #[test]
    fn test_stratified_folds_balance_outcomes() {
        let mut labels = vec![Outcome::Fail; 6];
        labels.extend(vec![Outcome::Pass; 9]);
        let folds = stratified_folds(&labels, 3);

        for fold in 0..3 {
            let fails = (0..labels.len())
                .filter(|&i| folds[i] == fold && labels[i] == Outcome::Fail)
                .count();
            let passes = (0..labels.len())
                .filter(|&i| folds[i] == fold && labels[i] == Outcome::Pass)
                .count();
            assert_eq!(fails, 2);
            assert_eq!(passes, 3);
        }
    }

    fn separable(n: usize) -> (Vec<SparseVector>, Vec<Outcome>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for _ in 0..n {
            rows.push(SparseVector {
                indices: vec![0],
                values: vec![1.0],
            });
            labels.push(Outcome::Pass);
            rows.push(SparseVector {
                indices: vec![1],
                values: vec![1.0],
            });
            labels.push(Outcome::Fail);
        }
        (rows, labels)
    }

    #[test]
    fn test_plateau_keeps_margin_order() {
        let (rows, labels) = separable(12);
        let model = CalibratedClassifier::fit(&ClassifierConfig::default(), &rows, &labels, 2, 3).unwrap();

        // Both rows score past every calibration knot of every fold
        let strong = SparseVector {
            indices: vec![0],
            values: vec![2.0],
        };
        let stronger = SparseVector {
            indices: vec![0],
            values: vec![4.0],
        };
        let p_pass = model.predict_pass(&rows[0]);
        let p_strong = model.predict_pass(&strong);
        let p_stronger = model.predict_pass(&stronger);
        let p_fail = model.predict_pass(&rows[1]);

        assert!(p_stronger > p_strong);
        assert!(p_strong > p_pass);
        assert!(p_pass > p_fail);
        for p in [p_fail, p_pass, p_strong, p_stronger] {
            assert!((0.0..=1.0).contains(&p));
        }
        assert!(p_stronger > 0.99);
        assert!(p_fail < 0.01);
    }

    #[test]
    fn test_softsign_unit_is_bounded_and_increasing() {
        assert_eq!(softsign_unit(0.0), 0.5);
        assert!(softsign_unit(1e6) < 1.0);
        assert!(softsign_unit(-1e6) > 0.0);
        assert!(softsign_unit(3.0) > softsign_unit(2.9));
    }

    #[test]
    fn test_too_few_rows_per_outcome() {
        let rows = vec![SparseVector::default(); 4];
        let labels = vec![Outcome::Fail, Outcome::Pass, Outcome::Pass, Outcome::Pass];
        assert!(matches!(
            CalibratedClassifier::fit(&ClassifierConfig::default(), &rows, &labels, 1, 3),
            Err(RiskError::Training(_))
        ));
    }
}
