/// Validation metrics over predicted pass probabilities
///
/// Empty inputs give `NaN` so an empty validation partition still yields a report.
use crate::traits::Outcome;

/// Binary cross-entropy, probabilities clipped away from 0 and 1
pub fn log_loss(labels: &[Outcome], pass_probabilities: &[f64]) -> f64 {
    if labels.is_empty() {
        return f64::NAN;
    }
    let total: f64 = labels
        .iter()
        .zip(pass_probabilities)
        .map(|(&label, &p)| {
            let p = p.clamp(f64::EPSILON, 1.0 - f64::EPSILON);
            match label {
                Outcome::Pass => -p.ln(),
                Outcome::Fail => -(1.0 - p).ln(),
            }
        })
        .sum();
    total / labels.len() as f64
}

fn predicted(p: f64, threshold: f64) -> Outcome {
    if p >= threshold {
        Outcome::Pass
    } else {
        Outcome::Fail
    }
}

/// F1 of the pass class; 0.0 when precision and recall are both undefined or zero
pub fn f1_score(labels: &[Outcome], pass_probabilities: &[f64], threshold: f64) -> f64 {
    if labels.is_empty() {
        return f64::NAN;
    }
    let (mut tp, mut fp, mut fn_) = (0usize, 0usize, 0usize);
    for (&label, &p) in labels.iter().zip(pass_probabilities) {
        match (label, predicted(p, threshold)) {
            (Outcome::Pass, Outcome::Pass) => tp += 1,
            (Outcome::Fail, Outcome::Pass) => fp += 1,
            (Outcome::Pass, Outcome::Fail) => fn_ += 1,
            (Outcome::Fail, Outcome::Fail) => {}
        }
    }
    let denominator = 2 * tp + fp + fn_;
    if denominator == 0 {
        0.0
    } else {
        2.0 * tp as f64 / denominator as f64
    }
}

pub fn accuracy(labels: &[Outcome], pass_probabilities: &[f64], threshold: f64) -> f64 {
    if labels.is_empty() {
        return f64::NAN;
    }
    let correct = labels
        .iter()
        .zip(pass_probabilities)
        .filter(|(&label, &p)| predicted(p, threshold) == label)
        .count();
    correct as f64 / labels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Outcome::{Fail, Pass};

    #[test]
    fn test_log_loss_known_value() {
        let loss = log_loss(&[Pass, Fail], &[0.8, 0.4]);
        let expected = -(0.8f64.ln() + 0.6f64.ln()) / 2.0;
        assert!((loss - expected).abs() < 1e-12);
    }

    #[test]
    fn test_log_loss_is_finite_for_confident_mistakes() {
        let loss = log_loss(&[Pass], &[0.0]);
        assert!(loss.is_finite());
        assert!(loss > 30.0);
    }

    #[test]
    fn test_f1_and_accuracy() {
        let labels = [Pass, Pass, Fail, Fail];
        let probs = [0.9, 0.2, 0.7, 0.1];
        // tp=1 fp=1 fn=1
        assert!((f1_score(&labels, &probs, 0.5) - 0.5).abs() < 1e-12);
        assert!((accuracy(&labels, &probs, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_f1_without_positives() {
        assert_eq!(f1_score(&[Fail, Fail], &[0.1, 0.2], 0.5), 0.0);
    }

    #[test]
    fn test_empty_inputs_are_nan() {
        assert!(log_loss(&[], &[]).is_nan());
        assert!(f1_score(&[], &[], 0.5).is_nan());
        assert!(accuracy(&[], &[], 0.5).is_nan());
    }
}
