/// Inference over a trained artifact
///
/// Text is normalized exactly as at training time before being featurized.
use crate::artifact::TrainedArtifact;
use crate::errors::{Result, RiskError};
use crate::normalizer::normalize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    pub pass_probability: f64,
    pub issue_probability: f64,
}

impl ScoreResult {
    fn from_pass(pass_probability: f64) -> Self {
        let pass_probability = pass_probability.clamp(0.0, 1.0);
        Self {
            pass_probability,
            issue_probability: 1.0 - pass_probability,
        }
    }

    /// Issue probability as a percentage, for report lines
    pub fn issue_percent(&self) -> f64 {
        self.issue_probability * 100.0
    }
}

#[derive(Debug, Clone)]
pub struct Scorer {
    artifact: Arc<TrainedArtifact>,
}

impl Scorer {
    pub fn new(artifact: TrainedArtifact) -> Self {
        Self {
            artifact: Arc::new(artifact),
        }
    }

    /// `ModelUnavailable` when no artifact was supplied
    pub fn from_artifact(artifact: Option<TrainedArtifact>) -> Result<Self> {
        artifact
            .map(Self::new)
            .ok_or_else(|| RiskError::ModelUnavailable("no trained model was supplied".to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        TrainedArtifact::load_from_file(path).map(Self::new)
    }

    pub fn artifact(&self) -> &TrainedArtifact {
        &self.artifact
    }

    pub fn score(&self, raw: &str) -> ScoreResult {
        ScoreResult::from_pass(self.artifact.pass_probability(&normalize(raw)))
    }

    pub fn score_batch(&self, texts: &[&str]) -> Vec<ScoreResult> {
        texts.iter().map(|text| self.score(text)).collect()
    }

    /// Order-preserving parallel scoring; the artifact is only read
    pub fn score_batch_parallel(&self, texts: &[&str]) -> Vec<ScoreResult> {
        use rayon::prelude::*;
        texts.par_iter().map(|text| self.score(text)).collect()
    }
}
