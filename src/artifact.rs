/// Persisted model: fitted feature extractor + calibrated classifier
///
/// Immutable once built. Stored as a single bincode file.
use crate::calibration::CalibratedClassifier;
use crate::errors::{Result, RiskError};
use crate::features::FeatureExtractor;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedArtifact {
    features: FeatureExtractor,
    classifier: CalibratedClassifier,
}

impl TrainedArtifact {
    pub fn new(features: FeatureExtractor, classifier: CalibratedClassifier) -> Self {
        Self { features, classifier }
    }

    pub fn features(&self) -> &FeatureExtractor {
        &self.features
    }

    /// Calibrated pass probability of already-normalized text
    pub fn pass_probability(&self, normalized: &str) -> f64 {
        self.classifier.predict_pass(&self.features.transform(normalized))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        info!(
            "Saved model ({} features, {} calibration folds) → {}",
            self.features.dim(),
            self.classifier.fold_count(),
            path.display()
        );
        Ok(())
    }

    /// `ModelUnavailable` when the file is absent, cannot be opened, or is not an artifact
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RiskError::ModelUnavailable(format!(
                "Model not found at {}. Train it first with iac-train.",
                path.display()
            )),
            _ => RiskError::ModelUnavailable(format!("cannot open model {}: {}", path.display(), e)),
        })?;
        bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
            RiskError::ModelUnavailable(format!("{} is not a valid model file: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unopenable_model_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("model.bin");
        std::fs::write(&blocker, b"x").unwrap();

        // A regular file used as a directory component fails on open, not as "not found"
        let nested = blocker.join("model.bin");
        let err = TrainedArtifact::load_from_file(&nested).unwrap_err();
        assert!(matches!(err, RiskError::ModelUnavailable(_)), "{:?}", err);

        let err = TrainedArtifact::load_from_file(dir.path()).unwrap_err();
        assert!(matches!(err, RiskError::ModelUnavailable(_)), "{:?}", err);
    }

    #[test]
    fn test_missing_model_message() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrainedArtifact::load_from_file(&dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, RiskError::ModelUnavailable(ref m) if m.contains("Train it first")));
    }
}
