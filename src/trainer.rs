/// Training pipeline: group split → features → calibrated classifier → validation metrics
use crate::artifact::TrainedArtifact;
use crate::calibration::CalibratedClassifier;
use crate::dataset::Dataset;
use crate::dataset_splitter::{split_by_group, SplitConfig};
use crate::errors::Result;
use crate::features::FeatureExtractor;
use crate::metrics;
use crate::normalizer::normalize;
use crate::pipeline_config::TrainerConfig;
use crate::traits::Outcome;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Diagnostic summary of one training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub train_samples: usize,
    pub validation_samples: usize,
    pub train_groups: usize,
    pub validation_groups: usize,
    pub feature_dim: usize,
    /// `NaN` (serialized as null) when the validation partition is empty
    pub log_loss: f64,
    pub f1: f64,
    pub accuracy: f64,
    pub threshold: f64,
}

impl TrainingReport {
    pub fn save_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn log_summary(&self) {
        info!("📊 Validation:");
        info!(
            "   Train: {} samples / {} groups",
            self.train_samples, self.train_groups
        );
        info!(
            "   Validation: {} samples / {} groups",
            self.validation_samples, self.validation_groups
        );
        info!("   LogLoss: {:.4}", self.log_loss);
        info!("   F1 (pass, threshold {}): {:.4}", self.threshold, self.f1);
        info!("   Accuracy: {:.4}", self.accuracy);
    }
}

pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn train(&self, dataset: &Dataset) -> Result<(TrainedArtifact, TrainingReport)> {
        let texts: Vec<String> = dataset.samples().iter().map(|s| normalize(&s.text)).collect();
        let outcomes: Vec<Outcome> = dataset.samples().iter().map(|s| s.outcome).collect();

        let split = split_by_group(
            dataset,
            &SplitConfig {
                holdout_fraction: self.config.holdout_fraction,
                seed: self.config.split_seed,
            },
        )?;
        let stats = split.stats();
        info!(
            "Split {} samples: {} train ({} groups), {} validation ({} groups, {:.1}%)",
            stats.total_size,
            stats.train_size,
            stats.train_groups,
            stats.validation_size,
            stats.validation_groups,
            stats.validation_ratio() * 100.0
        );

        let train_texts: Vec<String> = split.train.iter().map(|&i| texts[i].clone()).collect();
        let train_outcomes: Vec<Outcome> = split.train.iter().map(|&i| outcomes[i]).collect();

        let features = FeatureExtractor::fit(&self.config.features, &train_texts)?;
        info!(
            "Fitted vocabularies: {} word + {} char features",
            features.word_dim(),
            features.dim() - features.word_dim()
        );

        let rows = features.transform_batch(&train_texts);
        let classifier = CalibratedClassifier::fit(
            &self.config.classifier,
            &rows,
            &train_outcomes,
            features.dim(),
            self.config.calibration_folds,
        )?;

        let artifact = TrainedArtifact::new(features, classifier);

        let validation_outcomes: Vec<Outcome> = split.validation.iter().map(|&i| outcomes[i]).collect();
        let validation_probabilities: Vec<f64> = split
            .validation
            .iter()
            .map(|&i| artifact.pass_probability(&texts[i]))
            .collect();

        let threshold = self.config.threshold;
        let report = TrainingReport {
            train_samples: stats.train_size,
            validation_samples: stats.validation_size,
            train_groups: stats.train_groups,
            validation_groups: stats.validation_groups,
            feature_dim: artifact.features().dim(),
            log_loss: metrics::log_loss(&validation_outcomes, &validation_probabilities),
            f1: metrics::f1_score(&validation_outcomes, &validation_probabilities, threshold),
            accuracy: metrics::accuracy(&validation_outcomes, &validation_probabilities, threshold),
            threshold,
        };
        report.log_summary();

        Ok((artifact, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus_builder::CorpusBuilder;
    use crate::errors::RiskError;
    use crate::implementations::InMemoryLogSource;
    use crate::pipeline_config::CorpusConfig;

    fn small_dataset() -> Dataset {
        let fail = InMemoryLogSource::new(
            "fail",
            Outcome::Fail,
            vec![
                ("f1.log".to_string(), "SubnetNotFound: subnet 'a' in virtual network 'b'".to_string()),
                ("f2.log".to_string(), "QuotaExceeded for cores".to_string()),
                ("f3.log".to_string(), "AuthorizationFailed".to_string()),
                ("f4.log".to_string(), "route table rt-x not found".to_string()),
                ("f5.log".to_string(), "InvalidResourceName".to_string()),
            ],
        );
        let pass = InMemoryLogSource::new(
            "pass",
            Outcome::Pass,
            vec![
                ("p1.log".to_string(), "Apply complete!".to_string()),
                ("p2.log".to_string(), "Apply complete! Resources: 3 added".to_string()),
                ("p3.log".to_string(), "ok".to_string()),
                ("p4.log".to_string(), "done".to_string()),
                ("p5.log".to_string(), "fine".to_string()),
            ],
        );
        let config = CorpusConfig::default().with_aug_per_fail(6).with_aug_per_pass(6);
        CorpusBuilder::new(config).build(&fail, &pass).unwrap()
    }

    #[test]
    fn test_train_reports_group_split() {
        let dataset = small_dataset();
        let (artifact, report) = Trainer::new(TrainerConfig::default()).train(&dataset).unwrap();

        // ceil(0.2 * 10) = 2 validation groups of 6 samples each
        assert_eq!(report.validation_groups, 2);
        assert_eq!(report.train_groups, 8);
        assert_eq!(report.validation_samples, 12);
        assert_eq!(report.train_samples + report.validation_samples, dataset.len());
        assert!(report.log_loss.is_finite());
        assert!((0.0..=1.0).contains(&report.accuracy));
        assert_eq!(report.feature_dim, artifact.features().dim());
    }

    #[test]
    fn test_probabilities_are_bounded() {
        let dataset = small_dataset();
        let (artifact, _) = Trainer::new(TrainerConfig::default()).train(&dataset).unwrap();
        for sample in dataset.samples() {
            let p = artifact.pass_probability(&normalize(&sample.text));
            assert!((0.0..=1.0).contains(&p), "{} → {}", sample.id, p);
        }
    }

    #[test]
    fn test_single_outcome_dataset_fails() {
        let fail = InMemoryLogSource::new(
            "fail",
            Outcome::Fail,
            vec![
                ("a.log".to_string(), "QuotaExceeded".to_string()),
                ("b.log".to_string(), "QuotaExceeded".to_string()),
                ("c.log".to_string(), "QuotaExceeded".to_string()),
            ],
        );
        let pass = InMemoryLogSource::empty("pass", Outcome::Pass);
        let dataset = CorpusBuilder::new(CorpusConfig::default()).build(&fail, &pass).unwrap();

        let err = Trainer::new(TrainerConfig::default()).train(&dataset).unwrap_err();
        assert!(matches!(err, RiskError::Training(_)));
    }

    #[test]
    fn test_zero_holdout_gives_nan_metrics() {
        let dataset = small_dataset();
        let config = TrainerConfig::default().with_holdout_fraction(0.0);
        let (_, report) = Trainer::new(config).train(&dataset).unwrap();

        assert_eq!(report.validation_samples, 0);
        assert!(report.log_loss.is_nan());
        assert!(report.f1.is_nan());
    }

    #[test]
    fn test_report_json() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = small_dataset();
        let (_, report) = Trainer::new(TrainerConfig::default()).train(&dataset).unwrap();

        let path = dir.path().join("reports/train.json");
        report.save_json(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["validation_groups"], 2);
    }
}
