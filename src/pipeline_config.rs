use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Regions offered to the region-substitution transform.
pub const DEFAULT_REGIONS: &[&str] = &["eastus", "eastus2", "japaneast", "westeurope", "uksouth"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentationConfig {
    pub seed: u64,
    pub suffix_len: usize,
    pub regions: Vec<String>,
    pub comment_probability: f64,
    /// Instant written into `# generated ...` comment lines.
    pub generated_at: DateTime<Utc>,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            suffix_len: 2,
            regions: DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect(),
            comment_probability: 0.5,
            generated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }
}

impl AugmentationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_suffix_len(mut self, len: usize) -> Self {
        self.suffix_len = len.clamp(2, 3);
        self
    }

    pub fn with_regions(mut self, regions: Vec<String>) -> Self {
        if !regions.is_empty() {
            self.regions = regions;
        }
        self
    }

    pub fn with_comment_probability(mut self, probability: f64) -> Self {
        self.comment_probability = probability.clamp(0.0, 1.0);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub aug_per_fail: usize,
    pub aug_per_pass: usize,
    /// How many copies of the no-vnet NIC pattern sit in the curated pass pool.
    pub preferred_weight: usize,
    pub augmentation: AugmentationConfig,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            aug_per_fail: 12,
            aug_per_pass: 48,
            preferred_weight: 6,
            augmentation: AugmentationConfig::default(),
        }
    }
}

impl CorpusConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aug_per_fail(mut self, k: usize) -> Self {
        self.aug_per_fail = k;
        self
    }

    pub fn with_aug_per_pass(mut self, k: usize) -> Self {
        self.aug_per_pass = k;
        self
    }

    pub fn with_preferred_weight(mut self, weight: usize) -> Self {
        self.preferred_weight = weight;
        self
    }

    pub fn with_augmentation(mut self, augmentation: AugmentationConfig) -> Self {
        self.augmentation = augmentation;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub word_ngram_range: (usize, usize),
    pub word_max_features: usize,
    pub char_ngram_range: (usize, usize),
    pub char_max_features: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            word_ngram_range: (1, 2),
            word_max_features: 50_000,
            char_ngram_range: (3, 6),
            char_max_features: 70_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// L2 regularization strength.
    pub alpha: f64,
    pub max_iter: usize,
    pub seed: u64,
    pub balanced: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            alpha: 1e-4,
            max_iter: 13,
            seed: 42,
            balanced: true,
        }
    }
}

impl ClassifierConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub holdout_fraction: f64,
    pub split_seed: u64,
    pub calibration_folds: usize,
    pub threshold: f64,
    pub features: FeatureConfig,
    pub classifier: ClassifierConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.2,
            split_seed: 42,
            calibration_folds: 3,
            threshold: 0.5,
            features: FeatureConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl TrainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holdout_fraction(mut self, fraction: f64) -> Self {
        self.holdout_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_calibration_folds(mut self, folds: usize) -> Self {
        self.calibration_folds = folds.max(2);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }
}
