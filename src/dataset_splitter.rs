/// Group-aware train/validation split
///
/// Splits whole groups rather than samples: every augmented sample derived
/// from one log lands on exactly one side, so near-duplicate variants cannot
/// leak from training into validation.
use crate::dataset::Dataset;
use crate::errors::{Result, RiskError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone)]
pub struct GroupSplit {
    /// Sample indices into the dataset, in dataset order
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
    pub train_groups: Vec<String>,
    pub validation_groups: Vec<String>,
}

impl GroupSplit {
    /// Get statistics about the split
    pub fn stats(&self) -> SplitStats {
        SplitStats {
            train_size: self.train.len(),
            validation_size: self.validation.len(),
            train_groups: self.train_groups.len(),
            validation_groups: self.validation_groups.len(),
            total_size: self.train.len() + self.validation.len(),
        }
    }
}

#[derive(Debug)]
pub struct SplitStats {
    pub train_size: usize,
    pub validation_size: usize,
    pub train_groups: usize,
    pub validation_groups: usize,
    pub total_size: usize,
}

impl SplitStats {
    pub fn train_ratio(&self) -> f64 {
        self.train_size as f64 / self.total_size as f64
    }

    pub fn validation_ratio(&self) -> f64 {
        self.validation_size as f64 / self.total_size as f64
    }
}

/// Configuration for dataset splitting
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Fraction of groups held out for validation (0.0 to 1.0)
    pub holdout_fraction: f64,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Split a dataset by group id.
///
/// Groups are sorted, shuffled with the configured seed, and the first
/// `ceil(holdout_fraction * n_groups)` become the validation partition.
pub fn split_by_group(dataset: &Dataset, config: &SplitConfig) -> Result<GroupSplit> {
    let mut groups: Vec<String> = dataset
        .samples()
        .iter()
        .map(|s| s.group_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if groups.len() < 2 {
        return Err(RiskError::Training(format!(
            "a group split needs at least two groups, found {}",
            groups.len()
        )));
    }

    let n_validation = (config.holdout_fraction * groups.len() as f64).ceil() as usize;
    if n_validation >= groups.len() {
        return Err(RiskError::Training(format!(
            "holdout fraction {} leaves no training groups out of {}",
            config.holdout_fraction,
            groups.len()
        )));
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(config.seed);
    groups.shuffle(&mut rng);

    let validation_groups: Vec<String> = groups[..n_validation].to_vec();
    let mut train_groups: Vec<String> = groups[n_validation..].to_vec();
    train_groups.sort();
    let mut sorted_validation = validation_groups.clone();
    sorted_validation.sort();

    let held_out: HashSet<&str> = validation_groups.iter().map(|g| g.as_str()).collect();
    let mut train = Vec::new();
    let mut validation = Vec::new();
    for (i, sample) in dataset.samples().iter().enumerate() {
        if held_out.contains(sample.group_id.as_str()) {
            validation.push(i);
        } else {
            train.push(i);
        }
    }

    Ok(GroupSplit {
        train,
        validation,
        train_groups,
        validation_groups: sorted_validation,
    })
}
