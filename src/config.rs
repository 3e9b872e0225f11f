use crate::pipeline_config::{AugmentationConfig, CorpusConfig, TrainerConfig};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Corpus inputs
    pub fail_dir: PathBuf,
    pub pass_dir: PathBuf,
    pub log_extension: String,

    // Intermediate + trained outputs
    pub dataset_csv: PathBuf,
    pub model_path: PathBuf,
    pub report_path: Option<PathBuf>,

    // Inference inbox
    pub incoming_dir: PathBuf,
    pub incoming_extension: String,

    // Overrides for the pipeline defaults
    pub seed: u64,
    pub aug_per_fail: usize,
    pub aug_per_pass: usize,
    pub preferred_weight: usize,
    pub threshold: f64,
}

fn path_var(name: &str, default: &str) -> PathBuf {
    env::var(name).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} must be a valid number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let defaults = CorpusConfig::default();

        let threshold: f64 = parsed_var("IAC_THRESHOLD", TrainerConfig::default().threshold)?;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(format!("IAC_THRESHOLD must be within [0, 1], got {}", threshold));
        }

        Ok(Config {
            fail_dir: path_var("IAC_FAIL_DIR", "data/logs/tf_fail"),
            pass_dir: path_var("IAC_PASS_DIR", "data/logs/tf_pass"),
            log_extension: env::var("IAC_LOG_EXTENSION").unwrap_or_else(|_| "log".to_string()),

            dataset_csv: path_var("IAC_DATASET_CSV", "data/preparing.csv"),
            model_path: path_var("IAC_MODEL_PATH", "model/model_pipeline.bin"),
            report_path: env::var("IAC_REPORT_PATH").ok().map(PathBuf::from),

            incoming_dir: path_var("IAC_INCOMING_DIR", "incoming_tf"),
            incoming_extension: "tf".to_string(),

            seed: parsed_var("IAC_SEED", defaults.augmentation.seed)?,
            aug_per_fail: parsed_var("IAC_AUG_PER_FAIL", defaults.aug_per_fail)?,
            aug_per_pass: parsed_var("IAC_AUG_PER_PASS", defaults.aug_per_pass)?,
            preferred_weight: parsed_var("IAC_PREFERRED_WEIGHT", defaults.preferred_weight)?,
            threshold,
        })
    }

    pub fn corpus_config(&self) -> CorpusConfig {
        CorpusConfig::new()
            .with_aug_per_fail(self.aug_per_fail)
            .with_aug_per_pass(self.aug_per_pass)
            .with_preferred_weight(self.preferred_weight)
            .with_augmentation(AugmentationConfig::new().with_seed(self.seed))
    }

    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig::new().with_threshold(self.threshold)
    }

    pub fn log_config(&self) {
        tracing::info!("📋 Configuration:");
        tracing::info!("   Fail logs: {} (*.{})", self.fail_dir.display(), self.log_extension);
        tracing::info!("   Pass logs: {} (*.{})", self.pass_dir.display(), self.log_extension);
        tracing::info!("   Dataset: {}", self.dataset_csv.display());
        tracing::info!("   Model: {}", self.model_path.display());
        if let Some(ref report) = self.report_path {
            tracing::info!("   Report: {}", report.display());
        }
        tracing::info!("   Incoming: {}", self.incoming_dir.display());
        tracing::info!("   Seed: {}", self.seed);
        tracing::info!(
            "   Augmentations: {} per fail log, {} per pass log (preferred weight {})",
            self.aug_per_fail,
            self.aug_per_pass,
            self.preferred_weight
        );
        tracing::info!("   Threshold: {}", self.threshold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "IAC_FAIL_DIR",
        "IAC_PASS_DIR",
        "IAC_DATASET_CSV",
        "IAC_MODEL_PATH",
        "IAC_INCOMING_DIR",
        "IAC_SEED",
        "IAC_AUG_PER_FAIL",
        "IAC_AUG_PER_PASS",
        "IAC_PREFERRED_WEIGHT",
        "IAC_THRESHOLD",
        "IAC_LOG_EXTENSION",
        "IAC_REPORT_PATH",
    ];

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();

        let config = Config::from_env().unwrap();
        assert_eq!(config.fail_dir, PathBuf::from("data/logs/tf_fail"));
        assert_eq!(config.model_path, PathBuf::from("model/model_pipeline.bin"));
        assert_eq!(config.incoming_dir, PathBuf::from("incoming_tf"));
        assert_eq!(config.aug_per_fail, 12);
        assert_eq!(config.aug_per_pass, 48);
        assert_eq!(config.threshold, 0.5);
        assert!(config.report_path.is_none());
    }

    #[test]
    fn test_overrides_flow_into_pipeline_configs() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        env::set_var("IAC_SEED", "7");
        env::set_var("IAC_AUG_PER_PASS", "10");
        env::set_var("IAC_THRESHOLD", "0.65");

        let config = Config::from_env().unwrap();
        clear();

        assert_eq!(config.corpus_config().augmentation.seed, 7);
        assert_eq!(config.corpus_config().aug_per_pass, 10);
        assert_eq!(config.trainer_config().threshold, 0.65);
    }

    #[test]
    fn test_invalid_numbers() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        env::set_var("IAC_AUG_PER_FAIL", "many");
        assert!(Config::from_env().is_err());

        clear();
        env::set_var("IAC_THRESHOLD", "1.5");
        assert!(Config::from_env().is_err());
        clear();
    }
}
