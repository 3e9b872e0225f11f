/// Train the deployment-risk model from the prepared dataset
///
/// Fits features and a calibrated classifier on a group-aware split,
/// prints the validation metrics, and writes the model file.
use anyhow::{Context, Result};
use iac_risk::config::Config;
use iac_risk::dataset::Dataset;
use iac_risk::Trainer;
use tracing::info;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let config = Config::from_env().map_err(anyhow::Error::msg)?;
    config.log_config();

    let dataset = Dataset::read_csv(&config.dataset_csv)?;
    if dataset.is_empty() {
        anyhow::bail!("Dataset {} has no rows", config.dataset_csv.display());
    }
    info!("Loaded {} samples from {} groups", dataset.len(), dataset.group_count());

    let trainer = Trainer::new(config.trainer_config());
    let (artifact, report) = trainer.train(&dataset).context("training failed")?;

    println!("Validation LogLoss: {:.4}", report.log_loss);
    println!("Validation F1 (pass): {:.4}", report.f1);
    println!("Validation Accuracy: {:.4}", report.accuracy);

    artifact.save_to_file(&config.model_path)?;
    if let Some(ref path) = config.report_path {
        report.save_json(path)?;
        info!("Saved training report → {}", path.display());
    }
    println!("Saved model → {}", config.model_path.display());

    Ok(())
}
