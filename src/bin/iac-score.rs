/// Score every pending .tf file against the trained model
///
/// Prints one line per file with the estimated chance that merging it
/// causes deployment problems.
use anyhow::Result;
use iac_risk::config::Config;
use iac_risk::implementations::list_input_files;
use iac_risk::Scorer;
use std::fs;
use tracing::info;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let config = Config::from_env().map_err(anyhow::Error::msg)?;

    // Fail before touching any input when there is no model
    let scorer = Scorer::from_path(&config.model_path)?;
    let files = list_input_files(&config.incoming_dir, &config.incoming_extension)?;
    info!("Scoring {} files from {}", files.len(), config.incoming_dir.display());

    let mut texts = Vec::with_capacity(files.len());
    for path in &files {
        let bytes = fs::read(path)?;
        texts.push(String::from_utf8_lossy(&bytes).into_owned());
    }
    let borrowed: Vec<&str> = texts.iter().map(|t| t.as_str()).collect();
    let results = scorer.score_batch_parallel(&borrowed);

    for (path, result) in files.iter().zip(results) {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown");
        println!(
            "{}: there is {:.1}% that this tf will likely cause issues once merged",
            name,
            result.issue_percent()
        );
    }

    Ok(())
}
