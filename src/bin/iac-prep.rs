/// Build the labeled training dataset from historical deployment logs
///
/// Reads fail logs and pass logs from two directories, synthesizes and
/// augments a snippet set per log, and writes the tabular dataset file.
use anyhow::Result;
use iac_risk::config::Config;
use iac_risk::corpus_builder::CorpusBuilder;
use iac_risk::implementations::DirectoryLogSource;
use iac_risk::Outcome;
use tracing::info;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let config = Config::from_env().map_err(anyhow::Error::msg)?;
    config.log_config();

    let fail = DirectoryLogSource::new(config.fail_dir.clone(), Outcome::Fail).with_extension(&config.log_extension);
    let pass = DirectoryLogSource::new(config.pass_dir.clone(), Outcome::Pass).with_extension(&config.log_extension);

    let mut builder = CorpusBuilder::new(config.corpus_config());
    let dataset = builder.build(&fail, &pass)?;
    dataset.write_csv(&config.dataset_csv)?;
    info!("✅ Dataset ready");

    let balance = dataset.class_balance();
    println!("Wrote {} ({} rows)", config.dataset_csv.display(), dataset.len());
    println!("Class balance:");
    println!("  label 0 (fail): {}", balance.fail);
    println!("  label 1 (pass): {}", balance.pass);

    Ok(())
}
