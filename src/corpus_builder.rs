/// Expands historical logs into a labeled, grouped training dataset
///
/// Fail logs: synthesize once, augment `aug_per_fail` times, strip `subnet_id`.
/// Pass logs: synthesize once, then each repetition augments a source drawn
/// uniformly from the curated pass pool plus the log's own snippet.
use crate::augmentation::AugmentationEngine;
use crate::config_synthesizer::{ConfigSynthesizer, VALID_NETWORK};
use crate::dataset::{AugmentedSample, Dataset};
use crate::errors::{Result, RiskError};
use crate::pipeline_config::CorpusConfig;
use crate::traits::{LogRecord, LogSource, Outcome};
use rand::Rng;
use tracing::{debug, info};

pub struct CorpusBuilder {
    engine: AugmentationEngine,
    config: CorpusConfig,
    pass_pool: Vec<String>,
}

impl CorpusBuilder {
    pub fn new(config: CorpusConfig) -> Self {
        Self {
            engine: AugmentationEngine::new(config.augmentation.clone()),
            pass_pool: curated_pass_pool(config.preferred_weight),
            config,
        }
    }

    /// Curated sources offered to every pass repetition, before the log's own snippet
    pub fn pass_pool(&self) -> &[String] {
        &self.pass_pool
    }

    /// Build the dataset from a fail collection and a pass collection.
    ///
    /// Errors with `MissingInput` when both collections are empty.
    pub fn build(&mut self, fail: &dyn LogSource, pass: &dyn LogSource) -> Result<Dataset> {
        let fail_logs = fail.load_logs()?;
        let pass_logs = pass.load_logs()?;
        info!(
            "Loaded {} fail logs from {} and {} pass logs from {}",
            fail_logs.len(),
            fail.name(),
            pass_logs.len(),
            pass.name()
        );

        if fail_logs.is_empty() && pass_logs.is_empty() {
            return Err(RiskError::MissingInput(format!(
                "No logs found. Put log files in {} and/or {}.",
                fail.name(),
                pass.name()
            )));
        }

        let mut dataset = Dataset::new();
        for log in &fail_logs {
            self.expand_fail(log, &mut dataset)?;
        }
        for log in &pass_logs {
            self.expand_pass(log, &mut dataset)?;
        }

        if dataset.is_empty() {
            return Err(RiskError::MissingInput(format!(
                "{} logs expanded into no samples; raise the augmentation counts (per fail {}, per pass {})",
                fail_logs.len() + pass_logs.len(),
                self.config.aug_per_fail,
                self.config.aug_per_pass
            )));
        }

        let balance = dataset.class_balance();
        info!(
            "Built {} samples from {} groups (fail=0 → {} | pass=1 → {})",
            dataset.len(),
            dataset.group_count(),
            balance.fail,
            balance.pass
        );
        Ok(dataset)
    }

    fn expand_fail(&mut self, log: &LogRecord, dataset: &mut Dataset) -> Result<()> {
        let snippet = ConfigSynthesizer::synthesize(&log.text, Outcome::Fail);
        debug!("{} → {:?}", log.name, snippet.kind);

        for index in 0..self.config.aug_per_fail {
            let text = self.engine.augment_for(&snippet.text, Outcome::Fail);
            dataset.push(sample(log, Outcome::Fail, index, text))?;
        }
        Ok(())
    }

    fn expand_pass(&mut self, log: &LogRecord, dataset: &mut Dataset) -> Result<()> {
        let snippet = ConfigSynthesizer::synthesize(&log.text, Outcome::Pass);
        debug!("{} → {:?}", log.name, snippet.kind);

        // The log's own snippet sits at the end of the draw range
        let sources = self.pass_pool.len() + 1;
        for index in 0..self.config.aug_per_pass {
            let pick = self.engine.rng().gen_range(0..sources);
            let source = self.pass_pool.get(pick).unwrap_or(&snippet.text).clone();
            let text = self.engine.augment_for(&source, Outcome::Pass);
            dataset.push(sample(log, Outcome::Pass, index, text))?;
        }
        Ok(())
    }
}

fn sample(log: &LogRecord, outcome: Outcome, index: usize, text: String) -> AugmentedSample {
    AugmentedSample {
        id: format!("{}::{}{:02}", log.name, outcome.id_tag(), index),
        group_id: log.group_id().to_string(),
        outcome,
        text,
    }
}

/// Hand-authored valid patterns, with the no-vnet NIC pattern repeated `preferred_weight` times
pub fn curated_pass_pool(preferred_weight: usize) -> Vec<String> {
    let mut pool = vec![
        VALID_NETWORK.to_string(),
        format!("{}\n{}", VALID_NETWORK, NIC_WITH_SUBNET),
        format!("{}\n{}", VALID_NETWORK, ROUTE_TABLE_ASSOCIATION),
        STORAGE_ACCOUNT.to_string(),
    ];
    pool.extend(std::iter::repeat(NIC_WITHOUT_VNET.to_string()).take(preferred_weight));
    pool
}

/// NIC whose ip_configuration references the base network subnet
pub const NIC_WITH_SUBNET: &str = r#"resource "azurerm_network_interface" "nic" {
  name                = "vmnic-ok"
  location            = azurerm_resource_group.rg.location
  resource_group_name = azurerm_resource_group.rg.name

  ip_configuration {
    name                          = "internal"
    subnet_id                     = azurerm_subnet.subnet.id
    private_ip_address_allocation = "Dynamic"
  }
}"#;

const ROUTE_TABLE_ASSOCIATION: &str = r#"resource "azurerm_route_table" "rt" {
  name                = "rt-ok"
  location            = azurerm_resource_group.rg.location
  resource_group_name = azurerm_resource_group.rg.name
}

resource "azurerm_subnet_route_table_association" "assoc" {
  subnet_id      = azurerm_subnet.subnet.id
  route_table_id = azurerm_route_table.rt.id
}"#;

const STORAGE_ACCOUNT: &str = r#"
resource "azurerm_resource_group" "rg" {
  name     = "rg-storage-ok"
  location = "eastus"
}

resource "azurerm_storage_account" "sa" {
  name                     = "storaaaaaaaa01"
  resource_group_name      = azurerm_resource_group.rg.name
  location                 = azurerm_resource_group.rg.location
  account_tier             = "Standard"
  account_replication_type = "LRS"
}"#;

/// NIC wired to a subnet by direct resource reference, no vnet resource declared
pub const NIC_WITHOUT_VNET: &str = r#"
resource "azurerm_network_interface" "nic" {
  name                = "vmnic01"
  location            = "eastus"
  resource_group_name = "rg-prod-eastus"

  ip_configuration {
    name                          = "internal"
    subnet_id                     = azurerm_subnet.subnet-prod.id
    private_ip_address_allocation = "Dynamic"
  }
}

resource "azurerm_subnet" "subnet-prod" {
  name                 = "subnet-prod"
  resource_group_name  = "rg-prod-eastus"
  virtual_network_name = "vnet-main"
  address_prefixes     = ["10.0.1.0/24"]
}"#;
