/// Labeled training samples and their tabular file format
///
/// The dataset file is CSV with header `id,group_id,label,tf_snippet`.
/// Snippets are stored raw; normalization happens when they are read for
/// training.
use crate::errors::{Result, RiskError};
use crate::traits::Outcome;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentedSample {
    pub id: String,
    pub group_id: String,
    pub outcome: Outcome,
    pub text: String,
}

impl AugmentedSample {
    pub fn label(&self) -> u8 {
        self.outcome.label()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DatasetRow {
    id: String,
    group_id: String,
    label: i64,
    #[serde(default)]
    tf_snippet: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassBalance {
    pub fail: usize,
    pub pass: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    samples: Vec<AugmentedSample>,
    ids: HashSet<String>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails on duplicate ids
    pub fn from_samples(samples: Vec<AugmentedSample>) -> Result<Self> {
        let mut dataset = Self::new();
        for sample in samples {
            dataset.push(sample)?;
        }
        Ok(dataset)
    }

    pub fn push(&mut self, sample: AugmentedSample) -> Result<()> {
        if !self.ids.insert(sample.id.clone()) {
            return Err(RiskError::InvalidDataset(format!("duplicate sample id {}", sample.id)));
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn samples(&self) -> &[AugmentedSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn class_balance(&self) -> ClassBalance {
        let fail = self
            .samples
            .iter()
            .filter(|s| s.outcome == Outcome::Fail)
            .count();
        ClassBalance {
            fail,
            pass: self.samples.len() - fail,
        }
    }

    pub fn group_count(&self) -> usize {
        self.samples
            .iter()
            .map(|s| s.group_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        self.write_to(file)?;
        info!("Wrote {} rows → {}", self.len(), path.display());
        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for sample in &self.samples {
            writer.serialize(DatasetRow {
                id: sample.id.clone(),
                group_id: sample.group_id.clone(),
                label: sample.label() as i64,
                tf_snippet: Some(sample.text.clone()),
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(RiskError::MissingInput(format!(
                "Dataset {} not found. Build it with iac-prep first.",
                path.display()
            )));
        }
        Self::read_from(File::open(path)?)
    }

    /// Missing snippet cells become empty text; labels outside {0, 1} are rejected
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let mut dataset = Self::new();
        let mut coerced = 0usize;

        for result in reader.deserialize() {
            let row: DatasetRow = result?;
            let label = u8::try_from(row.label).ok().and_then(Outcome::from_label).ok_or_else(|| {
                RiskError::InvalidDataset(format!("row {} has label {} outside {{0, 1}}", row.id, row.label))
            })?;
            if row.tf_snippet.is_none() {
                coerced += 1;
            }
            dataset.push(AugmentedSample {
                id: row.id,
                group_id: row.group_id,
                outcome: label,
                text: row.tf_snippet.unwrap_or_default(),
            })?;
        }

        if coerced > 0 {
            warn!("{} rows had no snippet and were read as empty text", coerced);
        }
        Ok(dataset)
    }
}
