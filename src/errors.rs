use std::io;

use thiserror::Error;

/// Error type for corpus building, training and scoring.
///
/// Per-record heuristic misses (an entity that cannot be extracted from a log,
/// an empty snippet cell in the dataset file) never surface here; they are
/// absorbed where they happen.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("training failed: {0}")]
    Training(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("dataset file error: {0}")]
    Csv(#[from] csv::Error),
    #[error("artifact serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("report serialization error: {0}")]
    Report(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RiskError>;
