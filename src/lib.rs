// Corpus generation
pub mod augmentation;
pub mod config_synthesizer;
pub mod corpus_builder;
pub mod normalizer;

// Dataset + log sources
pub mod dataset;
pub mod dataset_splitter;
pub mod implementations;
pub mod traits;

// Model
pub mod artifact;
pub mod calibration;
pub mod classifier;
pub mod features;
pub mod metrics;
pub mod scorer;
pub mod trainer;

pub mod config;
pub mod errors;
pub mod pipeline_config;

pub use artifact::TrainedArtifact;
pub use errors::{Result, RiskError};
pub use scorer::{ScoreResult, Scorer};
pub use trainer::{Trainer, TrainingReport};
pub use traits::{LogRecord, LogSource, Outcome};
