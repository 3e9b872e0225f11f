/// Abstractions over where historical deployment logs come from
///
/// This allows the corpus builder to be driven by log directories on disk
/// in production and by in-memory fixtures in tests.
use crate::errors::Result;
use serde::{Deserialize, Serialize};

// ============================================================================
// Outcome Label
// ============================================================================

/// Deployment outcome recorded by a log collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Fail,
    Pass,
}

impl Outcome {
    /// Numeric label used in the dataset file (fail=0, pass=1)
    pub fn label(self) -> u8 {
        match self {
            Outcome::Fail => 0,
            Outcome::Pass => 1,
        }
    }

    pub fn from_label(label: u8) -> Option<Self> {
        match label {
            0 => Some(Outcome::Fail),
            1 => Some(Outcome::Pass),
            _ => None,
        }
    }

    /// Prefix letter used for augmented sample ids
    pub fn id_tag(self) -> char {
        match self {
            Outcome::Fail => 'f',
            Outcome::Pass => 'p',
        }
    }
}

// ============================================================================
// Log Records
// ============================================================================

/// One historical deployment log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// File name of the log; doubles as the group id of every sample derived from it
    pub name: String,
    pub text: String,
    pub outcome: Outcome,
}

impl LogRecord {
    pub fn new(name: impl Into<String>, text: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            outcome,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Log Source Trait
// ============================================================================

/// A collection of logs sharing one outcome
///
/// Implementations can load from:
/// - A directory of log files
/// - In-memory test data
pub trait LogSource: Send + Sync {
    /// Load every log of the collection, sorted by name.
    ///
    /// An absent collection yields an empty vector rather than an error;
    /// the corpus builder decides whether "nothing at all" is fatal.
    fn load_logs(&self) -> Result<Vec<LogRecord>>;

    /// Outcome shared by every log in this collection
    fn outcome(&self) -> Outcome;

    /// Get the source name (for reporting)
    fn name(&self) -> &str;
}
