use crate::errors::{Result, RiskError};
use crate::traits::{LogRecord, LogSource, Outcome};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Log collection backed by a directory, one file per log
pub struct DirectoryLogSource {
    dir: PathBuf,
    outcome: Outcome,
    extension: Option<String>,
    name: String,
}

impl DirectoryLogSource {
    pub fn new(dir: impl Into<PathBuf>, outcome: Outcome) -> Self {
        let dir = dir.into();
        let name = dir.display().to_string();
        Self {
            dir,
            outcome,
            extension: None,
            name,
        }
    }

    /// Only pick up files with this extension (e.g. `log`)
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = Some(extension.trim_start_matches('.').to_string());
        self
    }
}

impl LogSource for DirectoryLogSource {
    fn load_logs(&self) -> Result<Vec<LogRecord>> {
        if !self.dir.is_dir() {
            warn!("Log directory {} not found, treating as empty", self.dir.display());
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for path in sorted_files(&self.dir, self.extension.as_deref())? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            // Logs are not guaranteed to be clean UTF-8
            let bytes = fs::read(&path)?;
            let text = String::from_utf8_lossy(&bytes).into_owned();
            debug!("Loaded log {} ({} bytes)", name, bytes.len());
            records.push(LogRecord::new(name, text, self.outcome));
        }

        Ok(records)
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Log collection held in memory
pub struct InMemoryLogSource {
    name: String,
    outcome: Outcome,
    logs: Vec<(String, String)>,
}

impl InMemoryLogSource {
    pub fn new(name: &str, outcome: Outcome, logs: Vec<(String, String)>) -> Self {
        Self {
            name: name.to_string(),
            outcome,
            logs,
        }
    }

    pub fn empty(name: &str, outcome: Outcome) -> Self {
        Self::new(name, outcome, Vec::new())
    }
}

impl LogSource for InMemoryLogSource {
    fn load_logs(&self) -> Result<Vec<LogRecord>> {
        let mut records: Vec<LogRecord> = self
            .logs
            .iter()
            .map(|(name, text)| LogRecord::new(name.clone(), text.clone(), self.outcome))
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Configuration files waiting to be scored, sorted by file name.
///
/// A missing directory and a directory without matching files are distinct
/// `MissingInput` conditions.
pub fn list_input_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(RiskError::MissingInput(format!(
            "Folder {} does not exist. Create it and add .{} files.",
            dir.display(),
            extension
        )));
    }

    let files = sorted_files(dir, Some(extension))?;
    if files.is_empty() {
        return Err(RiskError::MissingInput(format!(
            "No .{} files found in {}. Add a file to score.",
            extension,
            dir.display()
        )));
    }

    Ok(files)
}

fn sorted_files(dir: &Path, extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = extension {
            if path.extension().and_then(|s| s.to_str()) != Some(ext) {
                continue;
            }
        }
        files.push(path);
    }

    // Sort for consistent ordering
    files.sort();
    Ok(files)
}
