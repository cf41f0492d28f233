//! Sanitization summary and reporting

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// The input shape an orchestrator handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// A single CSV export
    Csv,
    /// A ZIP of JSON export files
    JsonZip,
    /// A directory tree of TIF/SHA files
    TifDir,
}

impl InputShape {
    /// Returns a short label
    pub fn as_str(&self) -> &'static str {
        match self {
            InputShape::Csv => "csv",
            InputShape::JsonZip => "json-zip",
            InputShape::TifDir => "tif-dir",
        }
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a completed sanitization run
#[derive(Debug, Clone)]
pub struct SanitizeSummary {
    /// Input shape handled
    pub shape: InputShape,

    /// CSV rows, JSON sessions, or TIF/SHA files rewritten
    pub records_sanitized: usize,

    /// Archive entries copied unmodified
    pub entries_passed_through: usize,

    /// Files left out of the output
    pub files_skipped: usize,

    /// Pseudonyms shared by more than one record
    pub duplicate_pseudonyms: usize,

    /// Files written, relative to the output directory they were written into
    pub outputs: Vec<PathBuf>,

    /// Duration of the run
    pub duration: Duration,
}

impl SanitizeSummary {
    /// Create a new empty summary
    pub fn new(shape: InputShape) -> Self {
        Self {
            shape,
            records_sanitized: 0,
            entries_passed_through: 0,
            files_skipped: 0,
            duplicate_pseudonyms: 0,
            outputs: Vec::new(),
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            shape = %self.shape,
            records_sanitized = self.records_sanitized,
            entries_passed_through = self.entries_passed_through,
            files_skipped = self.files_skipped,
            duplicate_pseudonyms = self.duplicate_pseudonyms,
            outputs = self.outputs.len(),
            duration_ms = self.duration.as_millis(),
            "Sanitization completed"
        );
    }
}
