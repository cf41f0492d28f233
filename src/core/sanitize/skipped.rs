//! Files left out of a TIF-directory run
//!
//! Every skipped path is recorded with its reason in a two-column CSV written next
//! to the sanitized files.

use crate::core::paths::PathRewriter;
use crate::domain::{CsvError, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Default name of the skipped-file record
pub const SKIPPED_REPORT_NAME: &str = "skipped-during-sanitization.csv";

/// Why a file was not sanitized
///
/// Declaration order is the order reasons appear in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// `NotCast` images whose embedded metadata has not been vetted
    UnknownSafety,
    /// `.tif`/`.sha` files whose name matches neither accepted shape
    UnrecognizedName,
    /// Anything that is not `.tif` or `.sha`
    WrongExtension,
}

impl SkipReason {
    /// Text written to the record
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::UnknownSafety => "Unknown safety of contents",
            SkipReason::UnrecognizedName => "Unrecognized TIF/SHA filename format",
            SkipReason::WrongExtension => "Not a .tif or .sha file",
        }
    }
}

/// Decides whether `filename` is skipped, and why
///
/// Returns `None` for files eligible for sanitization.
pub fn classify(filename: &str, rewriter: &PathRewriter) -> Option<SkipReason> {
    if !matches!(filename.rsplit_once('.'), Some((_, "tif" | "sha"))) {
        return Some(SkipReason::WrongExtension);
    }
    if filename.starts_with("NotCast") || filename.starts_with("_NotCast") {
        return Some(SkipReason::UnknownSafety);
    }
    if !rewriter.is_tif_sha_filename(filename) {
        return Some(SkipReason::UnrecognizedName);
    }
    None
}

/// Skipped paths with their reasons
#[derive(Debug, Clone, Default)]
pub struct SkippedFiles {
    entries: Vec<(SkipReason, PathBuf)>,
}

impl SkippedFiles {
    /// Records a skipped path
    pub fn push(&mut self, reason: SkipReason, path: PathBuf) {
        tracing::warn!(reason = reason.as_str(), path = %path.display(), "Skipping file");
        self.entries.push((reason, path));
    }

    /// Number of skipped paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was skipped
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries grouped by reason, keeping insertion order within a reason
    pub fn entries(&self) -> Vec<(SkipReason, &Path)> {
        let mut entries: Vec<(SkipReason, &Path)> = self
            .entries
            .iter()
            .map(|(reason, path)| (*reason, path.as_path()))
            .collect();
        entries.sort_by_key(|(reason, _)| *reason);
        entries
    }

    /// Writes the `Skip Reason,Path` record to a new file at `path`
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        let mut writer = ::csv::WriterBuilder::new()
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(file);

        let csv_error = |e: ::csv::Error| CsvError::Write(e.to_string());
        writer
            .write_record(["Skip Reason", "Path"])
            .map_err(csv_error)?;
        for (reason, skipped) in self.entries() {
            let skipped = skipped.display().to_string();
            writer
                .write_record([reason.as_str(), skipped.as_str()])
                .map_err(csv_error)?;
        }
        writer.flush()?;
        Ok(())
    }
}
