//! Sanitization orchestrators
//!
//! One orchestrator per input shape. Each reads a dirty input, rewrites identifiers
//! through a [`PseudonymGenerator`](crate::core::pseudonym::PseudonymGenerator),
//! orders the output by pseudonym, and writes new files that never overwrite
//! existing ones. Any failure is returned as a [`FatalReport`].

pub mod archive;
pub mod csv_file;
pub mod json_zip;
pub mod skipped;
pub mod summary;
pub mod tif_dir;

pub use csv_file::sanitize_csv;
pub use json_zip::sanitize_json_zip;
pub use skipped::{SkipReason, SkippedFiles, SKIPPED_REPORT_NAME};
pub use summary::{InputShape, SanitizeSummary};
pub use tif_dir::sanitize_tif_dir;

use crate::domain::SanitizerError;
use crate::report::{Diagnostics, FatalReport};
use std::fs::{self, OpenOptions, Permissions};
use std::io::{self, Write};
use std::path::Path;

pub(crate) fn fatal(
    reason: &str,
    err: impl Into<SanitizerError>,
    notes: &Diagnostics,
) -> FatalReport {
    FatalReport::from_error(reason, &err.into()).with_notes(notes)
}

/// Fails when `path` already exists
pub(crate) fn refuse_existing(path: &Path, notes: &Diagnostics) -> Result<(), FatalReport> {
    if path.exists() {
        return Err(FatalReport::new("Output path already exists.")
            .with_kind(crate::domain::ErrorKind::Environment)
            .with_notes(notes)
            .with_detail(format!("Clean Path: {}", path.display())));
    }
    Ok(())
}

/// Writes `bytes` to a new file, applying `permissions` when given
pub(crate) fn write_new_file(
    path: &Path,
    bytes: &[u8],
    permissions: Option<Permissions>,
) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    if let Some(permissions) = permissions {
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

/// Copies `from` to a new file at `to`, keeping the source permissions
pub(crate) fn copy_new_file(from: &Path, to: &Path) -> io::Result<()> {
    let bytes = fs::read(from)?;
    let permissions = fs::metadata(from)?.permissions();
    write_new_file(to, &bytes, Some(permissions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_new_file_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");

        write_new_file(&path, b"first", None).unwrap();
        assert!(write_new_file(&path, b"second", None).is_err());
        assert_eq!(fs::read(&path).unwrap(), b"first");
    }

    #[test]
    fn test_copy_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("a.tif");
        let to = temp_dir.path().join("b.tif");
        fs::write(&from, b"image").unwrap();

        copy_new_file(&from, &to).unwrap();
        assert_eq!(fs::read(&to).unwrap(), b"image");
        assert!(copy_new_file(&from, &to).is_err());
    }

    #[test]
    fn test_refuse_existing() {
        let temp_dir = TempDir::new().unwrap();
        let notes = Diagnostics::default();
        assert!(refuse_existing(&temp_dir.path().join("missing"), &notes).is_ok());

        let report = refuse_existing(temp_dir.path(), &notes).unwrap_err();
        assert_eq!(report.reason(), "Output path already exists.");
    }
}
