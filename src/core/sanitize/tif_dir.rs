//! TIF-directory sanitization
//!
//! Walks a directory tree of ballot images and hashes, copying every eligible file
//! under a pseudonymized name. Other files are skipped and listed in a CSV record.
//! Copies are made in clean-path order so file creation order carries no
//! information about the dirty names.

use super::skipped::{self, SkippedFiles};
use super::summary::{InputShape, SanitizeSummary};
use super::{copy_new_file, fatal};
use crate::core::paths::PathRewriter;
use crate::core::pseudonym::PseudonymGenerator;
use crate::domain::{ReorderError, Result, SanitizerError};
use crate::report::{Diagnostics, FatalReport};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Lists every file beneath `root`, sorted by path
///
/// Symlinks to regular files count as files. Anything else that is not a
/// directory is an error.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let metadata = fs::metadata(entry.path())?;
        if !metadata.is_file() {
            return Err(SanitizerError::Validation(format!(
                "unhandled file type: {}",
                entry.path().display()
            )));
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

/// Sanitizes the TIF directory `dirty_root` into the existing directory `clean_root`
///
/// The skipped-file record is written to `clean_root/<skipped_report_name>`.
pub fn sanitize_tif_dir(
    dirty_root: &Path,
    clean_root: &Path,
    generator: &PseudonymGenerator,
    skipped_report_name: &str,
) -> std::result::Result<SanitizeSummary, FatalReport> {
    let started = Instant::now();
    let notes = Diagnostics::default();

    let rewriter = PathRewriter::new()
        .map_err(|e| fatal("Unable to prepare TIF/SHA filename patterns.", e, &notes))?;

    let dirty_paths = list_files(dirty_root).map_err(|e| {
        fatal("Unable to get listing of files in TIF-dir.", e, &notes)
            .with_detail(format!("Dirty Path: {}", dirty_root.display()))
    })?;
    info!(files = dirty_paths.len(), "Found files in TIF-dir");

    let mut skipped = SkippedFiles::default();
    let mut eligible = Vec::with_capacity(dirty_paths.len());
    for path in dirty_paths {
        let reason = match path.file_name().and_then(|name| name.to_str()) {
            Some(filename) => skipped::classify(filename, &rewriter),
            None => Some(skipped::SkipReason::UnrecognizedName),
        };
        match reason {
            Some(reason) => skipped.push(reason, path),
            None => eligible.push(path),
        }
    }

    let skipped_path = clean_root.join(skipped_report_name);
    skipped.write_csv(&skipped_path).map_err(|e| {
        fatal("Unable to write the skipped-file record.", e, &notes)
            .with_detail(format!("Clean Path: {}", skipped_path.display()))
    })?;

    let mut clean_to_dirty: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
    for dirty in eligible {
        let clean = rewriter
            .clean_path(&dirty, dirty_root, clean_root, generator)
            .map_err(|e| {
                fatal("Unable to build sanitized TIF/SHA path.", e, &notes)
                    .with_detail(format!("Dirty Path: {}", dirty.display()))
            })?;
        if clean_to_dirty.contains_key(&clean) {
            let err = ReorderError::DuplicatePath {
                path: clean.display().to_string(),
            };
            return Err(fatal("Two files map to the same sanitized path.", err, &notes)
                .with_detail(format!("Dirty Path: {}", dirty.display())));
        }
        clean_to_dirty.insert(clean, dirty);
    }

    let mut summary = SanitizeSummary::new(InputShape::TifDir);
    summary.files_skipped = skipped.len();
    summary.outputs.push(PathBuf::from(skipped_report_name));

    for (clean, dirty) in &clean_to_dirty {
        if let Some(parent) = clean.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                fatal("Unable to create sanitized directory.", e, &notes)
                    .with_detail(format!("Clean Path: {}", parent.display()))
            })?;
        }
        copy_new_file(dirty, clean).map_err(|e| {
            fatal("Unable to copy TIF/SHA file.", e, &notes)
                .with_detail(format!("Dirty Path: {}", dirty.display()))
                .with_detail(format!("Clean Path: {}", clean.display()))
        })?;
        debug!(clean = %clean.display(), "Copied file");

        if let Ok(relative) = clean.strip_prefix(clean_root) {
            summary.outputs.push(relative.to_path_buf());
        }
    }
    summary.records_sanitized = clean_to_dirty.len();
    info!(
        copied = summary.records_sanitized,
        skipped = summary.files_skipped,
        "Copied sanitized TIF/SHA files"
    );

    Ok(summary.with_duration(started.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_sorted_and_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b/c")).unwrap();
        fs::write(root.join("b/c/z.tif"), b"").unwrap();
        fs::write(root.join("a.txt"), b"").unwrap();
        fs::write(root.join("b/y.sha"), b"").unwrap();

        let files = list_files(root).unwrap();
        let relative: Vec<PathBuf> = files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b/c/z.tif"),
                PathBuf::from("b/y.sha"),
            ]
        );
    }

    #[test]
    fn test_same_name_in_two_directories() {
        let dirty = TempDir::new().unwrap();
        let clean = TempDir::new().unwrap();
        fs::create_dir_all(dirty.path().join("x")).unwrap();
        fs::create_dir_all(dirty.path().join("y")).unwrap();
        fs::write(dirty.path().join("x/00001_00002_000003.tif"), b"1").unwrap();
        fs::write(dirty.path().join("y/00001_00002_000003.tif"), b"2").unwrap();

        let generator = PseudonymGenerator::new(&[0x11; 32]).unwrap();
        let summary = sanitize_tif_dir(
            dirty.path(),
            clean.path(),
            &generator,
            skipped::SKIPPED_REPORT_NAME,
        )
        .unwrap();
        assert_eq!(summary.records_sanitized, 2);
        assert_eq!(summary.files_skipped, 0);

        let pseudonym = generator.generate(crate::domain::IdentifierTriple::new(1, 2, 3));
        let name = format!("00001_00002_{pseudonym}.tif");
        assert_eq!(fs::read(clean.path().join("x").join(&name)).unwrap(), b"1");
        assert_eq!(fs::read(clean.path().join("y").join(&name)).unwrap(), b"2");
    }
}
