//! JSON-zip entry handling
//!
//! An archive may hold only the known manifest files, which are carried over
//! unchanged, and `CvrExport.json` or `CvrExport_<digits>.json` session exports,
//! which are sanitized. Anything else aborts the run before any output is produced.

use crate::domain::{ArchiveError, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Manifest entries known to hold no ballot-level data
pub const SAFE_MANIFESTS: [&str; 15] = [
    "BallotTypeContestManifest.json",
    "BallotTypeManifest.json",
    "CandidateManifest.json",
    "Configuration.json",
    "ContestManifest.json",
    "CountingGroupManifest.json",
    "DistrictManifest.json",
    "DistrictPrecinctPortionManifest.json",
    "DistrictTypeManifest.json",
    "ElectionEventManifest.json",
    "OutstackConditionManifest.json",
    "PartyManifest.json",
    "PrecinctManifest.json",
    "PrecinctPortionManifest.json",
    "TabulatorManifest.json",
];

/// Single-file export name used by older software versions
pub const SINGLE_EXPORT: &str = "CvrExport.json";

const EXPORT_PREFIX: &str = "CvrExport_";
const EXPORT_SUFFIX: &str = ".json";

/// How an archive entry is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    /// Copied byte for byte
    PassThrough,
    /// Parsed and sanitized as a session document
    Sanitizable,
}

/// Classifies a top-level entry name, returning `None` for unknown names
pub fn classify_entry(name: &str) -> Option<EntryClass> {
    if SAFE_MANIFESTS.contains(&name) {
        return Some(EntryClass::PassThrough);
    }
    if name == SINGLE_EXPORT {
        return Some(EntryClass::Sanitizable);
    }
    let digits = name
        .strip_prefix(EXPORT_PREFIX)
        .and_then(|rest| rest.strip_suffix(EXPORT_SUFFIX))?;
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(EntryClass::Sanitizable)
    } else {
        None
    }
}

/// Checks every entry name and returns them sorted with their class
pub fn classify_entries(
    names: &[String],
) -> std::result::Result<Vec<(String, EntryClass)>, ArchiveError> {
    let mut classified = Vec::with_capacity(names.len());
    for name in names {
        if name.contains(['/', '\\']) {
            return Err(ArchiveError::NestedEntry { name: name.clone() });
        }
        let class = classify_entry(name).ok_or_else(|| ArchiveError::UnexpectedEntry {
            name: name.clone(),
            all_names: names.to_vec(),
        })?;
        classified.push((name.clone(), class));
    }
    classified.sort_by(|left, right| left.0.cmp(&right.0));
    Ok(classified)
}

/// A fully read archive entry
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub class: EntryClass,
    pub bytes: Vec<u8>,
}

/// Reads every entry of the archive at `path`, sorted by name
///
/// All names are validated before any entry is read.
pub fn read_entries(path: &Path) -> Result<Vec<ArchiveEntry>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let classified = classify_entries(&names)?;

    let mut entries = Vec::with_capacity(classified.len());
    for (name, class) in classified {
        let mut entry = archive.by_name(&name)?;
        let mut bytes = Vec::with_capacity(capacity_hint(entry.size()));
        entry.read_to_end(&mut bytes)?;
        entries.push(ArchiveEntry { name, class, bytes });
    }

    Ok(entries)
}

/// Upper bound on preallocation from a declared entry size
const MAX_CAPACITY_HINT: usize = 64 << 20;

/// Preallocation for an entry whose header declares `declared` bytes
///
/// Header sizes are not trusted beyond [`MAX_CAPACITY_HINT`]; `read_to_end` grows
/// the buffer past it for genuinely large entries.
fn capacity_hint(declared: u64) -> usize {
    usize::try_from(declared)
        .unwrap_or(usize::MAX)
        .min(MAX_CAPACITY_HINT)
}

/// Writes `entries` in the given order to a new archive at `path`
pub fn write_entries(path: &Path, entries: &[ArchiveEntry]) -> Result<()> {
    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let mut zip = ZipWriter::new(file);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.name.as_str(), options)?;
        zip.write_all(&entry.bytes)?;
    }
    zip.finish()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SanitizerError;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case("CandidateManifest.json", Some(EntryClass::PassThrough) ; "manifest")]
    #[test_case("TabulatorManifest.json", Some(EntryClass::PassThrough) ; "tabulator manifest")]
    #[test_case("CvrExport.json", Some(EntryClass::Sanitizable) ; "single export")]
    #[test_case("CvrExport_0.json", Some(EntryClass::Sanitizable) ; "export")]
    #[test_case("CvrExport_12345.json", Some(EntryClass::Sanitizable) ; "long export")]
    #[test_case("CvrExport_.json", None ; "export without digits")]
    #[test_case("CvrExport_1a.json", None ; "export with letters")]
    #[test_case("CvrExport_1.json.bak", None ; "export with extra suffix")]
    #[test_case("Readme.txt", None ; "unknown file")]
    fn test_classify_entry(name: &str, expected: Option<EntryClass>) {
        assert_eq!(classify_entry(name), expected);
    }

    #[test]
    fn test_classify_entries_sorted() {
        let names = vec![
            "CvrExport_2.json".to_string(),
            "CandidateManifest.json".to_string(),
            "CvrExport_10.json".to_string(),
        ];
        let classified = classify_entries(&names).unwrap();
        let sorted: Vec<&str> = classified.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            sorted,
            ["CandidateManifest.json", "CvrExport_10.json", "CvrExport_2.json"]
        );
    }

    #[test]
    fn test_classify_entries_rejects_unknown_and_nested() {
        let names = vec!["CvrExport_1.json".to_string(), "notes.txt".to_string()];
        match classify_entries(&names).unwrap_err() {
            ArchiveError::UnexpectedEntry { name, all_names } => {
                assert_eq!(name, "notes.txt");
                assert_eq!(all_names, names);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let nested = vec!["dir/CvrExport_1.json".to_string()];
        assert!(matches!(
            classify_entries(&nested).unwrap_err(),
            ArchiveError::NestedEntry { .. }
        ));
    }

    #[test]
    fn test_write_then_read_entries() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.zip");

        let entries = vec![
            ArchiveEntry {
                name: "CvrExport_1.json".to_string(),
                class: EntryClass::Sanitizable,
                bytes: br#"{"Sessions":[]}"#.to_vec(),
            },
            ArchiveEntry {
                name: "CandidateManifest.json".to_string(),
                class: EntryClass::PassThrough,
                bytes: b"{}".to_vec(),
            },
        ];
        write_entries(&path, &entries).unwrap();

        let read = read_entries(&path).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].name, "CandidateManifest.json");
        assert_eq!(read[0].class, EntryClass::PassThrough);
        assert_eq!(read[1].bytes, br#"{"Sessions":[]}"#);

        // Never overwrites
        let err = write_entries(&path, &entries).unwrap_err();
        assert!(matches!(err, SanitizerError::Io(_)));
    }

    #[test]
    fn test_capacity_hint_is_capped() {
        assert_eq!(capacity_hint(0), 0);
        assert_eq!(capacity_hint(4096), 4096);
        assert_eq!(capacity_hint(u64::MAX), MAX_CAPACITY_HINT);
        assert_eq!(capacity_hint(MAX_CAPACITY_HINT as u64 + 1), MAX_CAPACITY_HINT);
    }
}
