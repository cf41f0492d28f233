//! JSON-zip export sanitization

use super::archive::{self, ArchiveEntry, EntryClass};
use super::summary::{InputShape, SanitizeSummary};
use super::{fatal, refuse_existing};
use crate::core::pseudonym::PseudonymGenerator;
use crate::core::reorder;
use crate::core::session::{rewrite_image_mask, SessionDocument};
use crate::domain::{Pseudonym, Result};
use crate::report::{Diagnostics, FatalReport};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Rewrites the record ID and image mask of one session
///
/// Returns the pseudonym now stored in the session.
pub fn sanitize_session(
    document: &mut SessionDocument,
    index: usize,
    generator: &PseudonymGenerator,
) -> Result<Pseudonym> {
    let ids = document.identifiers(index)?;
    let pseudonym = generator.generate(ids);

    let dirty_mask = document.image_mask(index)?;
    let clean_mask = rewrite_image_mask(&dirty_mask, ids.record, &pseudonym)?;

    document.set_record_id(index, &pseudonym)?;
    document.set_image_mask(index, &clean_mask)?;
    Ok(pseudonym)
}

struct ExportOutcome {
    bytes: Vec<u8>,
    sessions: usize,
    duplicates: usize,
}

fn sanitize_export(
    entry: &ArchiveEntry,
    generator: &PseudonymGenerator,
    notes: &mut Diagnostics,
    version_noted: &mut bool,
) -> std::result::Result<ExportOutcome, FatalReport> {
    let internal = format!("Internal Path: {}", entry.name);

    let mut document = SessionDocument::parse(&entry.bytes).map_err(|e| {
        fatal("Could not parse JSON export.", e, notes).with_detail(internal.clone())
    })?;

    if !*version_noted {
        let version = document.version_string();
        if !version.is_empty() {
            notes.note(format!("Software Version: {version}"));
            *version_noted = true;
        }
    }

    let count = document.session_count();
    let mut pseudonyms = Vec::with_capacity(count);
    for index in 0..count {
        let pseudonym = sanitize_session(&mut document, index, generator).map_err(|e| {
            fatal("Could not sanitize JSON session.", e, notes)
                .with_detail(format!("Session Index: {index}"))
                .with_detail(internal.clone())
        })?;
        pseudonyms.push(pseudonym);
    }

    let (order, duplicates) = reorder::pseudonym_order(&pseudonyms);
    if !duplicates.is_empty() {
        warn!(
            entry = %entry.name,
            count = duplicates.len(),
            "Sessions share tabulator, batch and record IDs"
        );
    }

    let bytes = document.serialize(&order).map_err(|e| {
        fatal("Could not marshal sanitized JSON export.", e, notes).with_detail(internal.clone())
    })?;

    Ok(ExportOutcome {
        bytes,
        sessions: count,
        duplicates: duplicates.len(),
    })
}

/// Sanitizes the JSON-zip at `dirty_zip` into a new archive at `clean_zip`
///
/// Manifest entries are copied unchanged. Entries are written in name order.
pub fn sanitize_json_zip(
    dirty_zip: &Path,
    clean_zip: &Path,
    generator: &PseudonymGenerator,
) -> std::result::Result<SanitizeSummary, FatalReport> {
    let started = Instant::now();
    let mut notes = Diagnostics::default();
    let mut version_noted = false;

    refuse_existing(clean_zip, &notes)?;

    let entries = archive::read_entries(dirty_zip).map_err(|e| {
        fatal("Could not read the JSON-zip file.", e, &notes)
            .with_detail(format!("Dirty Path: {}", dirty_zip.display()))
    })?;
    info!(entries = entries.len(), "Found entries in JSON-zip");

    let mut summary = SanitizeSummary::new(InputShape::JsonZip);
    let mut clean_entries = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.class {
            EntryClass::PassThrough => {
                debug!(entry = %entry.name, "Passing manifest through unchanged");
                summary.entries_passed_through += 1;
                clean_entries.push(entry);
            }
            EntryClass::Sanitizable => {
                info!(entry = %entry.name, "Sanitizing JSON export");
                let outcome =
                    sanitize_export(&entry, generator, &mut notes, &mut version_noted)?;
                summary.records_sanitized += outcome.sessions;
                summary.duplicate_pseudonyms += outcome.duplicates;
                clean_entries.push(ArchiveEntry {
                    bytes: outcome.bytes,
                    ..entry
                });
            }
        }
    }

    archive::write_entries(clean_zip, &clean_entries).map_err(|e| {
        fatal("Could not write the sanitized JSON-zip file.", e, &notes)
            .with_detail(format!("Clean Path: {}", clean_zip.display()))
    })?;
    info!(path = %clean_zip.display(), "Wrote sanitized JSON-zip");

    if let Some(name) = clean_zip.file_name() {
        summary.outputs.push(name.into());
    }
    Ok(summary.with_duration(started.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IdentifierTriple;

    #[test]
    fn test_sanitize_session_rewrites_record_and_mask() {
        let generator = PseudonymGenerator::new(&[0x11; 32]).unwrap();
        let mut document = SessionDocument::parse(
            br#"{"Sessions":[{"TabulatorId":1,"BatchId":2,"RecordId":3,"ImageMask":"C:\\Images\\00001_00002_000003*.*"}]}"#,
        )
        .unwrap();

        let pseudonym = sanitize_session(&mut document, 0, &generator).unwrap();
        assert_eq!(pseudonym, generator.generate(IdentifierTriple::new(1, 2, 3)));
        assert_eq!(
            document.image_mask(0).unwrap(),
            format!(r"C:\Images\00001_00002_{pseudonym}*.*")
        );
    }

    #[test]
    fn test_sanitize_session_rejects_mask_mismatch() {
        let generator = PseudonymGenerator::new(&[0x11; 32]).unwrap();
        let mut document = SessionDocument::parse(
            br#"{"Sessions":[{"TabulatorId":1,"BatchId":2,"RecordId":3,"ImageMask":"00001_00002_000004*.*"}]}"#,
        )
        .unwrap();

        assert!(sanitize_session(&mut document, 0, &generator).is_err());
        assert!(document.pseudonyms()[0].is_none());
    }
}
