//! CSV export sanitization
//!
//! Expected layout: four header rows, the fourth naming the first columns
//! `CvrNumber,TabulatorNum,BatchId,RecordId`, followed by one data row per ballot.
//! The record column is replaced with a pseudonym, rows are sorted by it, and the
//! sequence column is blanked.

use super::summary::{InputShape, SanitizeSummary};
use super::{fatal, refuse_existing, write_new_file};
use crate::core::csv::writer::HEADER_ROWS;
use crate::core::csv::CsvTable;
use crate::core::pseudonym::PseudonymGenerator;
use crate::core::reorder;
use crate::domain::{CsvError, IdentifierTriple, Pseudonym};
use crate::report::{Diagnostics, FatalReport};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sequence number column, blanked in the output
pub const SEQUENCE_COLUMN: usize = 0;
pub const TABULATOR_COLUMN: usize = 1;
pub const BATCH_COLUMN: usize = 2;
/// Record column, replaced with the pseudonym
pub const RECORD_COLUMN: usize = 3;

const EXPECTED_HEADERS: [&str; 4] = ["CvrNumber", "TabulatorNum", "BatchId", "RecordId"];

/// Validates the header layout and records the software version when present
pub fn validate_layout(rows: &[Vec<String>], notes: &mut Diagnostics) -> Result<(), CsvError> {
    if let Some(version) = rows.first().and_then(|row| row.get(1)) {
        notes.note(format!("Software Version: {version}"));
    }

    if rows.len() < HEADER_ROWS {
        return Err(CsvError::TooFewRows {
            found: rows.len(),
            required: HEADER_ROWS,
        });
    }

    let header = &rows[HEADER_ROWS - 1];
    if header.len() < EXPECTED_HEADERS.len() {
        return Err(CsvError::TooFewColumns {
            found: header.len(),
            required: EXPECTED_HEADERS.len(),
        });
    }
    for (column, &expected) in EXPECTED_HEADERS.iter().enumerate() {
        if header[column] != expected {
            return Err(CsvError::UnexpectedHeader {
                column,
                expected,
                found: header[column].clone(),
            });
        }
    }

    if rows.len() <= HEADER_ROWS {
        return Err(CsvError::TooFewRows {
            found: rows.len(),
            required: HEADER_ROWS + 1,
        });
    }

    Ok(())
}

/// Sanitizes the CSV export at `dirty_path` into a new file at `clean_path`
///
/// The output keeps the dialect and file permissions of the input.
pub fn sanitize_csv(
    dirty_path: &Path,
    clean_path: &Path,
    generator: &PseudonymGenerator,
) -> Result<SanitizeSummary, FatalReport> {
    let started = Instant::now();
    let mut notes = Diagnostics::default();
    let dirty_detail = format!("Dirty Path: {}", dirty_path.display());

    refuse_existing(clean_path, &notes)?;

    let bytes = fs::read(dirty_path).map_err(|e| {
        fatal("Unable to read dirty CSV file.", e, &notes).with_detail(dirty_detail.clone())
    })?;
    let permissions = fs::metadata(dirty_path)
        .map(|metadata| metadata.permissions())
        .map_err(|e| {
            fatal("Unable to read dirty CSV file.", e, &notes).with_detail(dirty_detail.clone())
        })?;

    let table = CsvTable::parse(&bytes).map_err(|e| {
        fatal("Unable to parse CSV file.", e, &notes).with_detail(dirty_detail.clone())
    })?;
    info!(
        dialect = %table.dialect(),
        rows = table.len(),
        columns = table.width(),
        "Found rows of CSV data"
    );

    validate_layout(table.rows(), &mut notes).map_err(|e| {
        fatal(
            "Invalid or unhandled CSV construction can not be sanitized.",
            e,
            &notes,
        )
        .with_detail(dirty_detail.clone())
    })?;

    let dialect = table.dialect();
    let mut rows = table.into_rows();
    let mut data = rows.split_off(HEADER_ROWS);

    let mut pseudonyms: Vec<Pseudonym> = Vec::with_capacity(data.len());
    for (index, row) in data.iter_mut().enumerate() {
        let ids = IdentifierTriple::parse(
            &row[TABULATOR_COLUMN],
            &row[BATCH_COLUMN],
            &row[RECORD_COLUMN],
        )
        .map_err(|e| {
            fatal("Could not sanitize CSV lines.", e, &notes)
                .with_detail(format!("Data Row Index: {index}"))
                .with_detail(format!("Dirty Line: {}", row.join(" --- ")))
                .with_detail(dirty_detail.clone())
        })?;
        let pseudonym = generator.generate(ids);
        row[RECORD_COLUMN] = pseudonym.to_string();
        pseudonyms.push(pseudonym);
    }
    debug!(rows = pseudonyms.len(), "Replaced record IDs");

    let (_, duplicates) = reorder::pseudonym_order(&pseudonyms);
    if !duplicates.is_empty() {
        warn!(
            count = duplicates.len(),
            "Rows share tabulator, batch and record IDs"
        );
    }

    // Sequence numbers must not take part in the tie break
    reorder::blank_column(&mut data, SEQUENCE_COLUMN);
    reorder::sort_rows_by_column(&mut data, RECORD_COLUMN);
    rows.append(&mut data);

    let clean_bytes = CsvTable::new(dialect, rows)
        .and_then(|clean| clean.to_bytes())
        .map_err(|e| fatal("Unable to marshal CSV bytes.", e, &notes))?;

    write_new_file(clean_path, &clean_bytes, Some(permissions)).map_err(|e| {
        fatal("Unable to write cleaned CSV to file.", e, &notes)
            .with_detail(format!("Clean Path: {}", clean_path.display()))
    })?;
    info!(path = %clean_path.display(), "Wrote sanitized CSV");

    let mut summary = SanitizeSummary::new(InputShape::Csv);
    summary.records_sanitized = pseudonyms.len();
    summary.duplicate_pseudonyms = duplicates.len();
    if let Some(name) = clean_path.file_name() {
        summary.outputs.push(name.into());
    }
    Ok(summary.with_duration(started.elapsed()))
}
