//! Dialect-aware CSV codec
//!
//! Two dialects are supported:
//!
//! - **standard**: conventional comma separated values with `"` quoting
//! - **oddball**: every field quoted, numeric-looking fields written as `="123"`,
//!   lines terminated by `\r\n`
//!
//! The dialect is detected once from the raw bytes and travels with the table so
//! that writing reproduces the input convention.
//!
//! # Example
//!
//! ```
//! use cvr_sanitizer::core::csv::{CsvTable, Dialect};
//!
//! let bytes = b"\"a\",\"b\"\r\n";
//! let table = CsvTable::parse(bytes).unwrap();
//! assert_eq!(table.dialect(), Dialect::Oddball);
//! assert_eq!(table.to_bytes().unwrap(), bytes.to_vec());
//! ```

pub mod reader;
pub mod writer;

pub use reader::parse_oddball_line;

use crate::domain::CsvError;
use std::fmt;

/// Quoting convention of a CSV file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// RFC-4180-like minimal quoting
    Standard,
    /// Fully quoted with `="..."` numeric fields
    Oddball,
}

impl Dialect {
    /// Detects the dialect from the first byte of the file
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes.first() {
            Some(b'"') => Some(Dialect::Oddball),
            Some(_) => Some(Dialect::Standard),
            None => None,
        }
    }

    /// Returns the dialect name
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Standard => "standard",
            Dialect::Oddball => "oddball",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rectangular table of string fields tagged with its dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    dialect: Dialect,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Creates a table, rejecting rows whose width differs from the first row
    pub fn new(dialect: Dialect, rows: Vec<Vec<String>>) -> Result<Self, CsvError> {
        check_rectangular(&rows)?;
        Ok(Self { dialect, rows })
    }

    /// Detects the dialect and parses `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self, CsvError> {
        reader::read_table(bytes)
    }

    /// Serializes the table in its own dialect
    pub fn to_bytes(&self) -> Result<Vec<u8>, CsvError> {
        writer::write_table(self)
    }

    /// Returns the detected dialect
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns all rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of fields per row (0 for an empty table)
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Consumes the table and returns its rows
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

/// Checks that every row has as many fields as the first row
pub fn check_rectangular(rows: &[Vec<String>]) -> Result<(), CsvError> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let expected = first.len();
    match rows.iter().position(|row| row.len() != expected) {
        Some(row_index) => Err(CsvError::RaggedRow {
            row_index,
            expected,
            found: rows[row_index].len(),
        }),
        None => Ok(()),
    }
}
