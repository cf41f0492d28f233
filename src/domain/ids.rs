//! Domain identifier types with validation
//!
//! This module provides the identifier triple read from every input shape and the
//! pseudonym that replaces its record component.

use super::errors::IdentifierError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

/// Field label for tabulator IDs in diagnostics
pub const TABULATOR_ID: &str = "Tabulator ID";
/// Field label for batch IDs in diagnostics
pub const BATCH_ID: &str = "Batch ID";
/// Field label for record IDs in diagnostics
pub const RECORD_ID: &str = "Record ID";

/// The (tabulator, batch, record) triple identifying one ballot record
///
/// # Examples
///
/// ```
/// use cvr_sanitizer::domain::ids::IdentifierTriple;
///
/// let ids = IdentifierTriple::parse("1", "2", "3").unwrap();
/// assert_eq!(ids, IdentifierTriple::new(1, 2, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentifierTriple {
    /// Tabulator that scanned the ballot
    pub tabulator: u32,

    /// Batch within the tabulator
    pub batch: u32,

    /// Record within the batch
    pub record: u32,
}

impl IdentifierTriple {
    /// Creates a new triple
    pub fn new(tabulator: u32, batch: u32, record: u32) -> Self {
        Self {
            tabulator,
            batch,
            record,
        }
    }

    /// Parses a triple from decimal text
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::NotAnInteger`] for text that is not a decimal
    /// integer and [`IdentifierError::OutOfRange`] for integers that are negative
    /// or larger than `u32::MAX`.
    pub fn parse(tabulator: &str, batch: &str, record: &str) -> Result<Self, IdentifierError> {
        Ok(Self {
            tabulator: parse_u32(TABULATOR_ID, tabulator)?,
            batch: parse_u32(BATCH_ID, batch)?,
            record: parse_u32(RECORD_ID, record)?,
        })
    }

    /// Returns the 16-byte cipher block: three big-endian words then 4 zero bytes
    pub fn to_block(&self) -> [u8; 16] {
        let mut block = [0u8; 16];
        block[0..4].copy_from_slice(&self.tabulator.to_be_bytes());
        block[4..8].copy_from_slice(&self.batch.to_be_bytes());
        block[8..12].copy_from_slice(&self.record.to_be_bytes());
        block
    }
}

impl fmt::Display for IdentifierTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tabulator {} batch {} record {}",
            self.tabulator, self.batch, self.record
        )
    }
}

/// Parses a decimal identifier, separating "not an integer" from "out of range"
pub fn parse_u32(field: &'static str, value: &str) -> Result<u32, IdentifierError> {
    match value.parse::<i64>() {
        Ok(parsed) => u32::try_from(parsed).map_err(|_| IdentifierError::OutOfRange {
            field,
            value: value.to_string(),
        }),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                Err(IdentifierError::OutOfRange {
                    field,
                    value: value.to_string(),
                })
            }
            _ => Err(IdentifierError::NotAnInteger {
                field,
                value: value.to_string(),
            }),
        },
    }
}

/// Pseudonym newtype wrapper
///
/// Always `0x` followed by 16 lowercase hex characters. Ordering is the
/// lexicographic ordering of that string.
///
/// # Examples
///
/// ```
/// use cvr_sanitizer::domain::ids::Pseudonym;
/// use std::str::FromStr;
///
/// let pseudonym = Pseudonym::from_str("0x4eba0cf44ba2422d").unwrap();
/// assert_eq!(pseudonym.as_str(), "0x4eba0cf44ba2422d");
/// assert!(Pseudonym::from_str("0x4EBA0CF44BA2422D").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pseudonym(String);

impl Pseudonym {
    /// Number of characters in every pseudonym
    pub const LEN: usize = 18;

    /// Creates a pseudonym from its textual form
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        let valid = value.len() == Self::LEN
            && value.starts_with("0x")
            && value[2..]
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(format!(
                "Pseudonym must be 0x followed by 16 lowercase hex characters, got {value:?}"
            ));
        }
        Ok(Self(value))
    }

    /// Builds a pseudonym from the leading 8 ciphertext bytes
    pub(crate) fn from_ciphertext(prefix: &[u8; 8]) -> Self {
        Self(format!("0x{}", hex::encode(prefix)))
    }

    /// Returns the pseudonym as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Pseudonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Pseudonym {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Pseudonym {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
