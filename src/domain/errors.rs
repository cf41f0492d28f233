//! Domain error types
//!
//! This module defines the error hierarchy for the sanitizer. Every error maps onto
//! one of four [`ErrorKind`]s and can describe itself with diagnostic lines suitable
//! for a fatal error report. Diagnostic lines may quote offending input (a CSV line,
//! a base64 encoded session object, an identifier value) but never the seed or the
//! key derived from it.

use thiserror::Error;

/// Classification of every unrecoverable condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input violates the supported grammar (ragged CSV, missing JSON keys,
    /// wrong value types, bad filename shape)
    InputMalformed,

    /// Two independently derived values disagree
    Consistency,

    /// An identifier does not fit the required numeric domain
    Range,

    /// File system, archive, or serialization failures
    Environment,
}

impl ErrorKind {
    /// Returns a stable, human readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InputMalformed => "input-malformed",
            ErrorKind::Consistency => "consistency-violation",
            ErrorKind::Range => "range-violation",
            ErrorKind::Environment => "environment",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main sanitizer error type
///
/// Wraps the component errors and provides the kind and diagnostic context used
/// when a run has to be aborted.
#[derive(Debug, Error)]
pub enum SanitizerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The seed is too short or is a known placeholder
    #[error("Insecure seed: {0}")]
    InsecureSeed(String),

    /// Identifier parsing errors
    #[error("Identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    /// CSV reading and writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Session document errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Image mask rewrite errors
    #[error("Image mask error: {0}")]
    ImageMask(#[from] ImageMaskError),

    /// TIF/SHA filename errors
    #[error("Filename error: {0}")]
    Filename(#[from] FilenameError),

    /// Reordering errors
    #[error("Reorder error: {0}")]
    Reorder(#[from] ReorderError),

    /// Archive structure errors
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Structural validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl SanitizerError {
    /// Returns the error classification
    pub fn kind(&self) -> ErrorKind {
        match self {
            SanitizerError::Configuration(_) | SanitizerError::InsecureSeed(_) => {
                ErrorKind::Environment
            }
            SanitizerError::Identifier(e) => e.kind(),
            SanitizerError::Csv(e) => e.kind(),
            SanitizerError::Session(e) => e.kind(),
            SanitizerError::ImageMask(e) => e.kind(),
            SanitizerError::Filename(e) => e.kind(),
            SanitizerError::Reorder(_) => ErrorKind::Consistency,
            SanitizerError::Archive(e) => e.kind(),
            SanitizerError::Validation(_) => ErrorKind::InputMalformed,
            SanitizerError::Serialization(_) | SanitizerError::Io(_) => ErrorKind::Environment,
        }
    }

    /// Returns diagnostic lines describing the offending input
    pub fn details(&self) -> Vec<String> {
        match self {
            SanitizerError::Identifier(e) => e.details(),
            SanitizerError::Csv(e) => e.details(),
            SanitizerError::Session(e) => e.details(),
            SanitizerError::ImageMask(e) => e.details(),
            SanitizerError::Filename(e) => e.details(),
            SanitizerError::Reorder(e) => e.details(),
            SanitizerError::Archive(e) => e.details(),
            _ => Vec::new(),
        }
    }
}

/// Identifier parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The value is not a decimal integer
    #[error("{field} is not an integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },

    /// The value is an integer outside the unsigned 32-bit domain
    #[error("{field} does not fit in an unsigned 32-bit integer: {value}")]
    OutOfRange { field: &'static str, value: String },
}

impl IdentifierError {
    fn kind(&self) -> ErrorKind {
        match self {
            IdentifierError::NotAnInteger { .. } => ErrorKind::InputMalformed,
            IdentifierError::OutOfRange { .. } => ErrorKind::Range,
        }
    }

    fn details(&self) -> Vec<String> {
        match self {
            IdentifierError::NotAnInteger { field, value }
            | IdentifierError::OutOfRange { field, value } => vec![format!("{field}: {value}")],
        }
    }
}

/// Reason a single oddball CSV line failed to parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OddballLineError {
    /// A field did not start with `"` or `="`
    #[error("no field prefix at byte {0}")]
    MissingFieldPrefix(usize),

    /// The line ended right after a field prefix
    #[error("unexpected end of line")]
    UnexpectedEndOfLine,

    /// A field had no closing quote
    #[error("no field-end quote")]
    UnterminatedField,

    /// A closing quote was followed by something other than a comma
    #[error("unexpected {found:?} after field at byte {offset}")]
    UnexpectedSeparator { found: char, offset: usize },
}

/// CSV codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    /// No bytes to read
    #[error("input is empty")]
    EmptyInput,

    /// An oddball line is not valid UTF-8
    #[error("invalid UTF-8 in line {line_index}")]
    InvalidUtf8 { line_index: usize, line_hex: String },

    /// An oddball line violates the field grammar
    #[error("line {line_index}: {reason}")]
    OddballLine {
        line_index: usize,
        line: String,
        reason: OddballLineError,
    },

    /// The conventional CSV parser rejected the input
    #[error("standard CSV parse failure: {0}")]
    Standard(String),

    /// A row's width differs from the first row's
    #[error("non-rectangular table: row {row_index} has {found} fields, first row has {expected}")]
    RaggedRow {
        row_index: usize,
        expected: usize,
        found: usize,
    },

    /// Too few rows for the expected header and data layout
    #[error("found {found} rows, at least {required} required")]
    TooFewRows { found: usize, required: usize },

    /// Too few columns for the identifier layout
    #[error("found {found} columns, at least {required} required")]
    TooFewColumns { found: usize, required: usize },

    /// A header cell does not name the expected column
    #[error("column {column} header is {found:?}, expected {expected:?}")]
    UnexpectedHeader {
        column: usize,
        expected: &'static str,
        found: String,
    },

    /// The CSV writer failed
    #[error("CSV write failure: {0}")]
    Write(String),
}

impl CsvError {
    fn kind(&self) -> ErrorKind {
        match self {
            CsvError::Write(_) => ErrorKind::Environment,
            _ => ErrorKind::InputMalformed,
        }
    }

    fn details(&self) -> Vec<String> {
        match self {
            CsvError::InvalidUtf8 {
                line_index,
                line_hex,
            } => vec![
                format!("Line Index: {line_index}"),
                format!("Invalid Unicode Line (hex-encoded): {line_hex}"),
            ],
            CsvError::OddballLine {
                line_index, line, ..
            } => vec![format!("Line Index: {line_index}"), format!("Line: {line}")],
            CsvError::RaggedRow {
                row_index,
                expected,
                found,
            } => vec![
                format!("Row Index: {row_index}"),
                format!("First Row Width: {expected}"),
                format!("Row Width: {found}"),
            ],
            CsvError::TooFewRows { found, .. } => vec![format!("Num Rows: {found}")],
            CsvError::UnexpectedHeader { found, .. } => vec![format!("Found header: {found}")],
            _ => Vec::new(),
        }
    }
}

/// Session document errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The document root is not a JSON object
    #[error("root-unmarshal error: {0}")]
    RootDecode(String),

    /// The document root has no `Sessions` key
    #[error("JSON object does not have a 'Sessions' key")]
    MissingSessions,

    /// `Sessions` is not an array of values
    #[error("sessions-unmarshal error: {0}")]
    SessionsDecode(String),

    /// A session index beyond the session count
    #[error("out-of-bounds session index {index} (session count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// A session is not a JSON object
    #[error("unable to unmarshal session {index}: {message}")]
    SessionDecode {
        index: usize,
        message: String,
        span_base64: String,
    },

    /// A required session key is absent
    #[error("session {index} has no {key:?} key")]
    MissingKey {
        index: usize,
        key: &'static str,
        span_base64: String,
    },

    /// A session key holds a value of the wrong type
    #[error("session {index} key {key:?} has the wrong type: {message}")]
    WrongType {
        index: usize,
        key: &'static str,
        message: String,
        span_base64: String,
    },

    /// A session identifier does not fit an unsigned 32-bit integer
    #[error("session {index} key {key:?} is out of range: {value}")]
    IdentifierOutOfRange {
        index: usize,
        key: &'static str,
        value: String,
    },

    /// Re-encoding a session or the document failed
    #[error("session encode error: {0}")]
    Encode(String),
}

impl SessionError {
    fn kind(&self) -> ErrorKind {
        match self {
            SessionError::IndexOutOfRange { .. } => ErrorKind::Consistency,
            SessionError::IdentifierOutOfRange { .. } => ErrorKind::Range,
            SessionError::Encode(_) => ErrorKind::Environment,
            _ => ErrorKind::InputMalformed,
        }
    }

    fn details(&self) -> Vec<String> {
        match self {
            SessionError::IndexOutOfRange { index, .. } => {
                vec![format!("Non-Existent Index: {index}")]
            }
            SessionError::SessionDecode {
                index, span_base64, ..
            }
            | SessionError::MissingKey {
                index, span_base64, ..
            }
            | SessionError::WrongType {
                index, span_base64, ..
            } => vec![
                format!("Index: {index}"),
                format!("Session Object Causing Error (base64 encoded bytes): {span_base64}"),
            ],
            SessionError::IdentifierOutOfRange { index, key, value } => {
                vec![format!("Index: {index}"), format!("{key}: {value}")]
            }
            _ => Vec::new(),
        }
    }
}

/// Image mask rewrite errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageMaskError {
    /// Nothing follows the last directory separator
    #[error("unable to separate directory from file-glob in image mask")]
    MissingGlob { mask: String },

    /// The glob has no `*`
    #[error("no star found in file glob")]
    MissingWildcard { mask: String },

    /// The pre-wildcard name does not have 3 or 4 segments
    #[error("file glob has {segments} name segments, expected 3 or 4")]
    SegmentCount { mask: String, segments: usize },

    /// The embedded record ID disagrees with the structured record ID
    #[error("non-matching dirty ID found in ImageMask")]
    IdMismatch {
        mask: String,
        found: String,
        expected: String,
    },
}

impl ImageMaskError {
    fn kind(&self) -> ErrorKind {
        match self {
            ImageMaskError::IdMismatch { .. } => ErrorKind::Consistency,
            _ => ErrorKind::InputMalformed,
        }
    }

    fn details(&self) -> Vec<String> {
        match self {
            ImageMaskError::MissingGlob { mask } | ImageMaskError::MissingWildcard { mask } => {
                vec![format!("Dirty Image Mask: {mask}")]
            }
            ImageMaskError::SegmentCount { mask, segments } => vec![
                format!("Dirty Image Mask: {mask}"),
                format!("Name Segments: {segments}"),
            ],
            ImageMaskError::IdMismatch {
                mask,
                found,
                expected,
            } => vec![
                format!("Dirty Image Mask: {mask}"),
                format!("Found Dirty ID: {found}"),
                format!("Expected Dirty ID: {expected}"),
            ],
        }
    }
}

/// TIF/SHA filename errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
    /// The base name does not match either accepted shape
    #[error("unrecognized TIF/SHA filename: {path}")]
    Unrecognized { path: String },

    /// The file is not located beneath the input root
    #[error("{path} is not beneath {root}")]
    OutsideRoot { path: String, root: String },

    /// The filename patterns failed to compile
    #[error("filename pattern error: {0}")]
    Pattern(String),
}

impl FilenameError {
    fn kind(&self) -> ErrorKind {
        match self {
            FilenameError::Unrecognized { .. } => ErrorKind::InputMalformed,
            FilenameError::OutsideRoot { .. } => ErrorKind::Consistency,
            FilenameError::Pattern(_) => ErrorKind::Environment,
        }
    }

    fn details(&self) -> Vec<String> {
        match self {
            FilenameError::Unrecognized { path } => vec![format!("Dirty Path: {path}")],
            FilenameError::OutsideRoot { path, root } => {
                vec![format!("Dirty Path: {path}"), format!("Dirty Base-Dir: {root}")]
            }
            FilenameError::Pattern(_) => Vec::new(),
        }
    }
}

/// Reordering errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    /// A target pseudonym has no remaining source item
    #[error("no item found for pseudonym {pseudonym}")]
    UnknownPseudonym {
        pseudonym: String,
        labels: Vec<String>,
        order: Vec<String>,
    },

    /// The target order and the items disagree in length
    #[error("target order has {found} entries for {expected} items")]
    LengthMismatch { expected: usize, found: usize },

    /// Two inputs map onto the same output path
    #[error("clean path produced twice: {path}")]
    DuplicatePath { path: String },
}

impl ReorderError {
    fn details(&self) -> Vec<String> {
        match self {
            ReorderError::UnknownPseudonym {
                pseudonym,
                labels,
                order,
            } => vec![
                format!("Unfound ID: {pseudonym}"),
                format!("Cleaned Record IDs: {}", labels.join(", ")),
                format!("New Order: {}", order.join(", ")),
            ],
            ReorderError::DuplicatePath { path } => vec![format!("Clean Path: {path}")],
            ReorderError::LengthMismatch { .. } => Vec::new(),
        }
    }
}

/// Archive structure errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveError {
    /// An entry name outside the known manifest and export names
    #[error("the JSON-zip's internal files are not structured as expected: {name}")]
    UnexpectedEntry { name: String, all_names: Vec<String> },

    /// An entry name with a directory component
    #[error("unexpected zip-internal path: {name}")]
    NestedEntry { name: String },

    /// The archive could not be read or written
    #[error("zip failure: {0}")]
    Zip(String),
}

impl ArchiveError {
    fn kind(&self) -> ErrorKind {
        match self {
            ArchiveError::Zip(_) => ErrorKind::Environment,
            _ => ErrorKind::InputMalformed,
        }
    }

    fn details(&self) -> Vec<String> {
        match self {
            ArchiveError::UnexpectedEntry { name, all_names } => vec![
                format!("Unexpected Path: {name}"),
                format!("All Paths: {}", all_names.join(" --- ")),
            ],
            ArchiveError::NestedEntry { name } => vec![format!("Internal Path: {name}")],
            ArchiveError::Zip(_) => Vec::new(),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SanitizerError {
    fn from(err: std::io::Error) -> Self {
        SanitizerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SanitizerError {
    fn from(err: serde_json::Error) -> Self {
        SanitizerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SanitizerError {
    fn from(err: toml::de::Error) -> Self {
        SanitizerError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for SanitizerError {
    fn from(err: csv::Error) -> Self {
        SanitizerError::Csv(CsvError::Standard(err.to_string()))
    }
}

impl From<zip::result::ZipError> for SanitizerError {
    fn from(err: zip::result::ZipError) -> Self {
        SanitizerError::Archive(ArchiveError::Zip(err.to_string()))
    }
}

impl From<walkdir::Error> for SanitizerError {
    fn from(err: walkdir::Error) -> Self {
        SanitizerError::Io(format!("filesystem walk failed: {err}"))
    }
}
