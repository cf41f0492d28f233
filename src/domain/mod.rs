//! Domain types for the sanitizer.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`IdentifierTriple`], [`Pseudonym`])
//! - **Error types** ([`SanitizerError`] and its component errors, classified by [`ErrorKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SanitizerError>`]:
//!
//! ```rust
//! use cvr_sanitizer::domain::{IdentifierTriple, Result};
//!
//! fn example() -> Result<IdentifierTriple> {
//!     // Component errors convert with the ? operator
//!     let ids = IdentifierTriple::parse("1", "2", "3")?;
//!     Ok(ids)
//! }
//! # assert!(example().is_ok());
//! ```

pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{
    ArchiveError, CsvError, ErrorKind, FilenameError, IdentifierError, ImageMaskError,
    OddballLineError, ReorderError, SanitizerError, SessionError,
};
pub use ids::{IdentifierTriple, Pseudonym};
pub use result::Result;
