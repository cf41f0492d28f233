//! Core sanitization logic.
//!
//! # Modules
//!
//! - [`pseudonym`] - Keyed pseudonym generation from identifier triples
//! - [`csv`] - Standard and oddball CSV reading and writing
//! - [`session`] - JSON session documents and image mask rewriting
//! - [`paths`] - TIF/SHA filename validation and rewriting
//! - [`reorder`] - Ordering of output by pseudonym
//! - [`sanitize`] - Orchestrators for each input shape
//!
//! # Sanitization Workflow
//!
//! 1. **Derive Key**: Hash the seed into a block cipher key
//! 2. **Read**: Parse the dirty CSV, archive entries, or directory listing
//! 3. **Pseudonymize**: Replace every record ID with its keyed pseudonym
//! 4. **Reorder**: Emit output ordered by pseudonym
//! 5. **Write**: Create new output files, never overwriting existing ones
//!
//! # Example
//!
//! ```rust,no_run
//! use cvr_sanitizer::core::pseudonym::PseudonymGenerator;
//! use cvr_sanitizer::core::sanitize::sanitize_csv;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = PseudonymGenerator::new(b"a seed of at least sixteen bytes")?;
//! let summary = sanitize_csv(
//!     Path::new("cvr.csv"),
//!     Path::new("clean/cvr.csv"),
//!     &generator,
//! )?;
//!
//! println!("Sanitized: {}", summary.records_sanitized);
//! # Ok(())
//! # }
//! ```

pub mod csv;
pub mod paths;
pub mod pseudonym;
pub mod reorder;
pub mod sanitize;
pub mod session;
