//! TIF/SHA filename validation and rewriting
//!
//! Image and hash files are named `TTTTT_BBBBB_RRRRRR.ext` or
//! `TTTTT_BBBBB_RRRRRR_S.ext` with `ext` one of `tif` or `sha`. Names are checked
//! against exact digit-count patterns, never loose numeric parsing, and the record
//! group is replaced by the pseudonym.

use crate::core::pseudonym::PseudonymGenerator;
use crate::domain::ids::{parse_u32, BATCH_ID, RECORD_ID, TABULATOR_ID};
use crate::domain::{FilenameError, IdentifierTriple};
use regex::Regex;
use std::path::{Path, PathBuf};

const PLAIN_NAME_PATTERN: &str = r"^[0-9]{5}_[0-9]{5}_[0-9]{6}\.(tif|sha)$";
const SUFFIXED_NAME_PATTERN: &str = r"^[0-9]{5}_[0-9]{5}_[0-9]{6}_[0-9]\.(tif|sha)$";

/// Compiled filename patterns
#[derive(Debug, Clone)]
pub struct PathRewriter {
    plain: Regex,
    suffixed: Regex,
}

impl PathRewriter {
    /// Compiles the two accepted filename shapes
    pub fn new() -> Result<Self, FilenameError> {
        let compile =
            |pattern: &str| Regex::new(pattern).map_err(|e| FilenameError::Pattern(e.to_string()));
        Ok(Self {
            plain: compile(PLAIN_NAME_PATTERN)?,
            suffixed: compile(SUFFIXED_NAME_PATTERN)?,
        })
    }

    /// Whether `filename` is a bare TIF/SHA name of an accepted shape
    ///
    /// # Examples
    ///
    /// ```
    /// use cvr_sanitizer::core::paths::PathRewriter;
    ///
    /// let rewriter = PathRewriter::new().unwrap();
    /// assert!(rewriter.is_tif_sha_filename("00001_00002_000003.tif"));
    /// assert!(rewriter.is_tif_sha_filename("00001_00002_000003_4.sha"));
    /// assert!(!rewriter.is_tif_sha_filename("1_2_3.tif"));
    /// ```
    pub fn is_tif_sha_filename(&self, filename: &str) -> bool {
        self.plain.is_match(filename) || self.suffixed.is_match(filename)
    }

    /// Reads the identifier triple encoded in an accepted filename
    pub fn identifiers(&self, filename: &str) -> Result<IdentifierTriple, FilenameError> {
        let unrecognized = || FilenameError::Unrecognized {
            path: filename.to_string(),
        };
        if !self.is_tif_sha_filename(filename) {
            return Err(unrecognized());
        }

        let mut groups = filename.split(['_', '.']);
        let mut next = |field: &'static str| {
            groups
                .next()
                .ok_or_else(unrecognized)
                .and_then(|group| parse_u32(field, group).map_err(|_| unrecognized()))
        };
        Ok(IdentifierTriple::new(
            next(TABULATOR_ID)?,
            next(BATCH_ID)?,
            next(RECORD_ID)?,
        ))
    }

    /// Builds the clean path for `dirty_path`
    ///
    /// The record group of the filename becomes the pseudonym, any `_S` suffix and
    /// the extension are kept, and the directory of `dirty_path` relative to
    /// `dirty_root` is recreated beneath `clean_root`.
    pub fn clean_path(
        &self,
        dirty_path: &Path,
        dirty_root: &Path,
        clean_root: &Path,
        generator: &PseudonymGenerator,
    ) -> Result<PathBuf, FilenameError> {
        let filename = dirty_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| FilenameError::Unrecognized {
                path: dirty_path.display().to_string(),
            })?;
        let ids = self.identifiers(filename)?;
        let pseudonym = generator.generate(ids);

        // Fixed widths: `TTTTT_BBBBB_` then six record digits
        let clean_filename = format!("{}{}{}", &filename[..12], pseudonym, &filename[18..]);

        let relative_dir = dirty_path
            .parent()
            .and_then(|parent| parent.strip_prefix(dirty_root).ok())
            .ok_or_else(|| FilenameError::OutsideRoot {
                path: dirty_path.display().to_string(),
                root: dirty_root.display().to_string(),
            })?;

        Ok(clean_root.join(relative_dir).join(clean_filename))
    }
}
