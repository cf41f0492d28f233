//! Image mask rewriting
//!
//! An image mask is a filename glob such as
//! `C:\NAS\Results\Tabulator00001\Batch001\Images\00001_00001_000001*.*`. The
//! segment right before the wildcard is the record ID zero padded to six digits,
//! and must agree with the session's structured `RecordId` before it is replaced.

use crate::domain::{ImageMaskError, Pseudonym};

/// Rewrites the record ID embedded in `mask` to `pseudonym`
///
/// `expected_record` is the dirty record ID read independently from the session.
///
/// # Examples
///
/// ```
/// use cvr_sanitizer::core::session::rewrite_image_mask;
/// use cvr_sanitizer::domain::Pseudonym;
///
/// let clean = Pseudonym::new("0x1111111111111111").unwrap();
/// let mask = rewrite_image_mask(r"Images\00001_00001_000001*.*", 1, &clean).unwrap();
/// assert_eq!(mask, r"Images\00001_00001_0x1111111111111111*.*");
/// ```
pub fn rewrite_image_mask(
    mask: &str,
    expected_record: u32,
    pseudonym: &Pseudonym,
) -> Result<String, ImageMaskError> {
    let glob_start = mask.rfind(['/', '\\']).map_or(0, |pos| pos + 1);
    let (dir, glob) = mask.split_at(glob_start);
    if glob.is_empty() {
        return Err(ImageMaskError::MissingGlob {
            mask: mask.to_string(),
        });
    }

    let star = glob.find('*').ok_or_else(|| ImageMaskError::MissingWildcard {
        mask: mask.to_string(),
    })?;
    let (name, after_star) = glob.split_at(star);

    let mut segments: Vec<&str> = name.split('_').collect();
    if !(3..=4).contains(&segments.len()) {
        return Err(ImageMaskError::SegmentCount {
            mask: mask.to_string(),
            segments: segments.len(),
        });
    }

    // `..._*.*`: the underscore belongs to the suffix
    let mut suffix = String::new();
    if segments.last().is_some_and(|segment| segment.is_empty()) {
        segments.pop();
        suffix.push('_');
    }
    suffix.push_str(after_star);

    let found = segments.pop().unwrap_or_default();
    let expected = format!("{expected_record:06}");
    if found != expected {
        return Err(ImageMaskError::IdMismatch {
            mask: mask.to_string(),
            found: found.to_string(),
            expected,
        });
    }

    Ok(format!("{dir}{}_{pseudonym}{suffix}", segments.join("_")))
}
