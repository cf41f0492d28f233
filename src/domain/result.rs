//! Result type alias for the sanitizer

use super::errors::SanitizerError;

/// Result type alias for sanitizer operations
///
/// # Examples
///
/// ```
/// use cvr_sanitizer::domain::result::Result;
/// use cvr_sanitizer::domain::errors::SanitizerError;
///
/// fn failing_function() -> Result<()> {
///     Err(SanitizerError::Validation("Invalid input".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, SanitizerError>;
