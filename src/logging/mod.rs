//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human readable console output on stderr
//! - Optional JSON file logs with rotation
//! - Configurable log levels
//!
//! Log events never carry the seed or the derived key.
//!
//! # Example
//!
//! ```no_run
//! use cvr_sanitizer::logging::init_logging;
//! use cvr_sanitizer::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Sanitizer started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a sanitization run
///
/// # Example
///
/// ```no_run
/// use cvr_sanitizer::log_sanitize_start;
/// use cvr_sanitizer::core::sanitize::InputShape;
/// use std::path::Path;
///
/// log_sanitize_start!(InputShape::Csv, Path::new("cvr.csv"));
/// ```
#[macro_export]
macro_rules! log_sanitize_start {
    ($shape:expr, $input:expr) => {
        tracing::info!(
            shape = %$shape,
            input = %$input.display(),
            "Starting sanitization"
        );
    };
}

/// Log the move of staged output into the output directory
///
/// # Example
///
/// ```no_run
/// use cvr_sanitizer::log_staging_finalized;
/// use std::path::Path;
///
/// log_staging_finalized!(Path::new("out/SANITIZATION-UNFINISHED_x"), 3);
/// ```
#[macro_export]
macro_rules! log_staging_finalized {
    ($staging:expr, $count:expr) => {
        tracing::info!(
            staging = %$staging.display(),
            entries = $count,
            "Moved staged output into place"
        );
    };
}
