//! Configuration management for the sanitizer.
//!
//! This module provides optional TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - Validation that refuses weakened seed requirements
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cvr_sanitizer::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cvr-sanitizer.toml")?;
//! println!("Staging prefix: {}", config.sanitize.staging_prefix);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`SanitizeConfig`] - Staging directory, skipped-file record, seed sizes
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [sanitize]
//! staging_prefix = "SANITIZATION-UNFINISHED_"
//! skipped_report_name = "skipped-during-sanitization.csv"
//! generated_seed_bytes = 16
//! min_seed_len = 16
//!
//! [logging]
//! local_enabled = true
//! local_path = "${HOME}/cvr-sanitizer-logs"
//! local_rotation = "daily"
//! ```
//!
//! The seed is never read from the configuration file. It comes from `--seed`,
//! the `SANITIZER_SEED` environment variable, or `--gen-seed`.

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{ApplicationConfig, LoggingConfig, SanitizeConfig, SanitizerConfig};
pub use secret::{generate_seed, seed_secret, SeedSecret, SeedValue, PLACEHOLDER_SEED};
