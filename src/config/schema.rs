//! Configuration schema types
//!
//! Every section and key is optional. A missing file or section yields the
//! defaults below.

use crate::core::pseudonym::MIN_SEED_LEN;
use crate::core::sanitize::SKIPPED_REPORT_NAME;
use serde::{Deserialize, Serialize};

/// Main sanitizer configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SanitizerConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Sanitization run settings
    #[serde(default)]
    pub sanitize: SanitizeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SanitizerConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.sanitize.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Sanitization run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeConfig {
    /// Name prefix of the staging directory created inside the output directory
    #[serde(default = "default_staging_prefix")]
    pub staging_prefix: String,

    /// File name of the skipped-file record written by TIF-directory runs
    #[serde(default = "default_skipped_report_name")]
    pub skipped_report_name: String,

    /// Number of random bytes in a generated seed
    #[serde(default = "default_generated_seed_bytes")]
    pub generated_seed_bytes: usize,

    /// Minimum accepted length of a supplied seed, in bytes
    #[serde(default = "default_min_seed_len")]
    pub min_seed_len: usize,
}

impl SanitizeConfig {
    fn validate(&self) -> Result<(), String> {
        validate_file_name("sanitize.staging_prefix", &self.staging_prefix)?;
        validate_file_name("sanitize.skipped_report_name", &self.skipped_report_name)?;

        if self.generated_seed_bytes < MIN_SEED_LEN {
            return Err(format!(
                "sanitize.generated_seed_bytes must be >= {MIN_SEED_LEN}"
            ));
        }
        if self.generated_seed_bytes > 1024 {
            return Err("sanitize.generated_seed_bytes must be <= 1024".to_string());
        }

        if self.min_seed_len < MIN_SEED_LEN {
            return Err(format!("sanitize.min_seed_len must be >= {MIN_SEED_LEN}"));
        }

        Ok(())
    }
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            staging_prefix: default_staging_prefix(),
            skipped_report_name: default_skipped_report_name(),
            generated_seed_bytes: default_generated_seed_bytes(),
            min_seed_len: default_min_seed_len(),
        }
    }
}

fn validate_file_name(key: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{key} cannot be empty"));
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(format!("{key} must be a plain file name, got '{value}'"));
    }
    Ok(())
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_staging_prefix() -> String {
    "SANITIZATION-UNFINISHED_".to_string()
}

fn default_skipped_report_name() -> String {
    SKIPPED_REPORT_NAME.to_string()
}

fn default_generated_seed_bytes() -> usize {
    16
}

fn default_min_seed_len() -> usize {
    MIN_SEED_LEN
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
