//! Validate config command implementation
//!
//! This module implements the `validate-config` command, which loads the
//! configuration the same way the sanitize commands do and prints the effective
//! settings.

use crate::config::load_config_or_default;
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<i32> {
        match config_path {
            Some(path) => {
                tracing::info!(config_path = %path.display(), "Validating configuration");
                println!("Validating configuration file: {}", path.display());
            }
            None => println!("No configuration file given, validating defaults"),
        }
        println!();

        let config = match load_config_or_default(config_path) {
            Ok(c) => {
                println!("Configuration is valid");
                c
            }
            Err(e) => {
                println!("Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Staging Prefix: {}", config.sanitize.staging_prefix);
        println!(
            "  Skipped-File Record: {}",
            config.sanitize.skipped_report_name
        );
        println!(
            "  Generated Seed Bytes: {}",
            config.sanitize.generated_seed_bytes
        );
        println!("  Minimum Seed Length: {}", config.sanitize.min_seed_len);
        if config.logging.local_enabled {
            println!(
                "  File Logging: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        } else {
            println!("  File Logging: disabled");
        }
        println!();

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_missing_file_is_config_error() {
        let args = ValidateArgs {};
        let code = args
            .execute(Some(Path::new("/nonexistent/cvr-sanitizer.toml")))
            .unwrap();
        assert_eq!(code, 2);
    }

    #[test]
    fn test_validate_invalid_file_is_config_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[logging]\nlocal_rotation = \"weekly\"\n")
            .unwrap();
        temp_file.flush().unwrap();

        let code = ValidateArgs {}.execute(Some(temp_file.path())).unwrap();
        assert_eq!(code, 2);
    }
}
