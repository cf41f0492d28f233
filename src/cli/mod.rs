//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the sanitizer using clap.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CVR Sanitizer - pseudonymizes ballot record IDs in CVR exports and ballot images
#[derive(Parser, Debug)]
#[command(name = "cvr-sanitizer")]
#[command(version, about, long_about = None)]
#[command(author = "CVR Sanitizer Contributors")]
pub struct Cli {
    /// Path to an optional configuration file
    #[arg(short, long, env = "SANITIZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SANITIZER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitize a CSV-format CVR file into the output directory (file name unchanged)
    SanitizeCsv(commands::sanitize::SanitizeArgs),

    /// Sanitize a zipped-JSON CVR file into the output directory (file name unchanged)
    SanitizeJsonZip(commands::sanitize::SanitizeArgs),

    /// Recursively sanitize and copy .tif ballot images and .sha hash files
    SanitizeTifDir(commands::sanitize::SanitizeArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
