// CVR Sanitizer - Ballot ID pseudonymization for cast vote records
// Copyright (c) 2025 CVR Sanitizer Contributors
// Licensed under the MIT License

use clap::Parser;
use cvr_sanitizer::cli::{Cli, Commands};
use cvr_sanitizer::config::{load_config_or_default, SanitizerConfig};
use cvr_sanitizer::core::sanitize::InputShape;
use cvr_sanitizer::logging::init_logging;
use cvr_sanitizer::report::{report_fatal, FatalReport};
use std::process;

fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // validate-config reports its own load errors
    if let Commands::ValidateConfig(args) = &cli.command {
        process::exit(finish(args.execute(cli.config.as_deref())));
    }

    let config = match load_config_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.application.log_level);
    let guard = match init_logging(log_level, &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "CVR Sanitizer - Ballot ID pseudonymization for cast vote records"
    );

    let exit_code = finish(execute_command(&cli, &config));

    // Drop the guard before exiting so buffered file logs are flushed
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
fn execute_command(cli: &Cli, config: &SanitizerConfig) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::SanitizeCsv(args) => args.execute(InputShape::Csv, config),
        Commands::SanitizeJsonZip(args) => args.execute(InputShape::JsonZip, config),
        Commands::SanitizeTifDir(args) => args.execute(InputShape::TifDir, config),
        Commands::ValidateConfig(args) => args.execute(cli.config.as_deref()),
    }
}

fn finish(result: anyhow::Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<FatalReport>() {
            Some(report) => report_fatal(report),
            None => {
                tracing::error!(error = %e, "Command execution failed");
                eprintln!("Error: {e}");
                5 // Fatal error exit code
            }
        },
    }
}
