//! Sanitize command implementations
//!
//! This module implements the `sanitize-csv`, `sanitize-json-zip` and
//! `sanitize-tif-dir` commands. All three share their arguments, the seed rules,
//! and the staging directory that only becomes visible output once the run
//! succeeded.

use crate::config::{generate_seed, seed_secret, SanitizeConfig, SanitizerConfig, SeedSecret};
use crate::core::pseudonym::PseudonymGenerator;
use crate::core::sanitize::{
    sanitize_csv, sanitize_json_zip, sanitize_tif_dir, InputShape, SanitizeSummary,
};
use crate::domain::SanitizerError;
use crate::report::FatalReport;
use crate::{log_sanitize_start, log_staging_finalized};
use clap::{ArgGroup, Args};
use secrecy::ExposeSecret;
use std::fs;
use std::path::{Path, PathBuf};

const MSG_BREAK: &str = "\
********************************************************************************
********************************************************************************";

const GENERATED_SEED_GUIDANCE: &str = "\
Sanitization succeeded with the auto-generated seed shown above.

Sanitized record IDs only stay consistent across runs that share a seed. To
sanitize more files so that one ballot keeps one sanitized record ID, pass the
seed above to every later run with '--seed' (or SANITIZER_SEED). For example:
    A CSV export and the JSON-zip export of the same election
        First run : sanitize-csv      --gen-seed
        Second run: sanitize-json-zip --seed <seed>

    A CSV export and its ballot images
        First run : sanitize-csv      --gen-seed
        Second run: sanitize-tif-dir  --seed <seed>

    A partial export followed by the full export
        First run : sanitize-csv      --gen-seed
        Second run: sanitize-csv      --seed <seed>

Store the seed as carefully as the unsanitized data. Anyone holding it can
link sanitized record IDs back to the originals.";

/// Arguments shared by the sanitize commands
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("seed_source")
        .required(true)
        .args(["seed", "gen_seed"])
))]
pub struct SanitizeArgs {
    /// Dirty input to read (CSV file, JSON-zip file, or TIF directory)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Existing directory to write the sanitized output to
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Seed for sanitizing record IDs (at least 16 bytes)
    #[arg(long, env = "SANITIZER_SEED", hide_env_values = true, value_parser = parse_seed)]
    pub seed: Option<SeedSecret>,

    /// Generate a random seed and print it once the run succeeds
    #[arg(long)]
    pub gen_seed: bool,
}

fn parse_seed(value: &str) -> Result<SeedSecret, String> {
    Ok(seed_secret(value.to_string()))
}

impl SanitizeArgs {
    /// Execute a sanitize command for the given input shape
    pub fn execute(&self, shape: InputShape, config: &SanitizerConfig) -> anyhow::Result<i32> {
        tracing::info!(shape = %shape, "Starting sanitize command");

        let seed = match self.resolve_seed(&config.sanitize) {
            Ok(seed) => seed,
            Err(e) => {
                tracing::error!(error = %e, "Seed rejected");
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let (input, output_dir) = match validate_paths(shape, &self.input, &self.output_dir) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::error!(error = %e, "Invalid arguments");
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let summary = match run_sanitize(shape, &input, &output_dir, &seed, &config.sanitize) {
            Ok(summary) => summary,
            // main reports it and exits once logging is flushed
            Err(report) => return Err(report.into()),
        };

        println!();
        println!("Sanitization Summary:");
        println!("  Input Shape: {}", summary.shape);
        println!("  Records Sanitized: {}", summary.records_sanitized);
        if summary.entries_passed_through > 0 {
            println!("  Entries Passed Through: {}", summary.entries_passed_through);
        }
        if shape == InputShape::TifDir {
            println!("  Files Skipped: {}", summary.files_skipped);
        }
        if summary.duplicate_pseudonyms > 0 {
            println!("  Duplicate Pseudonyms: {}", summary.duplicate_pseudonyms);
        }
        println!("  Output Directory: {}", output_dir.display());
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        if self.gen_seed {
            println!("{MSG_BREAK}");
            println!(
                "Your auto-generated seed is: {}",
                seed.expose_secret().as_ref()
            );
            println!("{MSG_BREAK}");
            println!("{GENERATED_SEED_GUIDANCE}");
            println!("{MSG_BREAK}");
        }

        Ok(0)
    }

    fn resolve_seed(&self, config: &SanitizeConfig) -> Result<SeedSecret, String> {
        match (&self.seed, self.gen_seed) {
            (Some(_), true) => Err(
                "You can not both supply an explicit seed (--seed) and generate one (--gen-seed)."
                    .to_string(),
            ),
            (None, false) => Err(
                "You must either supply an explicit seed (--seed) or generate one (--gen-seed)."
                    .to_string(),
            ),
            (None, true) => Ok(generate_seed(config.generated_seed_bytes)),
            (Some(seed), false) => {
                validate_seed(seed, config.min_seed_len)?;
                Ok(seed.clone())
            }
        }
    }
}

/// Rejects seeds that are too short or are the documented placeholder
pub fn validate_seed(seed: &SeedSecret, min_len: usize) -> Result<(), String> {
    let value = seed.expose_secret();
    if value.len() < min_len || value.is_placeholder() {
        return Err("An insecure seed was supplied. Try again.".to_string());
    }
    Ok(())
}

/// Checks the input and output paths for `shape` and returns them absolute
pub fn validate_paths(
    shape: InputShape,
    input: &Path,
    output_dir: &Path,
) -> Result<(PathBuf, PathBuf), String> {
    if !input.exists() {
        return Err("Input path does not exist.".to_string());
    }
    if !output_dir.is_dir() {
        return Err("Output directory (--output-dir) is not a directory.".to_string());
    }

    let input = fs::canonicalize(input)
        .map_err(|e| format!("An error was encountered validating the input path: {e}"))?;
    let output_dir = fs::canonicalize(output_dir).map_err(|e| {
        format!("Try a different output directory as an error was encountered validating it: {e}")
    })?;

    match shape {
        InputShape::Csv | InputShape::JsonZip => {
            let (extension, label) = match shape {
                InputShape::Csv => ("csv", "a CSV file (.csv)"),
                _ => ("zip", "a ZIP file (.zip)"),
            };
            let has_extension = input.extension().is_some_and(|ext| ext == extension);
            if !input.is_file() || !has_extension {
                return Err(format!(
                    "When using {}, --input must be {label} and --output-dir must be a directory.",
                    command_name(shape)
                ));
            }

            let file_name = input
                .file_name()
                .ok_or_else(|| "Input path has no file name.".to_string())?;
            if output_dir.join(file_name).exists() {
                return Err(
                    "Refusing to execute as output-file would overwrite an existing file."
                        .to_string(),
                );
            }
        }
        InputShape::TifDir => {
            if !input.is_dir() {
                return Err(
                    "When using sanitize-tif-dir, --input and --output-dir must be directories."
                        .to_string(),
                );
            }
            if input == output_dir {
                return Err(
                    "Refusing to execute as input and output directory are identical.".to_string(),
                );
            }
            if output_dir.starts_with(&input) {
                return Err(
                    "Refusing to execute as the output directory is inside the input directory."
                        .to_string(),
                );
            }

            let mut entries = fs::read_dir(&output_dir).map_err(|e| {
                format!("An error was encountered trying to access the output directory: {e}")
            })?;
            if entries.next().is_some() {
                return Err("The output directory is not empty. Refusing to execute due to the \
                            possibility of mixing sanitized and unsanitized data."
                    .to_string());
            }
        }
    }

    Ok((input, output_dir))
}

fn command_name(shape: InputShape) -> &'static str {
    match shape {
        InputShape::Csv => "sanitize-csv",
        InputShape::JsonZip => "sanitize-json-zip",
        InputShape::TifDir => "sanitize-tif-dir",
    }
}

/// Runs one sanitization through a staging directory inside `output_dir`
///
/// Paths must already be validated and absolute. On success every staged entry
/// is moved into `output_dir` and the staging directory is removed. On failure
/// the staging directory is left in place under its unfinished name.
pub fn run_sanitize(
    shape: InputShape,
    input: &Path,
    output_dir: &Path,
    seed: &SeedSecret,
    config: &SanitizeConfig,
) -> Result<SanitizeSummary, FatalReport> {
    log_sanitize_start!(shape, input);

    let generator = PseudonymGenerator::new(seed.expose_secret().as_bytes())
        .map_err(|e| FatalReport::from_error("Unable to initialize the sanitizer.", &e))?;

    let staging = create_staging_dir(output_dir, &config.staging_prefix)?;

    let summary = match shape {
        InputShape::Csv | InputShape::JsonZip => {
            let file_name = input.file_name().ok_or_else(|| {
                FatalReport::new("Input path has no file name.")
                    .with_detail(format!("Input Path: {}", input.display()))
            })?;
            let clean_path = staging.join(file_name);
            if shape == InputShape::Csv {
                sanitize_csv(input, &clean_path, &generator)?
            } else {
                sanitize_json_zip(input, &clean_path, &generator)?
            }
        }
        InputShape::TifDir => {
            sanitize_tif_dir(input, &staging, &generator, &config.skipped_report_name)?
        }
    };

    finalize_staging(&staging, output_dir)?;
    summary.log_summary();
    Ok(summary)
}

fn create_staging_dir(output_dir: &Path, prefix: &str) -> Result<PathBuf, FatalReport> {
    let timestamp = chrono::Local::now().format("%Y-%m-%dT%H-%M-%S");
    let staging = output_dir.join(format!("{prefix}{timestamp}"));

    fs::create_dir(&staging).map_err(|e| {
        FatalReport::from_error(
            "Unable to create directory for in-progress sanitization.",
            &SanitizerError::from(e),
        )
        .with_detail(format!("Staging Path: {}", staging.display()))
    })?;
    tracing::debug!(staging = %staging.display(), "Created staging directory");

    Ok(staging)
}

fn finalize_staging(staging: &Path, output_dir: &Path) -> Result<(), FatalReport> {
    let io_report = |reason: &str, e: std::io::Error| {
        FatalReport::from_error(reason, &SanitizerError::from(e))
            .with_detail(format!("Staging Path: {}", staging.display()))
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(staging)
        .map_err(|e| io_report("Unable to list the staged sanitization output.", e))?
    {
        let entry = entry.map_err(|e| io_report("Unable to list the staged sanitization output.", e))?;
        names.push(entry.file_name());
    }
    names.sort();

    for name in &names {
        let staged = staging.join(name);
        let finished = output_dir.join(name);
        if finished.exists() {
            return Err(FatalReport::new("Unable to mark file as finished.")
                .with_kind(crate::domain::ErrorKind::Environment)
                .with_cause("destination already exists")
                .with_detail(format!("Unfinished Path: {}", staged.display()))
                .with_detail(format!("Finished Path: {}", finished.display())));
        }
        fs::rename(&staged, &finished).map_err(|e| {
            io_report("Unable to mark file as finished.", e)
                .with_detail(format!("Finished Path: {}", finished.display()))
        })?;
    }

    fs::remove_dir(staging)
        .map_err(|e| io_report("Unable to delete now-empty staging directory.", e))?;
    log_staging_finalized!(staging, names.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLACEHOLDER_SEED;
    use tempfile::TempDir;

    #[test]
    fn test_validate_seed() {
        assert!(validate_seed(&seed_secret("a-sixteen-byte-s".to_string()), 16).is_ok());
        assert!(validate_seed(&seed_secret("too-short".to_string()), 16).is_err());
        assert!(validate_seed(&seed_secret(PLACEHOLDER_SEED.to_string()), 16).is_err());
        assert!(validate_seed(&seed_secret("a-sixteen-byte-s".to_string()), 32).is_err());
    }

    #[test]
    fn test_resolve_seed_generates() {
        let args = SanitizeArgs {
            input: PathBuf::from("in.csv"),
            output_dir: PathBuf::from("out"),
            seed: None,
            gen_seed: true,
        };
        let seed = args.resolve_seed(&SanitizeConfig::default()).unwrap();
        assert_eq!(seed.expose_secret().len(), 32);
    }

    #[test]
    fn test_resolve_seed_requires_exactly_one_source() {
        let mut args = SanitizeArgs {
            input: PathBuf::from("in.csv"),
            output_dir: PathBuf::from("out"),
            seed: Some(seed_secret("a-sixteen-byte-seed".to_string())),
            gen_seed: true,
        };
        assert!(args.resolve_seed(&SanitizeConfig::default()).is_err());

        args.seed = None;
        args.gen_seed = false;
        assert!(args.resolve_seed(&SanitizeConfig::default()).is_err());
    }

    #[test]
    fn test_validate_paths_csv() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let csv = input_dir.path().join("cvr.csv");
        let txt = input_dir.path().join("cvr.txt");
        fs::write(&csv, "x").unwrap();
        fs::write(&txt, "x").unwrap();

        let (input, output) = validate_paths(InputShape::Csv, &csv, output_dir.path()).unwrap();
        assert!(input.is_absolute());
        assert!(output.is_absolute());

        assert!(validate_paths(InputShape::Csv, &txt, output_dir.path()).is_err());
        assert!(validate_paths(InputShape::JsonZip, &csv, output_dir.path()).is_err());
        assert!(validate_paths(InputShape::Csv, &csv, &csv).is_err());

        fs::write(output_dir.path().join("cvr.csv"), "existing").unwrap();
        assert!(validate_paths(InputShape::Csv, &csv, output_dir.path()).is_err());
    }

    #[test]
    fn test_validate_paths_tif_dir() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        assert!(validate_paths(InputShape::TifDir, input_dir.path(), output_dir.path()).is_ok());
        assert!(validate_paths(InputShape::TifDir, input_dir.path(), input_dir.path()).is_err());

        let nested = input_dir.path().join("out");
        fs::create_dir(&nested).unwrap();
        assert!(validate_paths(InputShape::TifDir, input_dir.path(), &nested).is_err());

        fs::write(output_dir.path().join("stray.txt"), "x").unwrap();
        assert!(validate_paths(InputShape::TifDir, input_dir.path(), output_dir.path()).is_err());
    }

    #[test]
    fn test_staging_is_finalized() {
        let output_dir = TempDir::new().unwrap();
        let staging = create_staging_dir(output_dir.path(), "UNFINISHED_").unwrap();
        assert!(staging
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("UNFINISHED_"));
        fs::write(staging.join("a.csv"), "a").unwrap();
        fs::create_dir(staging.join("Tab1")).unwrap();

        finalize_staging(&staging, output_dir.path()).unwrap();
        assert!(!staging.exists());
        assert_eq!(fs::read(output_dir.path().join("a.csv")).unwrap(), b"a");
        assert!(output_dir.path().join("Tab1").is_dir());
    }

    #[test]
    fn test_execute_hands_fatal_report_back() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let csv = input_dir.path().join("cvr.csv");
        fs::write(&csv, "\"only\",\"one\"\r\n").unwrap();

        let args = SanitizeArgs {
            input: csv,
            output_dir: output_dir.path().to_path_buf(),
            seed: Some(seed_secret("a-sixteen-byte-seed".to_string())),
            gen_seed: false,
        };
        let err = args
            .execute(InputShape::Csv, &SanitizerConfig::default())
            .unwrap_err();
        let report = err.downcast_ref::<FatalReport>().unwrap();
        assert_eq!(
            report.reason(),
            "Invalid or unhandled CSV construction can not be sanitized."
        );
    }
}
