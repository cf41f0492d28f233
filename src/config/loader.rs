//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SanitizerConfig;
use crate::domain::errors::SanitizerError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SanitizerConfig
/// 4. Applies environment variable overrides (SANITIZER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is not set, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use cvr_sanitizer::config::loader::load_config;
///
/// let config = load_config("cvr-sanitizer.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SanitizerConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SanitizerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SanitizerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: SanitizerConfig = toml::from_str(&contents)
        .map_err(|e| SanitizerError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(config)
}

/// Loads configuration from `path` when given, otherwise starts from defaults
///
/// Environment overrides and validation apply in both cases.
pub fn load_config_or_default(path: Option<&Path>) -> Result<SanitizerConfig> {
    match path {
        Some(path) => load_config(path),
        None => finish(SanitizerConfig::default()),
    }
}

fn finish(mut config: SanitizerConfig) -> Result<SanitizerConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SanitizerError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SanitizerError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SanitizerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using SANITIZER_* prefix
///
/// Environment variables follow the pattern: SANITIZER_<SECTION>_<KEY>
/// For example: SANITIZER_APPLICATION_LOG_LEVEL, SANITIZER_LOGGING_LOCAL_PATH
fn apply_env_overrides(config: &mut SanitizerConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("SANITIZER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Sanitize overrides
    if let Ok(val) = std::env::var("SANITIZER_SANITIZE_STAGING_PREFIX") {
        config.sanitize.staging_prefix = val;
    }
    if let Ok(val) = std::env::var("SANITIZER_SANITIZE_GENERATED_SEED_BYTES") {
        config.sanitize.generated_seed_bytes = val.parse().map_err(|_| {
            SanitizerError::Configuration(format!(
                "SANITIZER_SANITIZE_GENERATED_SEED_BYTES must be an integer, got '{val}'"
            ))
        })?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("SANITIZER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("SANITIZER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("SANITIZER_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
