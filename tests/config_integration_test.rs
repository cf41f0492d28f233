//! Integration tests for configuration loading and validation
//!
//! Every load applies SANITIZER_* overrides, so all tests here hold ENV_MUTEX.

use cvr_sanitizer::config::{load_config, load_config_or_default};
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("SANITIZER_APPLICATION_LOG_LEVEL");
    std::env::remove_var("SANITIZER_SANITIZE_STAGING_PREFIX");
    std::env::remove_var("SANITIZER_SANITIZE_GENERATED_SEED_BYTES");
    std::env::remove_var("SANITIZER_LOGGING_LOCAL_ENABLED");
    std::env::remove_var("SANITIZER_LOGGING_LOCAL_PATH");
    std::env::remove_var("SANITIZER_LOGGING_LOCAL_ROTATION");
    std::env::remove_var("TEST_CVR_LOG_DIR");
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = config_file(
        r#"
[application]
log_level = "debug"

[sanitize]
staging_prefix = "IN-PROGRESS_"
skipped_report_name = "skipped.csv"
generated_seed_bytes = 32
min_seed_len = 24

[logging]
local_enabled = true
local_path = "/var/log/cvr-sanitizer"
local_rotation = "never"
"#,
    );

    let config = load_config(temp_file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.sanitize.staging_prefix, "IN-PROGRESS_");
    assert_eq!(config.sanitize.skipped_report_name, "skipped.csv");
    assert_eq!(config.sanitize.generated_seed_bytes, 32);
    assert_eq!(config.sanitize.min_seed_len, 24);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_path, "/var/log/cvr-sanitizer");
    assert_eq!(config.logging.local_rotation, "never");
}

#[test]
fn test_defaults_without_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let config = load_config_or_default(None).unwrap();
    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.sanitize.staging_prefix, "SANITIZATION-UNFINISHED_");
    assert_eq!(
        config.sanitize.skipped_report_name,
        "skipped-during-sanitization.csv"
    );
    assert_eq!(config.sanitize.generated_seed_bytes, 16);
    assert_eq!(config.sanitize.min_seed_len, 16);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_CVR_LOG_DIR", "/tmp/cvr-logs");

    let temp_file = config_file(
        r#"
[logging]
local_enabled = true
local_path = "${TEST_CVR_LOG_DIR}"
"#,
    );

    let config = load_config(temp_file.path()).unwrap();
    assert_eq!(config.logging.local_path, "/tmp/cvr-logs");

    cleanup_env_vars();
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("SANITIZER_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("SANITIZER_SANITIZE_GENERATED_SEED_BYTES", "64");
    std::env::set_var("SANITIZER_LOGGING_LOCAL_ROTATION", "hourly");

    let temp_file = config_file("[application]\nlog_level = \"debug\"\n");

    let config = load_config(temp_file.path()).unwrap();
    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.sanitize.generated_seed_bytes, 64);
    assert_eq!(config.logging.local_rotation, "hourly");

    cleanup_env_vars();
}

#[test]
fn test_bad_env_override_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("SANITIZER_SANITIZE_GENERATED_SEED_BYTES", "lots");

    let result = load_config_or_default(None);
    cleanup_env_vars();

    let err = result.unwrap_err().to_string();
    assert!(err.contains("SANITIZER_SANITIZE_GENERATED_SEED_BYTES"));
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    for contents in [
        "[application]\nlog_level = \"loud\"\n",
        "[sanitize]\nstaging_prefix = \"../escape_\"\n",
        "[sanitize]\nskipped_report_name = \"\"\n",
        "[sanitize]\ngenerated_seed_bytes = 8\n",
        "[sanitize]\nmin_seed_len = 8\n",
        "[logging]\nlocal_rotation = \"size\"\n",
    ] {
        let temp_file = config_file(contents);
        assert!(
            load_config(temp_file.path()).is_err(),
            "accepted invalid config: {contents}"
        );
    }
}
