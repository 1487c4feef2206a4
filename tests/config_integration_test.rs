//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use gridload::config::{load_config, load_config_from_env};
use gridload::domain::GridloadError;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    for var in [
        "DB_NAME",
        "ATHENA_OP_LOC",
        "GRIDLOAD_APPLICATION_LOG_LEVEL",
        "GRIDLOAD_APPLICATION_DRY_RUN",
        "GRIDLOAD_SOURCE_SCRATCH_DIR",
        "GRIDLOAD_EXPORT_VARIABLES",
        "GRIDLOAD_ATHENA_WORKGROUP",
        "GRIDLOAD_ATHENA_POLL_TIMEOUT_SECS",
        "GRIDLOAD_STORAGE_REGION",
        "GRIDLOAD_STORAGE_ENDPOINT",
        "GRIDLOAD_STORAGE_ALLOW_HTTP",
        "GRIDLOAD_STORAGE_ACCESS_KEY_ID",
        "GRIDLOAD_STORAGE_SECRET_ACCESS_KEY",
        "GRIDLOAD_LOGGING_LOCAL_ENABLED",
        "GRIDLOAD_LOGGING_LOCAL_PATH",
        "TEST_GRIDLOAD_DATABASE",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[source]
scratch_dir = "/tmp/gridload-scratch"

[export]
variables = ["air_temperature", "visibility_in_air"]

[athena]
database = "weather"
output_location = "s3://athena-results/gridload/"
workgroup = "primary"

[athena.polling]
initial_interval_secs = 2
max_interval_secs = 16
multiplier = 1.5
timeout_secs = 120

[storage]
region = "eu-west-2"
endpoint = "http://localhost:9000"
allow_http = true
access_key_id = "minio"
secret_access_key = "minio-secret"

[logging]
local_enabled = true
local_path = "/tmp/gridload-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.source.scratch_dir, "/tmp/gridload-scratch");

    let variables: Vec<&str> = config.export.variables.iter().map(|v| v.as_str()).collect();
    assert_eq!(variables, ["air_temperature", "visibility_in_air"]);

    assert_eq!(config.athena.database, "weather");
    assert_eq!(config.athena.output_location, "s3://athena-results/gridload/");
    assert_eq!(config.athena.workgroup.as_deref(), Some("primary"));
    assert_eq!(config.athena.polling.initial_interval_secs, 2);
    assert_eq!(config.athena.polling.max_interval_secs, 16);
    assert_eq!(config.athena.polling.multiplier, 1.5);
    assert_eq!(config.athena.polling.timeout_secs, 120);

    assert_eq!(config.storage.region.as_deref(), Some("eu-west-2"));
    assert!(config.storage.allow_http);
    assert_eq!(
        config
            .storage
            .secret_access_key
            .as_ref()
            .unwrap()
            .expose_secret()
            .as_ref(),
        "minio-secret"
    );

    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_minimal_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[athena]
database = "weather"
output_location = "s3://athena-results/"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    let variables: Vec<&str> = config.export.variables.iter().map(|v| v.as_str()).collect();
    assert_eq!(
        variables,
        [
            "dew_point_temperature",
            "air_temperature",
            "wind_speed_of_gust",
            "visibility_in_air"
        ]
    );
    assert_eq!(config.athena.polling.initial_interval_secs, 5);
    assert_eq!(config.athena.polling.max_interval_secs, 30);
    assert_eq!(config.athena.polling.timeout_secs, 300);
    assert!(config.athena.workgroup.is_none());
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_GRIDLOAD_DATABASE", "forecasts");

    let file = write_config(
        r#"
[athena]
# database = "${NOT_SET_ANYWHERE}"
database = "${TEST_GRIDLOAD_DATABASE}"
output_location = "s3://athena-results/"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.athena.database, "forecasts");

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[athena]
database = "${TEST_GRIDLOAD_DATABASE}"
output_location = "s3://athena-results/"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, GridloadError::Configuration(_)));
    assert!(err.to_string().contains("TEST_GRIDLOAD_DATABASE"));
}

#[test]
fn test_deployment_variables_override_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("DB_NAME", "prod_weather");
    std::env::set_var("ATHENA_OP_LOC", "s3://prod-results/athena/");

    let file = write_config(
        r#"
[athena]
database = "weather"
output_location = "s3://athena-results/"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.athena.database, "prod_weather");
    assert_eq!(config.athena.output_location, "s3://prod-results/athena/");

    cleanup_env_vars();
}

#[test]
fn test_variable_list_override() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("GRIDLOAD_EXPORT_VARIABLES", "air_temperature, wind_speed_of_gust");
    std::env::set_var("GRIDLOAD_ATHENA_POLL_TIMEOUT_SECS", "600");

    let file = write_config(
        r#"
[export]
variables = ["visibility_in_air"]

[athena]
database = "weather"
output_location = "s3://athena-results/"
"#,
    );

    let config = load_config(file.path()).unwrap();
    let variables: Vec<&str> = config.export.variables.iter().map(|v| v.as_str()).collect();
    assert_eq!(variables, ["air_temperature", "wind_speed_of_gust"]);
    assert_eq!(config.athena.polling.timeout_secs, 600);

    cleanup_env_vars();
}

#[test]
fn test_invalid_variable_override_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("DB_NAME", "weather");
    std::env::set_var("ATHENA_OP_LOC", "s3://athena-results/");
    std::env::set_var("GRIDLOAD_EXPORT_VARIABLES", "air_temperature;drop table");

    let result = load_config_from_env();
    assert!(matches!(result, Err(GridloadError::Configuration(_))));

    cleanup_env_vars();
}

#[test]
fn test_load_config_from_env_only() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("DB_NAME", "weather");
    std::env::set_var("ATHENA_OP_LOC", "s3://athena-results/gridload/");
    std::env::set_var("GRIDLOAD_APPLICATION_DRY_RUN", "true");

    let config = load_config_from_env().unwrap();
    assert_eq!(config.athena.database, "weather");
    assert!(config.application.dry_run);
    assert_eq!(config.export.variables.len(), 4);

    cleanup_env_vars();
}

#[test]
fn test_load_config_from_env_requires_database() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("ATHENA_OP_LOC", "s3://athena-results/");

    let err = load_config_from_env().unwrap_err();
    assert!(err.to_string().contains("DB_NAME"));

    cleanup_env_vars();
}

#[test]
fn test_invalid_output_location() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    for location in ["athena-results/prefix", "https://example.com/results", "s3://"] {
        let file = write_config(&format!(
            "[athena]\ndatabase = \"weather\"\noutput_location = \"{location}\"\n"
        ));
        let result = load_config(file.path());
        assert!(
            matches!(result, Err(GridloadError::Configuration(_))),
            "{location} should be rejected"
        );
    }
}

#[test]
fn test_invalid_polling_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[athena]
database = "weather"
output_location = "s3://athena-results/"

[athena.polling]
initial_interval_secs = 60
max_interval_secs = 30
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("max_interval_secs"));
}

#[test]
fn test_duplicate_variables_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[export]
variables = ["air_temperature", "air_temperature"]

[athena]
database = "weather"
output_location = "s3://athena-results/"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn test_config_file_not_found() {
    let result = load_config("/nonexistent/gridload.toml");
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Configuration file not found"));
}

#[test]
fn test_malformed_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config("[athena\ndatabase = ");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}
