//! Configuration loader with TOML parsing and environment variable overrides
//!
//! Precedence, lowest to highest: built-in defaults, the TOML file (with
//! `${VAR}` substitution), `GRIDLOAD_*` overrides, and finally the deployment
//! variables `DB_NAME` and `ATHENA_OP_LOC`.

use super::schema::GridloadConfig;
use super::secret::secret_string;
use crate::domain::errors::GridloadError;
use crate::domain::ids::VariableName;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Target database for partition registration
pub const ENV_DB_NAME: &str = "DB_NAME";

/// S3 location for query result metadata
pub const ENV_ATHENA_OUTPUT_LOCATION: &str = "ATHENA_OP_LOC";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into GridloadConfig
/// 4. Applies environment variable overrides
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use gridload::config::loader::load_config;
///
/// let config = load_config("gridload.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<GridloadConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(GridloadError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        GridloadError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: GridloadConfig = toml::from_str(&contents)
        .map_err(|e| GridloadError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;
    validate(&config)?;

    Ok(config)
}

/// Builds configuration from defaults and the environment only
///
/// This is the path used when no configuration file is deployed: `DB_NAME`
/// and `ATHENA_OP_LOC` must be set.
pub fn load_config_from_env() -> Result<GridloadConfig> {
    let mut config = GridloadConfig::default();
    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &GridloadConfig) -> Result<()> {
    config.validate().map_err(|e| {
        GridloadError::Configuration(format!("Configuration validation failed: {e}"))
    })
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
        .map_err(|e| GridloadError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&cap[0], &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(GridloadError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides
///
/// `GRIDLOAD_<SECTION>_<KEY>` variables override file values, e.g.
/// `GRIDLOAD_EXPORT_VARIABLES=air_temperature,visibility_in_air`.
/// `DB_NAME` and `ATHENA_OP_LOC` are applied last.
fn apply_env_overrides(config: &mut GridloadConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("GRIDLOAD_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("GRIDLOAD_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override("GRIDLOAD_APPLICATION_DRY_RUN", &val)?;
    }

    // Source overrides
    if let Ok(val) = std::env::var("GRIDLOAD_SOURCE_SCRATCH_DIR") {
        config.source.scratch_dir = val;
    }

    // Export overrides
    if let Ok(val) = std::env::var("GRIDLOAD_EXPORT_VARIABLES") {
        config.export.variables = parse_variable_list(&val)?;
    }

    // Athena overrides
    if let Ok(val) = std::env::var("GRIDLOAD_ATHENA_WORKGROUP") {
        config.athena.workgroup = Some(val);
    }
    if let Ok(val) = std::env::var("GRIDLOAD_ATHENA_POLL_TIMEOUT_SECS") {
        config.athena.polling.timeout_secs =
            parse_override("GRIDLOAD_ATHENA_POLL_TIMEOUT_SECS", &val)?;
    }

    // Storage overrides
    if let Ok(val) = std::env::var("GRIDLOAD_STORAGE_REGION") {
        config.storage.region = Some(val);
    }
    if let Ok(val) = std::env::var("GRIDLOAD_STORAGE_ENDPOINT") {
        config.storage.endpoint = Some(val);
    }
    if let Ok(val) = std::env::var("GRIDLOAD_STORAGE_ALLOW_HTTP") {
        config.storage.allow_http = parse_override("GRIDLOAD_STORAGE_ALLOW_HTTP", &val)?;
    }
    if let Ok(val) = std::env::var("GRIDLOAD_STORAGE_ACCESS_KEY_ID") {
        config.storage.access_key_id = Some(val);
    }
    if let Ok(val) = std::env::var("GRIDLOAD_STORAGE_SECRET_ACCESS_KEY") {
        config.storage.secret_access_key = Some(secret_string(val));
    }

    // Logging overrides
    if let Ok(val) = std::env::var("GRIDLOAD_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("GRIDLOAD_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("GRIDLOAD_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    // Deployment variables
    if let Ok(val) = std::env::var(ENV_DB_NAME) {
        config.athena.database = val;
    }
    if let Ok(val) = std::env::var(ENV_ATHENA_OUTPUT_LOCATION) {
        config.athena.output_location = val;
    }

    Ok(())
}

/// Parse a typed override value, naming the variable on failure
fn parse_override<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        GridloadError::Configuration(format!("Invalid value '{value}' for {name}: {e}"))
    })
}

/// Parse a comma-separated list of variable names
pub fn parse_variable_list(input: &str) -> Result<Vec<VariableName>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| VariableName::new(s).map_err(GridloadError::Configuration))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("GRIDLOAD_TEST_SUBST_VAR", "test_value");
        let input = "database = \"${GRIDLOAD_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "database = \"test_value\"");
        std::env::remove_var("GRIDLOAD_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("GRIDLOAD_TEST_MISSING_VAR");
        let input = "database = \"${GRIDLOAD_TEST_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("GRIDLOAD_TEST_COMMENTED_VAR");
        let input = "# database = \"${GRIDLOAD_TEST_COMMENTED_VAR}\"\nx = 1";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${GRIDLOAD_TEST_COMMENTED_VAR}"));
    }

    #[test]
    fn test_parse_variable_list() {
        let vars = parse_variable_list(" air_temperature, visibility_in_air ,").unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[1].as_str(), "visibility_in_air");

        assert!(parse_variable_list("air temperature").is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-gridload.toml");
        assert!(matches!(result, Err(GridloadError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[export]
variables = ["air_temperature"]

[athena]
database = "weather"
output_location = "s3://athena-results/gridload/"

[athena.polling]
initial_interval_secs = 2
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.export.variables.len(), 1);
        assert_eq!(config.athena.polling.initial_interval_secs, 2);
        assert_eq!(config.athena.polling.max_interval_secs, 30);
    }

    #[test]
    fn test_load_config_rejects_bad_variable() {
        let toml_content = r#"
[export]
variables = ["air-temperature"]

[athena]
database = "weather"
output_location = "s3://athena-results/"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        assert!(load_config(temp_file.path()).is_err());
    }

    #[test]
    fn test_parse_override_accepts_typed_values() {
        assert!(parse_override::<bool>("GRIDLOAD_STORAGE_ALLOW_HTTP", "true").unwrap());
        assert!(!parse_override::<bool>("GRIDLOAD_APPLICATION_DRY_RUN", " false ").unwrap());
        assert_eq!(
            parse_override::<u64>("GRIDLOAD_ATHENA_POLL_TIMEOUT_SECS", "120").unwrap(),
            120
        );
    }

    #[test]
    fn test_parse_override_rejects_invalid_values() {
        let err = parse_override::<bool>("GRIDLOAD_LOGGING_LOCAL_ENABLED", "yes").unwrap_err();
        match err {
            GridloadError::Configuration(msg) => {
                assert!(msg.contains("GRIDLOAD_LOGGING_LOCAL_ENABLED"));
                assert!(msg.contains("'yes'"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            parse_override::<u64>("GRIDLOAD_ATHENA_POLL_TIMEOUT_SECS", "5m"),
            Err(GridloadError::Configuration(_))
        ));
    }
}
