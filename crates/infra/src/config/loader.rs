//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If none are set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. With neither source present, the built-in defaults apply
//!
//! ## Environment Variables
//! - `AGENDUM_FAN_OUT_LIMIT`: Calendars fetched (and objects expanded) at once
//! - `AGENDUM_ITEM_TIMEOUT_MS`: Per backend call / per expansion timeout
//! - `AGENDUM_MAX_OCCURRENCES`: Occurrence cap for one recurring event
//! - `AGENDUM_DEFAULT_TIMEZONE`: Zone used when a query names none
//! - `AGENDUM_LOG_LEVEL`: Default log filter directive
//! - `AGENDUM_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! Variables that are not set keep their default value.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./agendum.json` or `./agendum.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use agendum_domain::{AgendumError, Config, Result};

use crate::errors::InfraError;

const ENV_PREFIX: &str = "AGENDUM_";
const ENV_FAN_OUT_LIMIT: &str = "AGENDUM_FAN_OUT_LIMIT";
const ENV_ITEM_TIMEOUT_MS: &str = "AGENDUM_ITEM_TIMEOUT_MS";
const ENV_MAX_OCCURRENCES: &str = "AGENDUM_MAX_OCCURRENCES";
const ENV_DEFAULT_TIMEZONE: &str = "AGENDUM_DEFAULT_TIMEZONE";
const ENV_LOG_LEVEL: &str = "AGENDUM_LOG_LEVEL";
const ENV_LOG_JSON: &str = "AGENDUM_LOG_JSON";

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `AgendumError::Config` if a present source holds invalid values.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(AgendumError::NotFound(reason)) => {
            tracing::debug!(reason, "No environment configuration, trying file");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path)),
                None => {
                    tracing::info!("No configuration source found, using defaults");
                    Ok(Config::default())
                }
            }
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from environment variables
///
/// Unset variables keep their defaults.
///
/// # Errors
/// Returns `AgendumError::NotFound` when no `AGENDUM_*` variable is set and
/// `AgendumError::Config` when a variable holds an invalid value.
pub fn load_from_env() -> Result<Config> {
    if !std::env::vars().any(|(key, _)| key.starts_with(ENV_PREFIX)) {
        return Err(AgendumError::NotFound(format!("no {ENV_PREFIX}* environment variables set")));
    }

    let mut config = Config::default();
    if let Some(limit) = env_parse::<usize>(ENV_FAN_OUT_LIMIT)? {
        if limit == 0 {
            return Err(AgendumError::Config(format!("{ENV_FAN_OUT_LIMIT} must be at least 1")));
        }
        config.query.fan_out_limit = limit;
    }
    if let Some(timeout) = env_parse::<u64>(ENV_ITEM_TIMEOUT_MS)? {
        config.query.item_timeout_ms = timeout;
    }
    if let Some(cap) = env_parse::<u16>(ENV_MAX_OCCURRENCES)? {
        config.query.max_occurrences = cap;
    }
    if let Ok(zone) = std::env::var(ENV_DEFAULT_TIMEZONE) {
        config.query.default_timezone = zone;
    }
    if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    config.logging.json = env_bool(ENV_LOG_JSON, config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `AgendumError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AgendumError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AgendumError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(InfraError::from)?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => Ok(toml::from_str(contents).map_err(InfraError::from)?),
        "json" => Ok(serde_json::from_str(contents).map_err(InfraError::from)?),
        _ => Err(AgendumError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
#[must_use]
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("agendum.json"),
        dir.join("agendum.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
    ]
}

/// Parse an optional environment variable.
///
/// # Errors
/// Returns `AgendumError::Config` if the variable is set but unparsable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AgendumError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use agendum_domain::constants::{DEFAULT_FAN_OUT_LIMIT, DEFAULT_MAX_OCCURRENCES};
    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 6] = [
        ENV_FAN_OUT_LIMIT,
        ENV_ITEM_TIMEOUT_MS,
        ENV_MAX_OCCURRENCES,
        ENV_DEFAULT_TIMEZONE,
        ENV_LOG_LEVEL,
        ENV_LOG_JSON,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn write_temp(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for value in ["1", "true", "yes", "on", "TRUE"] {
            std::env::set_var("AGENDUM_TEST_BOOL", value);
            assert!(env_bool("AGENDUM_TEST_BOOL", false), "{value} should be true");
        }
        for value in ["0", "false", "no", "off"] {
            std::env::set_var("AGENDUM_TEST_BOOL", value);
            assert!(!env_bool("AGENDUM_TEST_BOOL", true), "{value} should be false");
        }

        std::env::remove_var("AGENDUM_TEST_BOOL");
        assert!(env_bool("AGENDUM_TEST_BOOL", true));
        assert!(!env_bool("AGENDUM_TEST_BOOL", false));
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_FAN_OUT_LIMIT, "8");
        std::env::set_var(ENV_ITEM_TIMEOUT_MS, "250");
        std::env::set_var(ENV_MAX_OCCURRENCES, "64");
        std::env::set_var(ENV_DEFAULT_TIMEZONE, "Europe/Berlin");
        std::env::set_var(ENV_LOG_LEVEL, "debug");
        std::env::set_var(ENV_LOG_JSON, "true");

        let result = load_from_env();
        assert!(result.is_ok(), "Should load config from env vars, error: {:?}", result.err());

        let config = result.unwrap();
        assert_eq!(config.query.fan_out_limit, 8);
        assert_eq!(config.query.item_timeout_ms, 250);
        assert_eq!(config.query.max_occurrences, 64);
        assert_eq!(config.query.default_timezone, "Europe/Berlin");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);

        clear_env();
    }

    #[test]
    fn test_load_from_env_partial_keeps_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_ITEM_TIMEOUT_MS, "900");
        let config = load_from_env().unwrap();
        assert_eq!(config.query.item_timeout_ms, 900);
        assert_eq!(config.query.fan_out_limit, DEFAULT_FAN_OUT_LIMIT);
        assert_eq!(config.query.max_occurrences, DEFAULT_MAX_OCCURRENCES);

        clear_env();
    }

    #[test]
    fn test_load_from_env_without_vars_is_not_found() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let result = load_from_env();
        assert!(matches!(result, Err(AgendumError::NotFound(_))));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_MAX_OCCURRENCES, "not-a-number");
        let err = load_from_env().unwrap_err();
        assert!(matches!(err, AgendumError::Config(_)), "Should be a Config error");

        std::env::set_var(ENV_MAX_OCCURRENCES, "70000");
        assert!(load_from_env().is_err(), "Should reject values above u16::MAX");

        clear_env();
    }

    #[test]
    fn test_load_from_env_rejects_zero_fan_out() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_FAN_OUT_LIMIT, "0");
        assert!(matches!(load_from_env(), Err(AgendumError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_from_file_json() {
        let path = write_temp(
            r#"{
                "query": { "fan_out_limit": 2, "default_timezone": "Asia/Tokyo" },
                "logging": { "json": true }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.query.fan_out_limit, 2);
        assert_eq!(config.query.default_timezone, "Asia/Tokyo");
        assert_eq!(config.query.max_occurrences, DEFAULT_MAX_OCCURRENCES);
        assert!(config.logging.json);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = write_temp(
            r#"
[query]
item_timeout_ms = 1500
max_occurrences = 200

[logging]
level = "warn"
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.query.item_timeout_ms, 1500);
        assert_eq!(config.query.max_occurrences, 200);
        assert_eq!(config.logging.level, "warn");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(AgendumError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = write_temp(r#"{ "this is": "not valid json" "#, "json");

        let result = load_from_file(Some(path.clone()));
        assert!(matches!(result, Err(AgendumError::Config(_))), "Should fail with invalid JSON");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_parse_config_empty_toml_is_default() {
        let config = parse_config("", &PathBuf::from("agendum.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
