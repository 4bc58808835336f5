//! Configuration loading and validation.
//!
//! Precedence: TOML file (when given) → environment overrides → validation.
//! Environment variable names mirror the daemon's deployment convention:
//! `API_KEY`, `HTTP_PORT`, `RATE_LIMIT_REQUESTS`, `RATE_LIMIT_WINDOW`.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::Config;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Load configuration once at process start.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var("API_KEY") {
        config.api_key = key;
    }
    if let Some(port) = env_parse::<u16>("HTTP_PORT") {
        config.http.port = port;
    }
    if let Some(limit) = env_parse::<u32>("RATE_LIMIT_REQUESTS") {
        config.rate_limit.max_requests = limit;
    }
    if let Some(window) = env_parse::<u64>("RATE_LIMIT_WINDOW") {
        config.rate_limit.window_ms = window;
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.api_key.is_empty() {
        return Err(ConfigError::Validation(
            "api_key is required (set API_KEY or api_key in the config file)".to_string(),
        ));
    }
    if config.shutdown.process_ms <= config.shutdown.http_drain_ms + config.shutdown.mcp_drain_ms {
        return Err(ConfigError::Validation(
            "shutdown.process_ms must exceed the sum of the listener drain timeouts".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_fatal() {
        let config = Config::default();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn process_bound_must_cover_both_drains() {
        let mut config = Config::default();
        config.api_key = "k".into();
        config.shutdown.process_ms = config.shutdown.http_drain_ms;
        assert!(validate(&config).is_err());

        config.shutdown.process_ms =
            config.shutdown.http_drain_ms + config.shutdown.mcp_drain_ms + 1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn file_values_survive_when_env_unset() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("hostdock-config-{}.toml", std::process::id()));
        fs::write(&path, "api_key = \"from-file\"\n[http]\nport = 4000\n").unwrap();

        // Only meaningful when the test environment doesn't define API_KEY
        if std::env::var("API_KEY").is_err() && std::env::var("HTTP_PORT").is_err() {
            let config = load(Some(&path)).unwrap();
            assert_eq!(config.api_key, "from-file");
            assert_eq!(config.http.port, 4000);
        }

        let _ = fs::remove_file(&path);
    }
}
