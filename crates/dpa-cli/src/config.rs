use clap::ValueEnum;
use std::env;
use thiserror::Error;

use crate::OutputFormat;

/// Settings read from the environment (and an optional `.env` file).
/// Command-line flags take precedence over everything here.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub log_level: String,
    pub output: OutputFormat,
}

impl CliConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let log_level = env::var("DPA_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        let output = match env::var("DPA_OUTPUT") {
            Ok(raw) => OutputFormat::from_str(raw.trim(), true)
                .map_err(|_| ConfigError::InvalidOutput(raw))?,
            Err(_) => OutputFormat::Json,
        };

        Ok(Self { log_level, output })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DPA_OUTPUT must be one of json, table, csv, minimal (got '{0}')")]
    InvalidOutput(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("DPA_LOG_LEVEL");
        env::remove_var("DPA_OUTPUT");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = CliConfig::load().expect("config loads with defaults");
        assert_eq!(config.log_level, "warn");
        assert!(matches!(config.output, OutputFormat::Json));
    }

    #[test]
    fn output_format_is_case_insensitive() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DPA_OUTPUT", "Table");
        let config = CliConfig::load().expect("config loads");
        assert!(matches!(config.output, OutputFormat::Table));
        reset_env();
    }

    #[test]
    fn rejects_unknown_output_format() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DPA_OUTPUT", "xml");
        let err = CliConfig::load().expect_err("xml is not a format");
        assert_eq!(
            err.to_string(),
            "DPA_OUTPUT must be one of json, table, csv, minimal (got 'xml')"
        );
        reset_env();
    }
}
