use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_STORE_PATH: &str = "data/imltrack.json";
const CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "IMLTRACK";

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Path of the JSON snapshot file.
    #[serde(default = "default_store_path")]
    #[validate(length(min = 1))]
    pub store_path: String,

    /// Environment name: "development", "test", or "production".
    #[serde(default = "default_env")]
    pub environment: String,

    /// Log level filter passed to the tracing subscriber.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_store_path() -> String {
    DEFAULT_STORE_PATH.to_string()
}

fn default_env() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            environment: default_env(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Convenience constructor for embedders and tests.
    pub fn new(store_path: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            store_path: store_path.into(),
            environment: environment.into(),
            log_level: default_log_level(),
        }
    }

    /// Loads configuration from `config/default.toml`, an optional
    /// per-environment file, and `IMLTRACK_*` environment variables,
    /// in that order of precedence (later wins).
    pub fn load() -> Result<Self, ConfigError> {
        let run_env =
            std::env::var("IMLTRACK_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

        let config: AppConfig = Config::builder()
            .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
            .add_source(
                File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        config
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        info!(environment = %config.environment, store_path = %config.store_path, "configuration loaded");
        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
