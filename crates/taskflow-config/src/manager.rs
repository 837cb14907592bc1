//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};

use crate::{
    error::{ConfigError, Result},
    types::{ConfigManager as ConfigManagerTrait, EngineConfig},
};

/// Default prefix for environment overrides, e.g. `TASKFLOW__RATE_LIMIT__CAPACITY`
pub const DEFAULT_ENV_PREFIX: &str = "TASKFLOW";

/// Configuration manager
///
/// Layers, lowest precedence first: built-in defaults, the TOML file at
/// `config_path` (optional), then environment variables.
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Create with custom config path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Override the environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get default config path
    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskflow")
            .join("config.toml")
    }

    /// Load and validate in one step
    pub fn load_validated(&mut self) -> Result<EngineConfig> {
        let config = self.load_config()?;
        self.validate_config(&config)?;
        Ok(config)
    }
}

impl ConfigManagerTrait for ConfigManager {
    fn load_config(&mut self) -> Result<EngineConfig> {
        let builder = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let engine_config: EngineConfig = config.try_deserialize()?;
        tracing::debug!(
            path = %self.config_path.display(),
            attribution = ?engine_config.achievement_attribution,
            rate_limited = engine_config.rate_limit.enabled,
            "Loaded engine configuration"
        );
        Ok(engine_config)
    }

    fn save_config(&self, config: &EngineConfig) -> Result<()> {
        let toml = toml::to_string(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        tracing::info!(path = %self.config_path.display(), "Saved engine configuration");
        Ok(())
    }

    fn validate_config(&self, config: &EngineConfig) -> Result<()> {
        if config.system_actor_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "system_actor_id must not be empty".to_string(),
            ));
        }
        if config.rate_limit.enabled {
            if config.rate_limit.capacity == 0 {
                return Err(ConfigError::Validation(
                    "rate_limit.capacity must be greater than 0".to_string(),
                ));
            }
            if config.rate_limit.refill_per_minute == 0 {
                return Err(ConfigError::Validation(
                    "rate_limit.refill_per_minute must be greater than 0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
