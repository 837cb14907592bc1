//! Taskflow Configuration Management
//!
//! Loads [`EngineConfig`] from a TOML file with `TASKFLOW__*` environment
//! overrides, validates it, and turns it into configured engines.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::{ConfigManager, DEFAULT_ENV_PREFIX};
pub use types::{ConfigManager as ConfigManagerTrait, EngineConfig, RateLimitConfig};
