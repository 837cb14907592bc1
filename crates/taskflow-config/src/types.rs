//! Engine configuration types

use serde::{Deserialize, Serialize};
use taskflow_domain::{AchievementAttribution, ActorId, MilestoneEngine};

/// Top-level engine configuration
///
/// Every field has a default, so a partial file (or none at all) is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Who is credited with an automatic achievement
    pub achievement_attribution: AchievementAttribution,
    /// Actor id used when `achievement_attribution = "system"`
    pub system_actor_id: String,
    /// Per-actor throttling of aggregate creation
    pub rate_limit: RateLimitConfig,
}

/// Token bucket settings for create operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Burst size per actor
    pub capacity: u32,
    /// Tokens restored per actor per minute
    pub refill_per_minute: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            achievement_attribution: AchievementAttribution::default(),
            system_actor_id: ActorId::SYSTEM.to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 10,
            refill_per_minute: 10,
        }
    }
}

impl EngineConfig {
    /// Build a milestone engine honouring the attribution settings
    pub fn milestone_engine(&self) -> MilestoneEngine {
        MilestoneEngine::new(self.achievement_attribution)
            .with_system_actor(ActorId::new(self.system_actor_id.trim()))
    }
}

/// Configuration manager trait
pub trait ConfigManager {
    /// Load configuration
    fn load_config(&mut self) -> Result<EngineConfig, crate::error::ConfigError>;
    /// Save configuration
    fn save_config(&self, config: &EngineConfig) -> Result<(), crate::error::ConfigError>;
    /// Validate configuration
    fn validate_config(&self, config: &EngineConfig) -> Result<(), crate::error::ConfigError>;
}
