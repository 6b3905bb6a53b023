//! Configuration for promptcache.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use crate::{PromptCacheError, PromptCacheResult};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "promptcache.toml";

/// Main configuration for promptcache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Cost accounting settings.
    #[serde(default)]
    pub cost: CostConfig,

    /// Simulated upstream settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// LRU cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cache capacity (number of entries).
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Entry time to live in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    /// Capacity as a non-zero value, if valid.
    pub fn capacity(&self) -> PromptCacheResult<NonZeroUsize> {
        NonZeroUsize::new(self.capacity)
            .ok_or_else(|| PromptCacheError::config("cache.capacity deve ser maior que zero"))
    }

    /// Time to live as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

/// Cost accounting settings used by the stats snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostConfig {
    /// Tokens nominally produced by one upstream call.
    #[serde(default = "default_avg_tokens")]
    pub avg_tokens: u64,

    /// Assumed cost of a single token.
    #[serde(default = "default_cost_per_token")]
    pub cost_per_token: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            avg_tokens: default_avg_tokens(),
            cost_per_token: default_cost_per_token(),
        }
    }
}

fn default_avg_tokens() -> u64 {
    500
}

fn default_cost_per_token() -> f64 {
    0.00002
}

/// Simulated upstream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Artificial latency of each upstream call (in milliseconds).
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Prefix prepended to the query to build the generated answer.
    #[serde(default = "default_answer_prefix")]
    pub answer_prefix: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            answer_prefix: default_answer_prefix(),
        }
    }
}

fn default_delay_ms() -> u64 {
    1200
}

fn default_answer_prefix() -> String {
    "Summary of document: ".to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> PromptCacheResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PromptCacheResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            cost: CostConfig::default(),
            upstream: UpstreamConfig::default(),
        }
    }

    /// Tries to load configuration from current directory or uses default.
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_FILE).unwrap_or_else(|_| Self::default_config())
    }

    /// Checks values that serde alone cannot enforce.
    pub fn validate(&self) -> PromptCacheResult<()> {
        self.cache.capacity()?;

        if !self.cost.cost_per_token.is_finite() || self.cost.cost_per_token < 0.0 {
            return Err(PromptCacheError::config(
                "cost.cost_per_token deve ser um número finito >= 0",
            ));
        }

        if !matches!(self.general.log_format.as_str(), "text" | "json") {
            return Err(PromptCacheError::config(format!(
                "general.log_format inválido: '{}' (use text ou json)",
                self.general.log_format
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
