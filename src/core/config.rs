/*!
 * Pool Configuration
 *
 * Runtime configuration with environment overrides
 */

use super::errors::{ConfigError, ConfigResult};
use super::limits::{DEFAULT_POOL_CAPACITY, ENV_POOL_CAPACITY, ENV_TRACE_JSON};
use super::types::Size;
use serde::{Deserialize, Serialize};

/// Allocator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Pool capacity in bytes
    pub capacity: Size,
    /// Emit JSON trace output instead of the compact format
    pub trace_json: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_CAPACITY,
            trace_json: false,
        }
    }
}

impl PoolConfig {
    pub fn with_capacity(mut self, capacity: Size) -> Self {
        self.capacity = capacity;
        self
    }

    /// Parse a JSON configuration object; missing fields take defaults
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `POOL_CAPACITY` and `POOL_TRACE_JSON`
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_POOL_CAPACITY) {
            config.capacity = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    var: ENV_POOL_CAPACITY.to_string(),
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = lookup(ENV_TRACE_JSON) {
            config.trace_json = parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
                var: ENV_TRACE_JSON.to_string(),
                value: raw.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                var: ENV_POOL_CAPACITY.to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
