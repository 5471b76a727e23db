/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export PoolError from memory module
pub use crate::memory::{PoolError, PoolResult};

/// Configuration errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Check the environment variable; capacities are byte counts, flags are 1/true/0/false.")
    )]
    InvalidValue { var: String, value: String },

    #[error("Failed to parse configuration: {0}")]
    #[diagnostic(
        code(config::parse_failed),
        help("Configuration must be a JSON object with `capacity` and `trace_json` fields.")
    )]
    ParseFailed(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;
