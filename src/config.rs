//! Configuration management for taskpilot.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `DEFAULT_MODEL` - Optional. The planner model to use. Defaults to `anthropic/claude-sonnet-4.5`.
//! - `WORKSPACE_PATH` - Optional. Starting working directory. Defaults to current directory.
//! - `MAX_TURNS` - Optional. Maximum planner turns per prompt cycle. Defaults to `50`.
//! - `MAX_REPLY_RETRIES` - Optional. Fresh attempts after a malformed planner reply. Defaults to `3`.
//! - `SHELL_TIMEOUT_SECS` - Optional. Timeout for shell tasks. Defaults to `120`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key
    pub api_key: String,

    /// Planner model identifier (OpenRouter format)
    pub model: String,

    /// Starting working directory for task execution
    pub workspace_path: PathBuf,

    /// Maximum planner turns within one prompt cycle
    pub max_turns: usize,

    /// Fresh planner attempts after a malformed reply before the cycle aborts
    pub reply_retries: usize,

    /// Timeout for a single shell task, in seconds
    pub shell_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let model = std::env::var("DEFAULT_MODEL")
            .unwrap_or_else(|_| "anthropic/claude-sonnet-4.5".to_string());

        let workspace_path = std::env::var("WORKSPACE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let max_turns = std::env::var("MAX_TURNS")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("MAX_TURNS".to_string(), format!("{}", e)))?;

        let reply_retries = std::env::var("MAX_REPLY_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("MAX_REPLY_RETRIES".to_string(), format!("{}", e))
            })?;

        let shell_timeout_secs = std::env::var("SHELL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("SHELL_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;

        Ok(Self {
            api_key,
            model,
            workspace_path,
            max_turns,
            reply_retries,
            shell_timeout_secs,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, model: String, workspace_path: PathBuf) -> Self {
        Self {
            api_key,
            model,
            workspace_path,
            max_turns: 50,
            reply_retries: 3,
            shell_timeout_secs: 120,
        }
    }
}
