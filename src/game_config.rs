//! Game configuration loaded from TOML.

use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use sambung_rules::{TURN_DURATION_SECS, Theme};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Configuration for a game client.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// LLM provider (gemini, openai or anthropic).
    #[serde(default = "default_provider")]
    llm_provider: LlmProvider,

    /// LLM model name; the provider's default when omitted.
    #[serde(default)]
    llm_model: Option<String>,

    /// Maximum tokens for LLM responses.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,

    /// Seconds each player gets per turn.
    #[serde(default = "default_turn_secs")]
    turn_secs: u32,

    /// Pause before asking the oracle for a machine move.
    #[serde(default = "default_thinking_delay_ms")]
    thinking_delay_ms: u64,

    /// Upper bound on a single oracle call.
    #[serde(default = "default_oracle_timeout_secs")]
    oracle_timeout_secs: u64,

    /// Theme preselected in the menu.
    #[serde(default)]
    theme: Theme,
}

#[instrument]
fn default_provider() -> LlmProvider {
    LlmProvider::Gemini
}

#[instrument]
fn default_max_tokens() -> u32 {
    1024
}

fn default_turn_secs() -> u32 {
    TURN_DURATION_SECS
}

fn default_thinking_delay_ms() -> u64 {
    1500
}

fn default_oracle_timeout_secs() -> u64 {
    20
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            llm_provider: default_provider(),
            llm_model: None,
            llm_max_tokens: default_max_tokens(),
            turn_secs: default_turn_secs(),
            thinking_delay_ms: default_thinking_delay_ms(),
            oracle_timeout_secs: default_oracle_timeout_secs(),
            theme: Theme::default(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(provider = %config.llm_provider, theme = %config.theme, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.turn_secs == 0 {
            return Err(ConfigError::new("turn_secs must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Replaces the menu theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Model name, falling back to the provider default.
    pub fn model_name(&self) -> String {
        self.llm_model
            .clone()
            .unwrap_or_else(|| self.llm_provider.default_model().to_string())
    }

    /// Thinking delay as a duration.
    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }

    /// Oracle timeout as a duration.
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Creates LLM configuration from this config.
    ///
    /// Reads the provider's API key (`GEMINI_API_KEY`, `OPENAI_API_KEY` or
    /// `ANTHROPIC_API_KEY`) from the environment.
    #[instrument(skip(self), fields(provider = ?self.llm_provider))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");

        let var = self.llm_provider.api_key_var();
        let api_key = std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                warn!(var, "API key not set");
                ConfigError::new(format!("{} environment variable not set", var))
            })?;

        Ok(LlmConfig::new(
            self.llm_provider,
            api_key,
            self.model_name(),
            self.llm_max_tokens,
        ))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
