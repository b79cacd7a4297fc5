//! TOML Configuration File Support
//!
//! Centralized configuration loading for the guidance tools, backed by a TOML
//! file at `~/.config/career-guidance/guidance.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Environment Variables
//!
//! - `GUIDANCE_CHAT_BASE_URL`: chat endpoint base URL
//! - `GUIDANCE_CHAT_MODEL`: model name
//! - `GUIDANCE_API_KEY`: bearer token (the variable name can be changed with
//!   `chat.api_key_env`)
//!
//! # Example Configuration
//!
//! ```toml
//! [chat]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//! api_key_env = "OPENAI_API_KEY"
//! idle_timeout_secs = 30
//! connect_timeout_secs = 10
//! max_retries = 8
//!
//! [quiz]
//! top_n = 5
//! question_bank = "questions.toml"
//!
//! [catalog]
//! data_path = "catalog.json"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::DecoderLimits;
use crate::quiz::DEFAULT_TOP_N;

/// Environment variable overriding the chat base URL
pub const ENV_BASE_URL: &str = "GUIDANCE_CHAT_BASE_URL";
/// Environment variable overriding the chat model
pub const ENV_MODEL: &str = "GUIDANCE_CHAT_MODEL";
/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "GUIDANCE_API_KEY";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly career counsellor for school and college \
students. Give practical, encouraging advice about streams, courses, entrance exams, \
scholarships and careers. Keep answers short and concrete.";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the highest-priority value came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Chat section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatToml {
    /// Base URL of the OpenAI-compatible API
    pub base_url: Option<String>,

    /// Model name
    pub model: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Longest wait between body chunks, in seconds
    pub idle_timeout_secs: Option<u64>,

    /// Connection timeout in seconds
    pub connect_timeout_secs: Option<u64>,

    /// System prompt sent with every conversation
    pub system_prompt: Option<String>,

    /// Consecutive parse failures tolerated on one line
    pub max_retries: Option<u32>,

    /// Largest incomplete line buffered while streaming
    pub max_pending_bytes: Option<usize>,
}

/// Quiz section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizToml {
    /// Number of recommendations kept before filtering
    pub top_n: Option<usize>,

    /// Question bank file replacing the built-in one
    pub question_bank: Option<PathBuf>,
}

/// Catalog section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogToml {
    /// Catalog JSON file replacing the built-in one
    pub data_path: Option<PathBuf>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceToml {
    /// Chat configuration section
    pub chat: ChatToml,

    /// Quiz configuration section
    pub quiz: QuizToml,

    /// Catalog configuration section
    pub catalog: CatalogToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Settings for the chat backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatSettings {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Bearer token, if any
    pub api_key: Option<String>,
    /// Environment variable the key is read from
    pub api_key_env: String,
    /// System prompt sent with every conversation
    pub system_prompt: Option<String>,
    /// Longest wait for the response or the next body chunk
    pub idle_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Decoder retry and buffer bounds
    pub limits: DecoderLimits,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            idle_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            limits: DecoderLimits::default(),
        }
    }
}

/// Settings for the quiz
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    /// Number of recommendations kept before filtering
    pub top_n: usize,
    /// Question bank file; the built-in bank when `None`
    pub question_bank: Option<PathBuf>,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            question_bank: None,
        }
    }
}

/// Settings for the reference catalog
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Catalog JSON file; the built-in catalog when `None`
    pub data_path: Option<PathBuf>,
}

/// Resolved configuration for the guidance tools
///
/// Use [`load_config`] to build one with proper priority handling.
#[derive(Clone, Debug, Default)]
pub struct GuidanceConfig {
    /// Chat backend settings
    pub chat: ChatSettings,

    /// Quiz settings
    pub quiz: QuizSettings,

    /// Catalog settings
    pub catalog: CatalogSettings,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl GuidanceConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the highest-priority source that contributed a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check values that would make the tools misbehave
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an empty base URL, a zero
    /// timeout, a zero `top_n` or a zero pending-line limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chat.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "chat.base_url must not be empty".to_string(),
            ));
        }
        if self.chat.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "chat.model must not be empty".to_string(),
            ));
        }
        if self.chat.idle_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "chat.idle_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.chat.connect_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "chat.connect_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.chat.limits.max_pending_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "chat.max_pending_bytes must be greater than 0".to_string(),
            ));
        }
        if self.quiz.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "quiz.top_n must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/career-guidance/guidance.toml` or
/// `~/.config/career-guidance/guidance.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("career-guidance").join("guidance.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read, parsed or
/// validated. A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<GuidanceConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<GuidanceConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration reading environment variables through `env`
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<GuidanceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = GuidanceConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: GuidanceToml = toml::from_str(&toml_content)?;
            let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
            apply_toml_config(&mut config, &toml_config, base_dir);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut GuidanceConfig, toml: &GuidanceToml, base_dir: &Path) {
    // Chat settings
    if let Some(ref url) = toml.chat.base_url {
        config.chat.base_url.clone_from(url);
    }
    if let Some(ref model) = toml.chat.model {
        config.chat.model.clone_from(model);
    }
    if let Some(ref var) = toml.chat.api_key_env {
        config.chat.api_key_env.clone_from(var);
    }
    if let Some(secs) = toml.chat.idle_timeout_secs {
        config.chat.idle_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = toml.chat.connect_timeout_secs {
        config.chat.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(ref prompt) = toml.chat.system_prompt {
        // An empty prompt switches it off
        config.chat.system_prompt = Some(prompt.clone()).filter(|p| !p.trim().is_empty());
    }
    if let Some(retries) = toml.chat.max_retries {
        config.chat.limits.max_retries = retries;
    }
    if let Some(bytes) = toml.chat.max_pending_bytes {
        config.chat.limits.max_pending_bytes = bytes;
    }

    // Quiz settings
    if let Some(top_n) = toml.quiz.top_n {
        config.quiz.top_n = top_n;
    }
    if let Some(ref path) = toml.quiz.question_bank {
        config.quiz.question_bank = Some(base_dir.join(path));
    }

    // Catalog settings
    if let Some(ref path) = toml.catalog.data_path {
        config.catalog.data_path = Some(base_dir.join(path));
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut GuidanceConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_BASE_URL).filter(|v| !v.is_empty()) {
        config.chat.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(model) = env(ENV_MODEL).filter(|v| !v.is_empty()) {
        config.chat.model = model;
        config.source = ConfigSource::Env;
    }
    if let Some(key) = env(&config.chat.api_key_env).filter(|v| !v.is_empty()) {
        config.chat.api_key = Some(key);
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides,
/// then call [`GuidanceConfig::validate`] again.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,

    /// Model override
    pub model: Option<String>,

    /// Recommendation count override
    pub top_n: Option<usize>,

    /// Question bank override
    pub question_bank: Option<PathBuf>,

    /// Catalog file override
    pub catalog_path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set model override
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// Set recommendation count override
    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    /// Set question bank override
    #[must_use]
    pub fn with_question_bank(mut self, path: PathBuf) -> Self {
        self.question_bank = Some(path);
        self
    }

    /// Set catalog file override
    #[must_use]
    pub fn with_catalog_path(mut self, path: PathBuf) -> Self {
        self.catalog_path = Some(path);
        self
    }

    fn is_empty(&self) -> bool {
        self.base_url.is_none()
            && self.model.is_none()
            && self.top_n.is_none()
            && self.question_bank.is_none()
            && self.catalog_path.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut GuidanceConfig) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }
        if let Some(ref url) = self.base_url {
            config.chat.base_url.clone_from(url);
        }
        if let Some(ref model) = self.model {
            config.chat.model.clone_from(model);
        }
        if let Some(top_n) = self.top_n {
            config.quiz.top_n = top_n;
        }
        if let Some(ref path) = self.question_bank {
            config.quiz.question_bank = Some(path.clone());
        }
        if let Some(ref path) = self.catalog_path {
            config.catalog.data_path = Some(path.clone());
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
