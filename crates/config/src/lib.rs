//! Configuration loading, validation, and management for FactQuest.
//!
//! Loads configuration from `~/.factquest/config.toml` (defaults when the
//! file is absent), then applies environment variable overrides. The two
//! API keys normally come from the environment and are checked by
//! [`AppConfig::require_secrets`] before anything is served.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the language-model API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable holding the news search API key.
pub const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";

/// Most articles a single news lookup may return.
pub const MAX_ARTICLES: u32 = 5;

/// The root configuration structure.
///
/// Maps directly to `~/.factquest/config.toml`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language-model API key (normally from `GEMINI_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    /// News API key (normally from `NEWS_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_api_key: Option<String>,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub news: NewsConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub agent: AgentSettings,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("news_api_key", &redact(&self.news_api_key))
            .field("model", &self.model)
            .field("news", &self.news)
            .field("gateway", &self.gateway)
            .field("agent", &self.agent)
            .finish()
    }
}

/// The chat-completions endpoint and model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default = "default_model_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".into()
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_model_timeout() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            request_timeout_secs: default_model_timeout(),
        }
    }
}

/// The news search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_url")]
    pub api_url: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_news_timeout")]
    pub timeout_secs: u64,
}

fn default_news_url() -> String {
    "https://newsapi.org/v2/everything".into()
}
fn default_page_size() -> u32 {
    MAX_ARTICLES
}
fn default_news_timeout() -> u64 {
    15
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_url: default_news_url(),
            page_size: default_page_size(),
            timeout_secs: default_news_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Live WebSocket sessions accepted at once
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_max_sessions() -> usize {
    1_000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            max_sessions: default_max_sessions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Model rounds allowed per user turn (tool calls each cost one round)
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

fn default_max_rounds() -> u32 {
    5
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
        }
    }
}

/// API keys that must be present before any session is served.
#[derive(Clone)]
pub struct Secrets {
    pub gemini_api_key: String,
    pub news_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("gemini_api_key", &"[REDACTED]")
            .field("news_api_key", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    /// Load from the default path, then apply process environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (highest priority).
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(GEMINI_API_KEY_VAR) {
            self.gemini_api_key = Some(key);
        }
        if let Some(key) = get(NEWS_API_KEY_VAR) {
            self.news_api_key = Some(key);
        }
        if let Some(model) = get("FACTQUEST_MODEL") {
            self.model.model = model;
        }
        if let Some(url) = get("FACTQUEST_BASE_URL") {
            self.model.base_url = url;
        }
        if let Some(url) = get("NEWS_API_URL") {
            self.news.api_url = url;
        }
        if let Some(host) = get("FACTQUEST_HOST") {
            self.gateway.host = host;
        }
        match get("FACTQUEST_PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => self.gateway.port = port,
            Some(Err(e)) => tracing::warn!("Ignoring invalid FACTQUEST_PORT: {e}"),
            None => {}
        }
    }

    /// Both API keys, or an error naming the first one missing.
    pub fn require_secrets(&self) -> Result<Secrets, ConfigError> {
        let gemini_api_key = self
            .gemini_api_key
            .clone()
            .ok_or(ConfigError::MissingSecret(GEMINI_API_KEY_VAR))?;
        let news_api_key = self
            .news_api_key
            .clone()
            .ok_or(ConfigError::MissingSecret(NEWS_API_KEY_VAR))?;
        Ok(Secrets {
            gemini_api_key,
            news_api_key,
        })
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".factquest")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.news.page_size == 0 || self.news.page_size > MAX_ARTICLES {
            return Err(ConfigError::ValidationError(format!(
                "news.page_size must be between 1 and {MAX_ARTICLES}"
            )));
        }

        if self.agent.max_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_rounds must be at least 1".into(),
            ));
        }

        if self.gateway.max_sessions == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.max_sessions must be at least 1".into(),
            ));
        }

        if self.model.request_timeout_secs == 0 || self.news.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be at least 1 second".into(),
            ));
        }

        Ok(())
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("{0} not set (export it or add it to .env)")]
    MissingSecret(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model.model, "gemini-2.0-flash");
        assert_eq!(config.news.page_size, 5);
        assert_eq!(config.gateway.port, 8000);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model.base_url, config.model.base_url);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.model.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_rounds_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_rounds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.news.api_url, "https://newsapi.org/v2/everything");
    }

    #[test]
    fn load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[model]\nmodel = \"gemini-1.5-pro\"\n\n[gateway]\nport = 9100\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model.model, "gemini-1.5-pro");
        assert_eq!(config.model.base_url, default_base_url());
        assert_eq!(config.gateway.port, 9100);
    }

    #[test]
    fn unparseable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model\nmodel = ").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("GEMINI_API_KEY", "g-key"),
            ("NEWS_API_KEY", "n-key"),
            ("FACTQUEST_MODEL", "gemini-2.5-flash"),
            ("NEWS_API_URL", "http://127.0.0.1:9/v2/everything"),
            ("FACTQUEST_PORT", "9001"),
        ]));
        assert_eq!(config.gemini_api_key.as_deref(), Some("g-key"));
        assert_eq!(config.news_api_key.as_deref(), Some("n-key"));
        assert_eq!(config.model.model, "gemini-2.5-flash");
        assert_eq!(config.news.api_url, "http://127.0.0.1:9/v2/everything");
        assert_eq!(config.gateway.port, 9001);
    }

    #[test]
    fn invalid_port_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("FACTQUEST_PORT", "not-a-port")]));
        assert_eq!(config.gateway.port, 8000);
    }

    #[test]
    fn missing_news_key_is_named() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("GEMINI_API_KEY", "g-key")]));
        let err = config.require_secrets().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("NEWS_API_KEY")));
        assert!(err.to_string().contains("NEWS_API_KEY"));
    }

    #[test]
    fn missing_gemini_key_is_named_first() {
        let config = AppConfig::default();
        let err = config.require_secrets().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn empty_secret_counts_as_missing() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("GEMINI_API_KEY", "g"), ("NEWS_API_KEY", "  ")]));
        assert!(config.require_secrets().is_err());
    }

    #[test]
    fn debug_redacts_keys() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("GEMINI_API_KEY", "super-secret")]));
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn page_size_above_article_cap_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[news]\npage_size = 10\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn page_size_within_cap_accepted() {
        let mut config = AppConfig::default();
        config.news.page_size = 3;
        assert!(config.validate().is_ok());
        config.news.page_size = 0;
        assert!(config.validate().is_err());
    }
}
