//! Configuration loading, validation, and management for Stagehand.
//!
//! Loads configuration from `~/.stagehand/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use stagehand_core::AgentRole;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.stagehand/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Local model server (Ollama)
    #[serde(default)]
    pub local: LocalBackendConfig,

    /// Remote OpenAI-compatible endpoint
    #[serde(default)]
    pub remote: RemoteBackendConfig,

    /// Rate limiting and retry policy
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Pipeline run settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Per-role system prompt overrides, keyed by role (e.g. `front_end`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prompts: BTreeMap<String, String>,
}

fn default_log_level() -> String {
    "info".into()
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalBackendConfig {
    #[serde(default = "default_local_url")]
    pub base_url: String,

    #[serde(default = "default_local_chat_path")]
    pub chat_path: String,

    #[serde(default = "default_local_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_local_model")]
    pub default_model: String,
}

fn default_local_url() -> String {
    "http://127.0.0.1:11434".into()
}
fn default_local_chat_path() -> String {
    "/api/chat".into()
}
fn default_local_timeout() -> u64 {
    120
}
fn default_local_model() -> String {
    "qwen2.5-coder:1.5b".into()
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_local_url(),
            chat_path: default_local_chat_path(),
            timeout_secs: default_local_timeout(),
            default_model: default_local_model(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteBackendConfig {
    #[serde(default = "default_remote_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_remote_chat_path")]
    pub chat_path: String,

    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_remote_model")]
    pub default_model: String,
}

fn default_remote_url() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode".into()
}
fn default_remote_chat_path() -> String {
    "/v1/chat/completions".into()
}
fn default_remote_timeout() -> u64 {
    300
}
fn default_remote_model() -> String {
    "qwen-max".into()
}

impl Default for RemoteBackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_remote_url(),
            api_key: None,
            chat_path: default_remote_chat_path(),
            timeout_secs: default_remote_timeout(),
            default_model: default_remote_model(),
        }
    }
}

impl std::fmt::Debug for RemoteBackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("chat_path", &self.chat_path)
            .field("timeout_secs", &self.timeout_secs)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Rate limiting and retry policy for backend calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Pause after the rate limiter denies admission
    #[serde(default = "default_throttle_delay_ms")]
    pub throttle_delay_ms: u64,

    #[serde(default = "default_bucket_size")]
    pub bucket_size: u32,

    /// Tokens added per second
    #[serde(default = "default_refill_per_sec")]
    pub refill_per_sec: f64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    1_000
}
fn default_max_backoff_ms() -> u64 {
    30_000
}
fn default_throttle_delay_ms() -> u64 {
    100
}
fn default_bucket_size() -> u32 {
    10
}
fn default_refill_per_sec() -> f64 {
    1.0
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            throttle_delay_ms: default_throttle_delay_ms(),
            bucket_size: default_bucket_size(),
            refill_per_sec: default_refill_per_sec(),
        }
    }
}

/// Which backend the pipeline talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Local,
    Remote,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(BackendKind::Local),
            "remote" => Ok(BackendKind::Remote),
            other => Err(format!("unknown backend '{other}' (expected local or remote)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Where the generated code block is written
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from("demo.html")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            artifact_path: default_artifact_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.stagehand/config.toml).
    ///
    /// Environment variables override the file:
    /// - `STAGEHAND_API_KEY`: remote API key
    /// - `STAGEHAND_BASE_URL`: remote base URL
    /// - `STAGEHAND_LOCAL_URL`: local base URL
    /// - `STAGEHAND_LOG_LEVEL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides and validate.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_lookup(path, |key| std::env::var(key).ok())
    }

    /// Load from `path`, apply overrides from `lookup`, then validate the
    /// merged result.
    pub fn load_with_lookup(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a specific file path. Not validated: call
    /// [`AppConfig::validate`] once any overrides are applied.
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

        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("STAGEHAND_API_KEY") {
            self.remote.api_key = Some(key);
        }
        if let Some(url) = lookup("STAGEHAND_BASE_URL") {
            self.remote.base_url = url;
        }
        if let Some(url) = lookup("STAGEHAND_LOCAL_URL") {
            self.local.base_url = url;
        }
        if let Some(level) = lookup("STAGEHAND_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".stagehand")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url("local.base_url", &self.local.base_url)?;
        validate_base_url("remote.base_url", &self.remote.base_url)?;

        if self.dispatch.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "dispatch.max_attempts must be at least 1".into(),
            ));
        }
        if self.dispatch.bucket_size == 0 {
            return Err(ConfigError::ValidationError(
                "dispatch.bucket_size must be at least 1".into(),
            ));
        }
        if !(self.dispatch.refill_per_sec > 0.0) {
            return Err(ConfigError::ValidationError(
                "dispatch.refill_per_sec must be > 0".into(),
            ));
        }
        if let Some(key) = self.prompts.keys().find(|k| AgentRole::from_key(k).is_none()) {
            return Err(ConfigError::ValidationError(format!(
                "prompts.{key} does not name a known role"
            )));
        }

        Ok(())
    }

    /// The configured system prompt override for `role`, if any.
    pub fn prompt_override(&self, role: AgentRole) -> Option<&str> {
        self.prompts.get(role.as_str()).map(String::as_str)
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn validate_base_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.is_empty() {
        return Err(ConfigError::ValidationError(format!("{field} must be set")));
    }
    if !url.starts_with("http") {
        return Err(ConfigError::ValidationError(format!(
            "{field} must start with http or https"
        )));
    }
    Ok(())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            local: LocalBackendConfig::default(),
            remote: RemoteBackendConfig::default(),
            dispatch: DispatchConfig::default(),
            pipeline: PipelineConfig::default(),
            prompts: BTreeMap::new(),
        }
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.local.base_url, "http://127.0.0.1:11434");
        assert_eq!(config.dispatch.max_attempts, 3);
        assert_eq!(config.pipeline.backend, BackendKind::Local);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.local.base_url, config.local.base_url);
        assert_eq!(parsed.dispatch.bucket_size, config.dispatch.bucket_size);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
log_level = "debug"

[remote]
base_url = "https://api.example.com"
api_key = "sk-test"

[dispatch]
max_attempts = 5

[prompts]
front_end = "Write only HTML."
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.remote.base_url, "https://api.example.com");
        assert_eq!(config.remote.chat_path, "/v1/chat/completions");
        assert_eq!(config.dispatch.max_attempts, 5);
        assert_eq!(config.dispatch.throttle_delay_ms, 100);
        assert_eq!(config.prompt_override(AgentRole::FrontEnd), Some("Write only HTML."));
        assert_eq!(config.prompt_override(AgentRole::Monitoring), None);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = [unterminated").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn non_http_base_url_rejected() {
        let mut config = AppConfig::default();
        config.local.base_url = "127.0.0.1:11434".into();
        assert!(config.validate().is_err());

        config.local.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_attempts_rejected() {
        let mut config = AppConfig::default();
        config.dispatch.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_refill_rejected() {
        let mut config = AppConfig::default();
        config.dispatch.refill_per_sec = 0.0;
        assert!(config.validate().is_err());
        config.dispatch.refill_per_sec = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_prompt_role_rejected() {
        let mut config = AppConfig::default();
        config.prompts.insert("poet".into(), "Write verse.".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| match key {
            "STAGEHAND_API_KEY" => Some("sk-env".into()),
            "STAGEHAND_LOCAL_URL" => Some("http://gpu-box:11434".into()),
            "STAGEHAND_LOG_LEVEL" => Some("trace".into()),
            _ => None,
        });
        assert_eq!(config.remote.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.local.base_url, "http://gpu-box:11434");
        assert_eq!(config.log_level, "trace");
        assert_eq!(config.remote.base_url, default_remote_url());
    }

    #[test]
    fn env_override_repairs_file_value() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[local]\nbase_url = \"gpu-box:11434\"").unwrap();

        let err = AppConfig::load_with_lookup(file.path(), |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let config = AppConfig::load_with_lookup(file.path(), |key| {
            (key == "STAGEHAND_LOCAL_URL").then(|| "http://gpu-box:11434".to_string())
        })
        .unwrap();
        assert_eq!(config.local.base_url, "http://gpu-box:11434");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let mut config = AppConfig::default();
        config.remote.api_key = Some("sk-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn backend_kind_parses() {
        assert_eq!("remote".parse::<BackendKind>(), Ok(BackendKind::Remote));
        assert!("cloud".parse::<BackendKind>().is_err());
    }
}
