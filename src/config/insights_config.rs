//! GitInsights configuration file handling

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which repositories the private source hands to user-level metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivateScope {
    /// Everything `/user/repos` returns (public and private)
    #[default]
    AllVisible,

    /// Only repositories flagged `private`, disjoint from the public source
    PrivateOnly,
}

/// GitInsights configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Base URL prefixed to relative API paths
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Number of most recent personal commits inspected for coded lines
    #[serde(default = "default_recent_commit_window")]
    pub recent_commit_window: usize,

    /// Cap on sibling requests in flight during a fan-out (None = unbounded)
    #[serde(default)]
    pub max_concurrent_requests: Option<usize>,

    /// Scope of the private repository source
    #[serde(default)]
    pub private_scope: PrivateScope,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("gitinsights/{}", env!("CARGO_PKG_VERSION"))
}

fn default_recent_commit_window() -> usize {
    100
}

impl InsightsConfig {
    pub fn new() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            recent_commit_window: default_recent_commit_window(),
            max_concurrent_requests: None,
            private_scope: PrivateScope::default(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_max_concurrent_requests(mut self, limit: usize) -> Self {
        self.max_concurrent_requests = Some(limit);
        self
    }

    pub fn with_private_scope(mut self, scope: PrivateScope) -> Self {
        self.private_scope = scope;
        self
    }

    pub fn with_recent_commit_window(mut self, window: usize) -> Self {
        self.recent_commit_window = window;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load configuration from the default path, falling back to defaults
    /// when the file does not exist yet
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::new());
        }
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::InsightsError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading GitInsights configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            api_url = %config.api_url,
            private_scope = ?config.private_scope,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving GitInsights configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/gitinsights/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("gitinsights");
        path.push("config.yaml");
        path
    }

    /// Read the bearer token from the configured environment variable
    pub fn token(&self) -> Result<String> {
        match std::env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(crate::InsightsError::Config(format!(
                "No token found: set {} or pass --token",
                self.token_env
            ))),
        }
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self::new()
    }
}
