use config::{Config, ConfigError, Environment, File, builder::DefaultState};
use gatecrab_api::DEFAULT_POLICY_PATH;
use gatecrab_core::ServerConfig;
use gatecrab_github::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub github: GithubConfig,
    pub retry: RetryConfig,
    pub repo_config: RepoConfigSettings,
}

/// GitHub configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Personal access or installation token
    pub token: String,
    pub webhook_secret: String,
    /// API root for GitHub Enterprise
    pub api_url: Option<String>,
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Retry settings for GitHub API calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

/// Where repository policies live and how long they are cached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfigSettings {
    pub path: String,
    pub cache_ttl_seconds: u64,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. config.toml file (if present)
    /// 3. Environment variables (prefixed with GATECRAB_)
    ///
    /// Environment variables use double underscore for nesting:
    /// - GATECRAB_SERVER__PORT=3000
    /// - GATECRAB_GITHUB__TOKEN=ghp_...
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?;

        let builder = if Path::new("config.toml").exists() {
            builder.add_source(File::with_name("config"))
        } else {
            builder
        };

        let builder = builder.add_source(
            Environment::with_prefix("GATECRAB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("retry.max_attempts", 3)?
            .set_default("retry.base_delay_ms", 200)?
            .set_default("retry.max_delay_ms", 2000)?
            .set_default("repo_config.path", DEFAULT_POLICY_PATH)?
            .set_default("repo_config.cache_ttl_seconds", 300)
    }
}
