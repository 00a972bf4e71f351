//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Serve every request from the in-memory development dataset
    #[serde(default)]
    pub mock: bool,

    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Object storage and download settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides from `CONSOLE_*` variables.
    ///
    /// `lookup` resolves a variable name; pass `|k| std::env::var(k).ok()`
    /// for the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CONSOLE_API_URL") {
            let url = url.trim();
            self.api.base_url = (!url.is_empty()).then(|| url.to_string());
        }
        if let Some(client_id) = lookup("CONSOLE_CLIENT_ID") {
            self.api.client_id = client_id;
        }
        if let Some(bucket) = lookup("CONSOLE_BUCKET") {
            self.storage.bucket = bucket;
        }
        if let Some(flag) = lookup("CONSOLE_MOCK") {
            self.mock = parse_flag(&flag).ok_or_else(|| {
                AppError::config(format!("CONSOLE_MOCK must be a boolean, got '{flag}'"))
            })?;
        }
        Ok(())
    }

    /// Whether requests go to the in-memory backend.
    pub fn use_mock(&self) -> bool {
        self.mock || self.api.base_url.is_none()
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.api.base_url {
            let parsed = url::Url::parse(base_url)?;
            if parsed.cannot_be_a_base() {
                return Err(AppError::validation(format!(
                    "api.base_url cannot be used as a base: {base_url}"
                )));
            }
        }
        if self.api.client_id.trim().is_empty() {
            return Err(AppError::validation("api.client_id is empty"));
        }
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(AppError::validation("storage.bucket is empty"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mock: false,
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API (mock backend when absent)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Client whose lambdas are managed
    #[serde(default = "defaults::client_id")]
    pub client_id: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            client_id: defaults::client_id(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// How batch ids are derived from folder prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchIdStrategy {
    /// Last non-empty path segment; distinct prefixes may collide
    #[default]
    LastSegment,
    /// Last segment suffixed with a short SHA-256 of the full prefix
    PrefixHash,
}

/// Object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket named in download requests
    #[serde(default = "defaults::bucket")]
    pub bucket: String,

    /// Directory where downloaded archives are written
    #[serde(default = "defaults::download_dir")]
    pub download_dir: PathBuf,

    #[serde(default)]
    pub batch_id_strategy: BatchIdStrategy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: defaults::bucket(),
            download_dir: defaults::download_dir(),
            batch_id_strategy: BatchIdStrategy::default(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn client_id() -> String {
        "clientA".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        concat!("lambda-console/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn bucket() -> String {
        "annonces-images".into()
    }
    pub fn download_dir() -> PathBuf {
        PathBuf::from("downloads")
    }
}
