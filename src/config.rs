use crate::error::{ReleaseTrainError, Result};
use crate::workflow::DEFAULT_PULL_REQUEST_BODY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "release-train.toml";

/// Represents the complete configuration for release-train.
///
/// Contains provider connection settings and behavior options.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_file() -> String {
    "token.secret".to_string()
}

fn default_user_agent() -> String {
    "release-train".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

/// 100 MB, enough for a zipball of any sane repository
fn default_max_archive_bytes() -> u64 {
    100 * 1024 * 1024
}

/// Connection settings for the hosting provider.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// File holding the access token on its first line
    #[serde(default = "default_token_file")]
    pub token_file: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_archive_bytes")]
    pub max_archive_bytes: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            api_url: default_api_url(),
            token_file: default_token_file(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_archive_bytes: default_max_archive_bytes(),
        }
    }
}

fn default_pull_request_body() -> String {
    DEFAULT_PULL_REQUEST_BODY.to_string()
}

/// Configuration for workflow behavior.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BehaviorConfig {
    /// Body of the pull requests opened when a hotfix is accepted
    #[serde(default = "default_pull_request_body")]
    pub pull_request_body: String,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            pull_request_body: default_pull_request_body(),
        }
    }
}

/// Location of the per-user configuration file, if the platform has a config dir
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("release-train").join("config.toml"))
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release-train.toml` in current directory
/// 3. `release-train/config.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If the file exists but cannot be read or parsed, or a custom path is missing
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else if let Some(path) = user_config_path().filter(|p| p.exists()) {
        path
    } else {
        tracing::debug!("no configuration file found, using defaults");
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        ReleaseTrainError::config(format!("Cannot read '{}': {}", path.display(), e))
    })?;
    let config = parse_config(&config_str)
        .map_err(|e| ReleaseTrainError::config(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Parses configuration text, filling in defaults for missing keys.
pub fn parse_config(text: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(text)
}
