//! Configuration module for Fleetboard

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "FLEETBOARD";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Backend API the repositories are fetched from
    #[serde(default)]
    pub backend: BackendConfig,

    /// Settings storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Dashboard behaviour
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
        }
    }
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first failed call in the retrying fetch variants
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base delay between retries; multiplied by the retry number
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8083".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_retry_count() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite settings database
    pub path: Option<String>,
}

impl StorageConfig {
    pub fn get_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => PathBuf::from(path),
            None => get_data_dir().join("fleetboard.db"),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Quiet period before a typed text filter is committed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Get the data directory for Fleetboard
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("fleetboard"))
        .or_else(|| dirs::home_dir().map(|h| h.join(".fleetboard")))
        .unwrap_or_else(|| PathBuf::from(".fleetboard"))
}

/// Get the config directory for Fleetboard
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("fleetboard"))
        .unwrap_or_else(get_data_dir)
}

pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}

/// Load configuration from `path` (optional) layered with
/// `FLEETBOARD__SECTION__KEY` environment variables
pub fn load_config_from(path: &Path) -> Result<Config, ::config::ConfigError> {
    ::config::Config::builder()
        .add_source(::config::File::from(path).required(false))
        .add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// Load configuration from the default location, or defaults on error
pub fn load_config() -> Config {
    let path = get_config_path();
    match load_config_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config from {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to `path`
pub fn save_config_to(config: &Config, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, contents)
}

/// Save configuration to the default location
pub fn save_config(config: &Config) -> std::io::Result<()> {
    save_config_to(config, &get_config_path())
}
