use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use common::registry::CodesFile;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "letterbox";
pub const CONFIG_FILE_NAME: &str = "letterbox.toml";
pub const LOG_FILE_NAME: &str = "letterbox.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the HTTP server
    #[serde(default = "default_port")]
    pub port: u16,
    /// Root of the shared directory tree
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// JSON file mapping access codes to directories
    #[serde(default = "default_codes_file")]
    pub codes_file: PathBuf,
    /// Static assets served for everything outside /api and /letters
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    /// Directory for log files (stdout only if not set)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Throttling for code verification
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_port() -> u16 {
    3000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("upload")
}

fn default_codes_file() -> PathBuf {
    PathBuf::from("upload/codes.json")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            upload_dir: default_upload_dir(),
            codes_file: default_codes_file(),
            public_dir: default_public_dir(),
            log_dir: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Fixed window request cap applied per client to code verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_max_requests() -> u32 {
    10
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the config file (may not exist when running on defaults)
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the config file path (custom or `letterbox.toml` in the working directory)
    pub fn config_path(custom_path: Option<PathBuf>) -> PathBuf {
        custom_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Write a config file and lay out the upload directory.
    ///
    /// Refuses to overwrite an existing config. An existing codes file
    /// is left alone.
    pub fn init(custom_path: Option<PathBuf>, config: Option<AppConfig>) -> Result<Self, StateError> {
        let config_path = Self::config_path(custom_path);
        if config_path.exists() {
            return Err(StateError::AlreadyInitialized(config_path));
        }

        let config = config.unwrap_or_default();

        fs::create_dir_all(&config.upload_dir)?;
        if !config.codes_file.exists() {
            if let Some(parent) = config.codes_file.parent() {
                fs::create_dir_all(parent)?;
            }
            let codes = serde_json::to_string_pretty(&CodesFile::default())?;
            fs::write(&config.codes_file, codes)?;
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load the config file.
    ///
    /// A missing default config falls back to built-in defaults; a
    /// missing explicitly requested config is an error.
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let explicit = custom_path.is_some();
        let config_path = Self::config_path(custom_path);

        let config = if config_path.exists() {
            read_config(&config_path)?
        } else if explicit {
            return Err(StateError::MissingConfig(config_path));
        } else {
            AppConfig::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }
}

fn read_config(path: &Path) -> Result<AppConfig, StateError> {
    let config_toml = fs::read_to_string(path)?;
    Ok(toml::from_str(&config_toml)?)
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("config file {0} already exists")]
    AlreadyInitialized(PathBuf),

    #[error("config file {0} not found. Run 'letterbox init' first")]
    MissingConfig(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
