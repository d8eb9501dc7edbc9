//! Client configuration: where the backend lives and how long we wait for it.
//!
//! Resolution order for the base URL:
//! 1. `TASKLINE_BASE_URL` environment variable (a `.env` file is loaded
//!    first if present, non-fatal if missing)
//! 2. `{config_dir}/config.json`
//! 3. Built-in default (`http://localhost:8000`)

use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::env;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

/// Environment variable that overrides the configured base URL.
pub const BASE_URL_ENV_VAR: &str = "TASKLINE_BASE_URL";

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV_VAR: &str = "TASKLINE_CONFIG_DIR";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_base_url() -> String {
    crate::TASKLINE_SERVER_BASE_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    crate::DEFAULT_REQUEST_TIMEOUT_SECS
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ClientConfig {
    /// Load config from {config_dir}/config.json, then apply env overrides.
    ///
    /// Missing file means defaults; a file that exists but is corrupt is an
    /// error rather than a silent fallback.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(|e| {
                warn!("Failed to read config file: {}", e);
                ConfigError::ReadError {
                    location: ErrorLocation::from(Location::caller()),
                    path: config_path.clone(),
                    source: e,
                }
            })?;

            let parsed: ClientConfig = serde_json::from_str(&contents).map_err(|e| {
                warn!("Failed to parse config JSON: {}", e);
                ConfigError::ParseError {
                    location: ErrorLocation::from(Location::caller()),
                    path: config_path.clone(),
                    reason: e.to_string(),
                }
            })?;

            info!("Config loaded from {}", config_path.display());
            parsed
        } else {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// Uses temp file + rename for atomicity (no corruption on crash).
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Overlay environment settings onto whatever the file said.
    fn apply_env_overrides(&mut self) {
        // Pick up a .env first so overrides work in dev shells (non-fatal
        // if missing).
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded .env from: {:?}", path),
            Err(_) => debug!("No .env file found - using process environment only"),
        }

        if let Ok(base_url) = env::var(BASE_URL_ENV_VAR) {
            if base_url.is_empty() {
                warn!("{BASE_URL_ENV_VAR} is set but empty, ignoring");
            } else {
                info!("Base URL overridden via {BASE_URL_ENV_VAR}");
                self.server.base_url = base_url;
            }
        }
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if self.server.base_url.is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("base_url cannot be empty"),
            });
        }

        if !self.server.base_url.starts_with("http://")
            && !self.server.base_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid URL format: {}", self.server.base_url),
            });
        }

        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("request_timeout_secs must be non-zero"),
            });
        }

        Ok(())
    }
}

/// Detect the taskline config directory.
///
/// Lookup order:
/// 1. `TASKLINE_CONFIG_DIR` environment variable (explicit override)
/// 2. Platform config directory via the `dirs` crate
pub fn detect_config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV_VAR) {
        let config_dir = PathBuf::from(&custom_dir);
        info!("Using {CONFIG_DIR_ENV_VAR} override: {:?}", config_dir);
        return Ok(config_dir);
    }

    if let Some(base) = dirs::config_dir() {
        let config_dir = base.join("taskline");
        debug!("Platform config dir: {:?}", config_dir);
        return Ok(config_dir);
    }

    Err(ConfigError::DirectoryNotFound {
        location: ErrorLocation::from(Location::caller()),
        reason: format!(
            "Cannot determine config directory. Set {CONFIG_DIR_ENV_VAR} environment variable."
        ),
    })
}
