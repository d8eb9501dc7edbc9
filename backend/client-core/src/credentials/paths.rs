//! Platform-aware detection of the taskline data directory.
//!
//! Lookup order:
//! 1. TASKLINE_DATA_DIR environment variable (explicit override)
//! 2. Platform-specific data directory via `dirs` crate
//! 3. Fallback paths for common configurations
//!
//! Returns Result, never silently falls back to wrong path.

use crate::error::credentials::CredentialsError;

use std::env;
use std::path::PathBuf;

use log::{debug, info, warn};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV_VAR: &str = "TASKLINE_DATA_DIR";

const APP_DIR_NAME: &str = "taskline";
const CREDENTIAL_FILE_NAME: &str = "credentials.json";

/// Taskline data directory detection result.
#[derive(Debug, Clone)]
pub struct TasklinePaths {
    /// Base data directory (e.g., ~/.local/share/taskline on Linux).
    pub data_dir: PathBuf,
    /// Path to credentials.json file.
    pub credential_file: PathBuf,
    /// How the path was determined.
    pub source: PathSource,
}

/// How the path was determined (for debugging/logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    /// Set via TASKLINE_DATA_DIR environment variable.
    EnvVar,
    /// Detected via platform-specific XDG/AppData/Library path.
    PlatformDefault,
    /// Linux fallback (~/.local/share/taskline).
    LinuxFallback,
    /// macOS fallback (~/Library/Application Support/taskline).
    MacOSFallback,
    /// Windows fallback (%APPDATA%/taskline).
    WindowsFallback,
}

impl std::fmt::Display for PathSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSource::EnvVar => write!(f, "{DATA_DIR_ENV_VAR}"),
            PathSource::PlatformDefault => write!(f, "platform default"),
            PathSource::LinuxFallback => write!(f, "Linux fallback"),
            PathSource::MacOSFallback => write!(f, "macOS fallback"),
            PathSource::WindowsFallback => write!(f, "Windows fallback"),
        }
    }
}

impl TasklinePaths {
    fn new(data_dir: PathBuf, source: PathSource) -> Self {
        let credential_file = data_dir.join(CREDENTIAL_FILE_NAME);
        Self {
            data_dir,
            credential_file,
            source,
        }
    }
}

/// Detect taskline data paths.
///
/// # Errors
/// Returns `CredentialsError::PathDetection` if no valid path can be
/// determined.
///
/// # Platform Behavior
/// - **Linux**: `$XDG_DATA_HOME/taskline` or `~/.local/share/taskline`
/// - **macOS**: `~/Library/Application Support/taskline`
/// - **Windows**: `%APPDATA%/taskline`
pub fn detect_taskline_paths() -> Result<TasklinePaths, CredentialsError> {
    // 1. Check environment variable override
    if let Ok(custom_dir) = env::var(DATA_DIR_ENV_VAR) {
        let data_dir = PathBuf::from(&custom_dir);
        info!("Using {DATA_DIR_ENV_VAR} override: {:?}", data_dir);
        return Ok(TasklinePaths::new(data_dir, PathSource::EnvVar));
    }

    // 2. Try platform-specific detection via dirs crate
    if let Some(base) = dirs::data_local_dir() {
        let data_dir = base.join(APP_DIR_NAME);
        debug!("Platform data dir: {:?}", data_dir);
        return Ok(TasklinePaths::new(data_dir, PathSource::PlatformDefault));
    }

    // 3. Platform-specific fallbacks
    #[cfg(target_os = "linux")]
    {
        if let Ok(home) = env::var("HOME") {
            let data_dir = PathBuf::from(home).join(".local/share").join(APP_DIR_NAME);
            warn!("Using Linux fallback path: {:?}", data_dir);
            return Ok(TasklinePaths::new(data_dir, PathSource::LinuxFallback));
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = env::var("HOME") {
            let data_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR_NAME);
            warn!("Using macOS fallback path: {:?}", data_dir);
            return Ok(TasklinePaths::new(data_dir, PathSource::MacOSFallback));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = env::var("APPDATA") {
            let data_dir = PathBuf::from(appdata).join(APP_DIR_NAME);
            warn!("Using Windows fallback path: {:?}", data_dir);
            return Ok(TasklinePaths::new(data_dir, PathSource::WindowsFallback));
        }
    }

    // No valid path could be determined
    Err(CredentialsError::path_detection(format!(
        "Cannot determine taskline data directory. Set {DATA_DIR_ENV_VAR} environment variable."
    )))
}
