//! Unified path management for wandalf files.
//!
//! Paths are resolved via AppPaths from the version-migrate crate, unless an
//! explicit base directory is given (tests, `--data-dir`).

use std::path::PathBuf;
use thiserror::Error;
use version_migrate::AppPaths;

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Home directory could not be determined.
    #[error("Cannot find home directory")]
    HomeDirNotFound,
}

/// Path layout for wandalf.
///
/// ```text
/// ~/.config/wandalf/           # Config directory
/// └── config.toml              # Service configuration
///
/// ~/.local/share/wandalf/      # Data directory
/// ├── sessions.json            # All sessions, newest first
/// ├── state.toml               # Last active session
/// └── previews/                # Published preview documents
/// ```
///
/// With a base override, both directories collapse into that base.
#[derive(Debug, Clone, Default)]
pub struct WandalfPaths {
    base: Option<PathBuf>,
}

impl WandalfPaths {
    pub const SESSIONS_FILE: &'static str = "sessions.json";
    pub const CONFIG_FILE: &'static str = "config.toml";
    pub const STATE_FILE: &'static str = "state.toml";
    pub const PREVIEWS_DIR: &'static str = "previews";

    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    fn app_paths() -> AppPaths {
        AppPaths::new("wandalf")
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => Self::app_paths()
                .config_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => Self::app_paths()
                .data_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(Self::CONFIG_FILE))
    }

    pub fn sessions_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join(Self::SESSIONS_FILE))
    }

    pub fn state_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join(Self::STATE_FILE))
    }

    pub fn previews_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join(Self::PREVIEWS_DIR))
    }
}
