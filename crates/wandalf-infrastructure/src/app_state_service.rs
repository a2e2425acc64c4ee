//! Application state service implementation.
//!
//! Remembers which session was active so the next run reopens it.

use crate::dto::create_app_state_migrator;
use std::path::PathBuf;
use std::sync::Mutex;
use version_migrate::{FileStorage, FileStorageStrategy, FormatStrategy, LoadBehavior};
use wandalf_core::app_state::AppState;
use wandalf_core::error::{Result, WandalfError};

const ENTITY: &str = "app_state";

pub struct AppStateService {
    storage: Mutex<FileStorage>,
}

impl AppStateService {
    /// Opens (or creates) the state file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let strategy = FileStorageStrategy::new()
            .with_format(FormatStrategy::Toml)
            .with_load_behavior(LoadBehavior::CreateIfMissing);

        let storage = FileStorage::new(path, create_app_state_migrator(), strategy)
            .map_err(|e| WandalfError::config(format!("Failed to open app state: {}", e)))?;

        Ok(Self {
            storage: Mutex::new(storage),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, FileStorage>> {
        self.storage
            .lock()
            .map_err(|e| WandalfError::io(format!("app state lock poisoned: {}", e)))
    }

    pub fn load(&self) -> AppState {
        let states: Result<Vec<AppState>> = self.lock().and_then(|storage| {
            storage
                .query(ENTITY)
                .map_err(|e| WandalfError::config(format!("Failed to query {}: {}", ENTITY, e)))
        });

        match states {
            Ok(states) => states.into_iter().next().unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to read app state: {}", e);
                AppState::default()
            }
        }
    }

    pub fn active_session_id(&self) -> Option<String> {
        self.load().active_session_id
    }

    pub fn set_active_session_id(&self, id: Option<String>) -> Result<()> {
        let state = AppState {
            active_session_id: id,
        };
        self.lock()?
            .update_and_save(ENTITY, vec![state])
            .map_err(|e| WandalfError::config(format!("Failed to save {}: {}", ENTITY, e)))
    }
}
