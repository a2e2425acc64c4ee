//! Wiring of storage, services and the workbench for one CLI run.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use wandalf_application::Workbench;
use wandalf_core::session::SessionStore;
use wandalf_infrastructure::{
    AppStateService, ConfigService, FilePreviewHost, JsonSessionRepository, WandalfPaths,
};
use wandalf_interaction::HttpCollaboratorClient;

pub struct AppContext {
    pub workbench: Workbench,
    app_state: AppStateService,
}

impl AppContext {
    pub fn open(data_dir: Option<PathBuf>, api_base: Option<String>) -> Result<Self> {
        let paths = WandalfPaths::new(data_dir);

        let mut config = ConfigService::new(paths.config_file()?).load();
        if let Some(base) = api_base {
            config.api_base = base;
        }
        tracing::debug!(api_base = %config.api_base(), public_root = %config.public_root(), "Resolved configuration");

        let previews = Arc::new(FilePreviewHost::new(paths.previews_dir()?));
        let repository = Arc::new(JsonSessionRepository::new(paths.sessions_file()?));
        let app_state = AppStateService::new(paths.state_file()?)?;

        let mut store = SessionStore::load(repository, previews.clone());
        if let Some(id) = app_state.active_session_id() {
            if store.active_id() != Some(id.as_str()) {
                store.select(&id);
            }
        }
        store.ensure_session();

        let api = Arc::new(HttpCollaboratorClient::new(&config)?);
        let workbench = Workbench::new(store, api, previews, config.public_root());

        Ok(Self {
            workbench,
            app_state,
        })
    }

    /// Records the active session for the next run.
    pub async fn remember_active(&self) {
        let active = self.workbench.active().await.map(|s| s.id);
        if let Err(e) = self.app_state.set_active_session_id(active) {
            tracing::warn!("Failed to remember active session: {}", e);
        }
    }
}
