//! AppState DTOs and migrations

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

use wandalf_core::app_state::AppState;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct AppStateV1_0_0 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_session_id: Option<String>,
}

impl IntoDomain<AppState> for AppStateV1_0_0 {
    fn into_domain(self) -> AppState {
        AppState {
            active_session_id: self.active_session_id,
        }
    }
}

impl FromDomain<AppState> for AppStateV1_0_0 {
    fn from_domain(state: AppState) -> Self {
        AppStateV1_0_0 {
            active_session_id: state.active_session_id,
        }
    }
}

/// Creates and configures a Migrator instance for AppState.
pub fn create_app_state_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let app_state_path = version_migrate::Migrator::define("app_state")
        .from::<AppStateV1_0_0>()
        .into_with_save::<AppState>();

    migrator
        .register(app_state_path)
        .expect("Failed to register app_state migration path");

    migrator
}
