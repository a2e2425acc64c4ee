//! Application state that outlives a single run.

use serde::{Deserialize, Serialize};
use version_migrate::DeriveQueryable as Queryable;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq, Queryable)]
#[queryable(entity = "app_state")]
pub struct AppState {
    /// Session that was active when the previous run ended.
    pub active_session_id: Option<String>,
}
