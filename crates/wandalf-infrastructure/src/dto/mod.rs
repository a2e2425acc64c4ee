//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema for persisting data.
//! They are private to the infrastructure layer and handle the evolution
//! of the storage format over time.
//!
//! ### Session Version History
//! - **1.0.0**: Browser local-storage layout (camelCase, `sender`/`text` messages)
//! - **2.0.0**: Tagged message payloads, `preview`/`build` handles
//!
//! ### ServiceConfig Version History
//! - **1.0.0**: Initial schema
//!
//! ### AppState Version History
//! - **1.0.0**: Active session id

mod app_state;
mod service_config;
mod session;

// Re-export app_state DTOs and migrator
pub use app_state::{AppStateV1_0_0, create_app_state_migrator};

// Re-export service_config DTOs and migrator
pub use service_config::{ServiceConfigV1_0_0, create_service_config_migrator};

// Re-export session DTOs and migrator
pub use session::{LegacyMessageV1, SessionV1_0_0, SessionV2_0_0, create_session_migrator};
