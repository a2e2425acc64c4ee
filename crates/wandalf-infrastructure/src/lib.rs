pub mod app_state_service;
pub mod config_service;
pub mod dto;
pub mod file_preview_host;
pub mod json_session_repository;
pub mod paths;

pub use crate::app_state_service::AppStateService;
pub use crate::config_service::ConfigService;
pub use crate::file_preview_host::FilePreviewHost;
pub use crate::json_session_repository::JsonSessionRepository;
pub use crate::paths::{PathError, WandalfPaths};
