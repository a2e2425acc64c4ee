pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod fence;
pub mod preview;
pub mod session;
pub mod upload;

// Re-export common error type
pub use error::WandalfError;
