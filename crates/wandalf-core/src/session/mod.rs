//! Session domain module.
//!
//! This module contains all session-related domain models, the repository
//! interface and the session store.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `SessionPatch`, `BuildHandle`)
//! - `message`: Conversation message types (`Sender`, `Message`, `MessageContent`)
//! - `platform`: Target platforms (`Platform`)
//! - `title`: Title derivation from the first user message
//! - `repository`: Repository trait for session persistence
//! - `memory`: In-memory repository
//! - `store`: Session collection and active selection (`SessionStore`)
//!
//! # Usage
//!
//! ```ignore
//! use wandalf_core::session::{Session, SessionStore, SessionPatch};
//! use wandalf_core::session::{Message, Platform};
//! ```

mod memory;
mod message;
mod model;
mod platform;
mod repository;
mod store;
mod title;

// Re-export public API
pub use memory::MemorySessionRepository;
pub use message::{Message, MessageContent, MessageKind, Sender};
pub use model::{BuildHandle, FileMap, Session, SessionPatch, WELCOME_MESSAGE};
pub use platform::Platform;
pub use repository::SessionRepository;
pub use store::{SessionStore, now_millis};
pub use title::{DEFAULT_SESSION_TITLE, TITLE_MAX_CHARS, UNTITLED, derive_title};
