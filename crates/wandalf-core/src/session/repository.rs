//! Session repository trait.
//!
//! Defines the interface for session persistence operations.

use super::model::Session;
use crate::error::Result;

/// An abstract repository for the device's session collection.
///
/// The whole collection is one record: it is loaded once at startup and
/// written back in full after every mutation, in list order (newest first).
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Schema versioning and migration of older records
/// - Atomic replacement so an interrupted write never leaves a torn record
pub trait SessionRepository: Send + Sync {
    /// Loads every stored session in list order.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Session>)`: Stored sessions (empty when nothing was stored yet)
    /// - `Err(_)`: Storage exists but could not be read and was left in
    ///   place; callers must not overwrite it
    fn load_all(&self) -> Result<Vec<Session>>;

    /// Replaces the stored collection with `sessions`.
    fn save_all(&self, sessions: &[Session]) -> Result<()>;
}
