//! In-memory session repository.

use super::model::Session;
use super::repository::SessionRepository;
use crate::error::{Result, WandalfError};
use std::sync::Mutex;

/// Keeps the session collection in process memory.
///
/// Used for ephemeral runs and as the repository double in tests. Every
/// successful save is counted so callers can assert how many persistence
/// writes an operation caused. A repository can be told to fail reads or
/// writes.
#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    sessions: Mutex<Vec<Session>>,
    saves: Mutex<usize>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sessions(sessions: Vec<Session>) -> Self {
        Self {
            sessions: Mutex::new(sessions),
            ..Self::default()
        }
    }

    /// A repository whose every `save_all` fails with an IO error.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// A repository holding `sessions` whose `load_all` always fails.
    pub fn failing_reads(sessions: Vec<Session>) -> Self {
        Self {
            sessions: Mutex::new(sessions),
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Number of successful `save_all` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|count| *count).unwrap_or_default()
    }

    /// Snapshot of what is currently stored.
    pub fn stored(&self) -> Vec<Session> {
        self.sessions
            .lock()
            .map(|sessions| sessions.clone())
            .unwrap_or_default()
    }
}

impl SessionRepository for MemorySessionRepository {
    fn load_all(&self) -> Result<Vec<Session>> {
        if self.fail_reads {
            return Err(WandalfError::io("storage is unreadable"));
        }
        self.sessions
            .lock()
            .map(|sessions| sessions.clone())
            .map_err(|e| WandalfError::io(format!("session lock poisoned: {e}")))
    }

    fn save_all(&self, sessions: &[Session]) -> Result<()> {
        if self.fail_writes {
            return Err(WandalfError::io("storage is read-only"));
        }

        let mut stored = self
            .sessions
            .lock()
            .map_err(|e| WandalfError::io(format!("session lock poisoned: {e}")))?;
        *stored = sessions.to_vec();

        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
