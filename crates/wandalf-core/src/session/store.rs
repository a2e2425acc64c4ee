use super::message::Message;
use super::model::{Session, SessionPatch};
use super::platform::Platform;
use super::repository::SessionRepository;
use super::title::DEFAULT_SESSION_TITLE;
use crate::preview::{PreviewHandle, PreviewHost};
use std::sync::Arc;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Owns the device's sessions and the active selection.
///
/// `SessionStore` is the single source of truth for session state:
/// - Sessions are kept newest first
/// - Exactly one session is active, or none when the list is empty
/// - Every transition writes the whole collection back to the repository
/// - Preview handles displaced by a transition are revoked on the host
///
/// Persistence is best effort. A failed write is logged and the in-memory
/// state stays as it is. When the stored collection could not be read, the
/// store runs without writing so the unread data is never overwritten.
pub struct SessionStore {
    sessions: Vec<Session>,
    active_id: Option<String>,
    repository: Arc<dyn SessionRepository>,
    previews: Arc<dyn PreviewHost>,
    writable: bool,
}

impl SessionStore {
    /// Loads the stored collection and activates its first session.
    ///
    /// Absent or unreadable storage yields an empty store. Unreadable storage
    /// also suspends persistence for the lifetime of the store. Preview
    /// handles that the host no longer knows are dropped, since they cannot
    /// be rendered any more.
    pub fn load(repository: Arc<dyn SessionRepository>, previews: Arc<dyn PreviewHost>) -> Self {
        let (mut sessions, writable) = match repository.load_all() {
            Ok(sessions) => (sessions, true),
            Err(e) => {
                tracing::warn!("Failed to load sessions, starting empty without saving: {}", e);
                (Vec::new(), false)
            }
        };

        for session in &mut sessions {
            if let Some(handle) = &session.preview {
                if !previews.is_live(handle) {
                    tracing::debug!(session_id = %session.id, "Dropping stale preview handle");
                    session.preview = None;
                }
            }
        }

        let active_id = sessions.first().map(|s| s.id.clone());
        tracing::info!(count = sessions.len(), "Loaded sessions");

        Self {
            sessions,
            active_id,
            repository,
            previews,
            writable,
        }
    }

    // ============================================================================
    // Read accessors
    // ============================================================================

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&Session> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Whether transitions are written back to the repository.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    // ============================================================================
    // Transitions
    // ============================================================================

    /// Creates a session, puts it first and makes it active.
    ///
    /// Returns the new session's id.
    pub fn create(&mut self, platform: Platform, title: impl Into<String>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Session::new(id.clone(), platform, title, now_millis());
        tracing::info!(session_id = %id, platform = %platform, "Created session");

        self.sessions.insert(0, session);
        self.active_id = Some(id.clone());
        self.persist();
        id
    }

    /// Creates the default web session when the store is empty.
    ///
    /// Returns the id of the active session afterwards.
    pub fn ensure_session(&mut self) -> String {
        match self.active_id.clone() {
            Some(id) if !self.sessions.is_empty() => id,
            _ if !self.sessions.is_empty() => {
                let id = self.sessions[0].id.clone();
                self.active_id = Some(id.clone());
                id
            }
            _ => self.create(Platform::Web, DEFAULT_SESSION_TITLE),
        }
    }

    /// Makes `id` the active session. Unknown ids are ignored.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            tracing::debug!(session_id = %id, "Ignoring selection of unknown session");
            return false;
        }
        self.active_id = Some(id.to_string());
        self.persist();
        true
    }

    /// Merges `patch` into the active session. No-op without one.
    pub fn update(&mut self, patch: SessionPatch) -> bool {
        match self.active_id.clone() {
            Some(id) => self.update_session(&id, patch),
            None => {
                tracing::debug!("Ignoring update without an active session");
                false
            }
        }
    }

    /// Merges `patch` into the session `id`, active or not. No-op if absent.
    pub fn update_session(&mut self, id: &str, patch: SessionPatch) -> bool {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            tracing::debug!(session_id = %id, "Ignoring update of unknown session");
            return false;
        };

        let displaced = session.apply(patch, now_millis());
        self.release(displaced);
        self.persist();
        true
    }

    /// Appends one message to the active session.
    pub fn append_message(&mut self, message: Message) -> bool {
        self.update(SessionPatch::new().append(message))
    }

    /// Appends one message to the session `id`.
    pub fn append_message_to(&mut self, id: &str, message: Message) -> bool {
        self.update_session(id, SessionPatch::new().append(message))
    }

    /// Renames the active session.
    pub fn rename(&mut self, title: impl Into<String>) -> bool {
        self.update(SessionPatch::new().title(title))
    }

    /// Switches the active session's platform.
    ///
    /// Files, preview and build are cleared in the same transition.
    pub fn set_platform(&mut self, platform: Platform) -> bool {
        self.update(SessionPatch::new().switch_platform(platform))
    }

    /// Removes session `id`.
    ///
    /// Deleting the active session activates the new first session, or none.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            return false;
        };

        let removed = self.sessions.remove(index);
        self.release(removed.preview);

        if self.active_id.as_deref() == Some(id) {
            self.active_id = self.sessions.first().map(|s| s.id.clone());
        }

        tracing::info!(session_id = %id, "Deleted session");
        self.persist();
        true
    }

    fn release(&self, handle: Option<PreviewHandle>) {
        if let Some(handle) = handle {
            self.previews.revoke(&handle);
        }
    }

    fn persist(&self) {
        if !self.writable {
            tracing::debug!("Skipping session write, storage was not loaded");
            return;
        }
        if let Err(e) = self.repository.save_all(&self.sessions) {
            tracing::warn!("Failed to persist sessions: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::{HTML_MEDIA_TYPE, InMemoryPreviewHost};
    use crate::session::{BuildHandle, FileMap, MemorySessionRepository, Sender};

    struct Fixture {
        repository: Arc<MemorySessionRepository>,
        previews: Arc<InMemoryPreviewHost>,
        store: SessionStore,
    }

    fn fixture_with(repository: MemorySessionRepository) -> Fixture {
        let repository = Arc::new(repository);
        let previews = Arc::new(InMemoryPreviewHost::new());
        let store = SessionStore::load(repository.clone(), previews.clone());
        Fixture {
            repository,
            previews,
            store,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MemorySessionRepository::new())
    }

    #[test]
    fn test_empty_store_has_no_active_session() {
        let f = fixture();
        assert!(f.store.is_empty());
        assert!(f.store.active().is_none());
    }

    #[test]
    fn test_create_puts_newest_first_and_activates() {
        let mut f = fixture();
        let a = f.store.create(Platform::Web, "A");
        let b = f.store.create(Platform::Ios, "B");

        let ids: Vec<_> = f.store.sessions().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![b.as_str(), a.as_str()]);
        assert_eq!(f.store.active_id(), Some(b.as_str()));
        assert_eq!(f.repository.save_count(), 2);
    }

    #[test]
    fn test_ensure_session_creates_default_once() {
        let mut f = fixture();
        let id = f.store.ensure_session();
        assert_eq!(f.store.ensure_session(), id);
        assert_eq!(f.store.sessions().len(), 1);

        let session = f.store.active().unwrap();
        assert_eq!(session.title, DEFAULT_SESSION_TITLE);
        assert_eq!(session.platform, Platform::Web);
    }

    #[test]
    fn test_select_unknown_id_is_noop() {
        let mut f = fixture();
        let a = f.store.create(Platform::Web, "A");
        let saves = f.repository.save_count();

        assert!(!f.store.select("nope"));
        assert_eq!(f.store.active_id(), Some(a.as_str()));
        assert_eq!(f.repository.save_count(), saves);
    }

    #[test]
    fn test_update_without_active_session_is_noop() {
        let mut f = fixture();
        assert!(!f.store.update(SessionPatch::new().title("x")));
        assert!(!f.store.append_message(Message::user_text("hi")));
        assert_eq!(f.repository.save_count(), 0);
    }

    #[test]
    fn test_append_derives_title_and_keeps_order() {
        let mut f = fixture();
        f.store.ensure_session();
        f.store.append_message(Message::user_text("make a login page"));
        f.store.append_message(Message::assistant_text("done"));

        let session = f.store.active().unwrap();
        assert_eq!(session.title, "make a login page");
        let senders: Vec<_> = session.messages.iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::Assistant, Sender::User, Sender::Assistant]
        );
    }

    #[test]
    fn test_platform_switch_is_one_transition() {
        let mut f = fixture();
        f.store.create(Platform::Web, "A");

        let handle = f.previews.publish(b"doc".to_vec(), HTML_MEDIA_TYPE).unwrap();
        let mut files = FileMap::new();
        files.insert("index.html".into(), "<html></html>".into());
        f.store.update(
            SessionPatch::new()
                .files(files)
                .preview(Some(handle.clone()))
                .build(Some(BuildHandle::new("https://dl.example/a.zip"))),
        );

        let saves = f.repository.save_count();
        assert!(f.store.set_platform(Platform::Android));
        assert_eq!(f.repository.save_count(), saves + 1);

        let session = f.store.active().unwrap();
        assert_eq!(session.platform, Platform::Android);
        assert!(session.files.is_empty());
        assert!(session.preview.is_none());
        assert!(session.build.is_none());
        assert!(!f.previews.is_live(&handle));
    }

    #[test]
    fn test_replacing_preview_revokes_previous_handle() {
        let mut f = fixture();
        f.store.create(Platform::Web, "A");

        let first = f.previews.publish(b"1".to_vec(), HTML_MEDIA_TYPE).unwrap();
        let second = f.previews.publish(b"2".to_vec(), HTML_MEDIA_TYPE).unwrap();
        f.store.update(SessionPatch::new().preview(Some(first.clone())));
        f.store.update(SessionPatch::new().preview(Some(second.clone())));

        assert!(!f.previews.is_live(&first));
        assert!(f.previews.is_live(&second));
        assert_eq!(f.previews.live_count(), 1);
    }

    #[test]
    fn test_delete_active_elects_next() {
        let mut f = fixture();
        let b = f.store.create(Platform::Web, "B");
        let a = f.store.create(Platform::Web, "A");
        assert_eq!(f.store.active_id(), Some(a.as_str()));

        assert!(f.store.delete(&a));
        assert_eq!(f.store.active_id(), Some(b.as_str()));

        assert!(f.store.delete(&b));
        assert!(f.store.active_id().is_none());
        assert!(f.store.is_empty());
    }

    #[test]
    fn test_delete_inactive_keeps_selection_and_revokes_preview() {
        let mut f = fixture();
        let b = f.store.create(Platform::Web, "B");
        let handle = f.previews.publish(b"b".to_vec(), HTML_MEDIA_TYPE).unwrap();
        f.store
            .update(SessionPatch::new().preview(Some(handle.clone())));
        let a = f.store.create(Platform::Web, "A");

        assert!(f.store.delete(&b));
        assert_eq!(f.store.active_id(), Some(a.as_str()));
        assert!(!f.previews.is_live(&handle));
    }

    #[test]
    fn test_update_session_targets_inactive_session() {
        let mut f = fixture();
        let b = f.store.create(Platform::Web, "B");
        let a = f.store.create(Platform::Web, "A");

        f.store.append_message_to(&b, Message::assistant_text("late result"));

        assert_eq!(f.store.active_id(), Some(a.as_str()));
        let b_session = f.store.get(&b).unwrap();
        assert_eq!(b_session.messages.last().unwrap().text(), Some("late result"));
        assert_eq!(f.store.get(&a).unwrap().messages.len(), 1);
    }

    #[test]
    fn test_failed_writes_keep_memory_state() {
        let mut f = fixture_with(MemorySessionRepository::failing_writes());
        let id = f.store.create(Platform::Web, "A");
        f.store.rename("Renamed");

        assert_eq!(f.store.active_id(), Some(id.as_str()));
        assert_eq!(f.store.active().unwrap().title, "Renamed");
    }

    #[test]
    fn test_unreadable_storage_is_never_overwritten() {
        let stored = vec![Session::new("keep", Platform::Web, "Keep me", 1)];
        let mut f = fixture_with(MemorySessionRepository::failing_reads(stored.clone()));

        assert!(f.store.is_empty());
        assert!(!f.store.is_writable());

        f.store.ensure_session();
        f.store.rename("Scratch");

        assert_eq!(f.store.sessions().len(), 1);
        assert_eq!(f.repository.save_count(), 0);
        assert_eq!(f.repository.stored(), stored);
    }

    #[test]
    fn test_load_drops_dead_preview_handles() {
        let mut session = Session::new("s-1", Platform::Web, "Old", 1);
        session.preview = Some(PreviewHandle::new("blob:wandalf/gone"));
        let f = fixture_with(MemorySessionRepository::with_sessions(vec![session]));

        let active = f.store.active().unwrap();
        assert_eq!(active.id, "s-1");
        assert!(active.preview.is_none());
    }
}
