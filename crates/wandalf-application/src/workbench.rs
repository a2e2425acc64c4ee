//! Workbench use case.
//!
//! `Workbench` turns user actions into collaborator calls and session
//! updates. It owns the session store behind an async mutex and never holds
//! that lock across a network call.
//!
//! # Late completions
//!
//! Results are written to the session that issued the request, which may no
//! longer be the active one. If that session was deleted meanwhile, the
//! result is dropped. Generated files are also dropped when the session's
//! platform changed while the request was in flight.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::Mutex;

use crate::in_flight::InFlight;
use wandalf_core::api::CollaboratorApi;
use wandalf_core::error::{Result, WandalfError};
use wandalf_core::fence::strip_fences_in;
use wandalf_core::preview::{ENTRY_FILE, PreviewHandle, PreviewHost, compose_document, publish_preview};
use wandalf_core::session::{
    BuildHandle, FileMap, Message, Platform, Session, SessionPatch, SessionStore,
};
use wandalf_core::upload::{ImageUpload, inject_image, upload_and_inject};

/// Prompts that ask for an image rather than an app.
static IMAGE_INTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(image|picture|draw|logo|icon|generate an image|create.*image)").unwrap()
});

pub const NO_FILES_GENERATED: &str = "❌ No files generated.";
pub const NO_FILES_TO_BUILD: &str = "❌ No files to build.";
pub const BUILD_COMPLETE: &str = "✅ Build complete.";
pub const IMAGE_ADDED: &str = "🖼️ Image added to index.html.";
pub const PLATFORM_CHANGED: &str = "⚠️ Platform changed before generation finished; result discarded.";

/// What became of a user action.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The result was written to the originating session.
    Applied,
    /// The action failed; a note was appended to the conversation.
    Failed(WandalfError),
    /// A request of the same category is still in flight. Nothing changed.
    Busy,
    /// There is no active session. Nothing changed.
    NoActiveSession,
    /// The originating session disappeared or moved on; the result was dropped.
    Discarded,
}

impl TurnOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Swallows a `State` error as a no-op outcome.
    fn skipped(error: WandalfError) -> Self {
        tracing::debug!("Nothing to do: {}", error);
        Self::NoActiveSession
    }
}

/// The active session, or a `State` error when there is none.
fn require_active(store: &SessionStore) -> Result<&Session> {
    store.active().ok_or_else(WandalfError::no_active_session)
}

/// Whether a request is an image request.
pub fn is_image_prompt(prompt: &str) -> bool {
    IMAGE_INTENT.is_match(prompt)
}

pub struct Workbench {
    store: Arc<Mutex<SessionStore>>,
    api: Arc<dyn CollaboratorApi>,
    previews: Arc<dyn PreviewHost>,
    public_root: String,
    casting: InFlight,
    building: InFlight,
    uploading: InFlight,
}

impl Workbench {
    pub fn new(
        store: SessionStore,
        api: Arc<dyn CollaboratorApi>,
        previews: Arc<dyn PreviewHost>,
        public_root: impl Into<String>,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            api,
            previews,
            public_root: public_root.into().trim_end_matches('/').to_string(),
            casting: InFlight::default(),
            building: InFlight::default(),
            uploading: InFlight::default(),
        }
    }

    pub fn store(&self) -> Arc<Mutex<SessionStore>> {
        Arc::clone(&self.store)
    }

    pub fn public_root(&self) -> &str {
        &self.public_root
    }

    // ============================================================================
    // Session management
    // ============================================================================

    pub async fn sessions(&self) -> Vec<Session> {
        self.store.lock().await.sessions().to_vec()
    }

    pub async fn active(&self) -> Option<Session> {
        self.store.lock().await.active().cloned()
    }

    pub async fn create_session(&self, platform: Platform, title: impl Into<String>) -> String {
        self.store.lock().await.create(platform, title)
    }

    pub async fn ensure_session(&self) -> String {
        self.store.lock().await.ensure_session()
    }

    pub async fn select(&self, id: &str) -> bool {
        self.store.lock().await.select(id)
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.store.lock().await.delete(id)
    }

    pub async fn rename(&self, title: impl Into<String>) -> bool {
        self.store.lock().await.rename(title)
    }

    /// Switches the active session's platform, clearing files, preview and build.
    pub async fn change_platform(&self, platform: Platform) -> bool {
        let changed = self.store.lock().await.set_platform(platform);
        if changed {
            tracing::info!(platform = %platform, "Switched platform");
        }
        changed
    }

    // ============================================================================
    // Preview
    // ============================================================================

    /// Composes the active session's files into one document.
    pub async fn compose_active(&self) -> Option<String> {
        let store = self.store.lock().await;
        store
            .active()
            .map(|session| compose_document(&session.files, &self.public_root))
    }

    /// Returns a live preview for the active session, publishing one if needed.
    ///
    /// Only web sessions with an entry document get a preview.
    pub async fn ensure_preview(&self) -> Result<Option<PreviewHandle>> {
        let mut store = self.store.lock().await;
        let Some(session) = store.active() else {
            return Ok(None);
        };

        if let Some(handle) = &session.preview {
            if self.previews.is_live(handle) {
                return Ok(Some(handle.clone()));
            }
        }

        if !session.platform.supports_web_preview() || !session.files.contains_key(ENTRY_FILE) {
            return Ok(None);
        }

        let handle = publish_preview(&session.files, &self.public_root, self.previews.as_ref())?;
        store.update(SessionPatch::new().preview(Some(handle.clone())));
        Ok(Some(handle))
    }

    /// Publishes a preview for `files` when `platform` renders in a browser.
    ///
    /// A publishing failure leaves the session without a preview.
    fn preview_for(&self, platform: Platform, files: &FileMap) -> Option<PreviewHandle> {
        if !platform.supports_web_preview() || !files.contains_key(ENTRY_FILE) {
            return None;
        }
        publish_preview(files, &self.public_root, self.previews.as_ref())
            .map_err(|e| tracing::warn!("Failed to publish preview: {}", e))
            .ok()
    }

    // ============================================================================
    // Chat turn
    // ============================================================================

    /// Runs one chat turn against the active session.
    ///
    /// Image-like prompts go to the image service; everything else goes to
    /// the generate service. Service failures become assistant messages.
    pub async fn cast(&self, prompt: &str) -> Result<TurnOutcome> {
        if prompt.trim().is_empty() {
            return Err(WandalfError::invalid_input("Prompt is empty"));
        }

        let Some(_guard) = self.casting.try_begin() else {
            tracing::debug!("Cast already in flight");
            return Ok(TurnOutcome::Busy);
        };

        let (session_id, platform) = {
            let mut store = self.store.lock().await;
            let active = match require_active(&store) {
                Ok(active) => active,
                Err(e) => return Ok(TurnOutcome::skipped(e)),
            };
            let target = (active.id.clone(), active.platform);
            store.update(
                SessionPatch::new()
                    .build(None)
                    .append(Message::user_text(prompt)),
            );
            target
        };

        tracing::info!(session_id = %session_id, platform = %platform, "Casting");

        if is_image_prompt(prompt) {
            let outcome = match self.api.generate_image(prompt).await {
                Ok(reference) => {
                    self.land(
                        &session_id,
                        SessionPatch::new().append(Message::assistant_image(reference)),
                    )
                    .await
                }
                Err(e) => self.fail(&session_id, format!("❌ Failed: {}", e.user_message()), e).await,
            };
            return Ok(outcome);
        }

        let generated = match self.api.generate(prompt, platform).await {
            Ok(generated) => generated,
            Err(e) => {
                return Ok(self
                    .fail(&session_id, format!("❌ Failed: {}", e.user_message()), e)
                    .await);
            }
        };

        let files = strip_fences_in(generated.files);
        if files.is_empty() {
            let outcome = self
                .land(
                    &session_id,
                    SessionPatch::new().append(Message::assistant_text(NO_FILES_GENERATED)),
                )
                .await;
            return Ok(match outcome {
                TurnOutcome::Applied => {
                    TurnOutcome::Failed(WandalfError::service("No files generated"))
                }
                other => other,
            });
        }

        let mut store = self.store.lock().await;
        let current_platform = match store.get(&session_id) {
            Some(session) => session.platform,
            None => {
                tracing::warn!(session_id = %session_id, "Session deleted before generation finished, dropping result");
                return Ok(TurnOutcome::Discarded);
            }
        };
        if current_platform != platform {
            tracing::warn!(
                session_id = %session_id,
                requested = %platform,
                current = %current_platform,
                "Platform changed before generation finished, dropping files"
            );
            store.append_message_to(&session_id, Message::assistant_text(PLATFORM_CHANGED));
            return Ok(TurnOutcome::Discarded);
        }

        let preview = self.preview_for(platform, &files);
        let summary = generated
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("✨ Generated {} app.", platform));

        store.update_session(
            &session_id,
            SessionPatch::new()
                .files(files)
                .preview(preview)
                .append(Message::assistant_text(summary)),
        );
        Ok(TurnOutcome::Applied)
    }

    // ============================================================================
    // Build
    // ============================================================================

    /// Requests a build of the active session's files.
    pub async fn build(&self) -> TurnOutcome {
        let Some(_guard) = self.building.try_begin() else {
            tracing::debug!("Build already in flight");
            return TurnOutcome::Busy;
        };

        let (session_id, platform, files) = {
            let mut store = self.store.lock().await;
            let active = match require_active(&store) {
                Ok(active) => active,
                Err(e) => return TurnOutcome::skipped(e),
            };
            if active.files.is_empty() {
                store.append_message(Message::assistant_text(NO_FILES_TO_BUILD));
                return TurnOutcome::Failed(WandalfError::invalid_input("No files to build"));
            }
            (active.id.clone(), active.platform, active.files.clone())
        };

        tracing::info!(session_id = %session_id, platform = %platform, "Building");

        match self.api.build(&files, platform).await {
            Ok(artifact) => {
                let mut store = self.store.lock().await;
                match store.get(&session_id) {
                    None => {
                        tracing::warn!(session_id = %session_id, "Session deleted before build finished, dropping result");
                        return TurnOutcome::Discarded;
                    }
                    Some(session) if session.platform != platform => {
                        tracing::warn!(session_id = %session_id, "Platform changed before build finished, dropping result");
                        return TurnOutcome::Discarded;
                    }
                    Some(_) => {}
                }

                let note = artifact
                    .summary
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| BUILD_COMPLETE.to_string());
                store.update_session(
                    &session_id,
                    SessionPatch::new()
                        .build(Some(BuildHandle::new(artifact.download_url)))
                        .append(Message::assistant_text(note)),
                );
                TurnOutcome::Applied
            }
            Err(e) => {
                self.fail(&session_id, format!("❌ Build failed: {}", e.user_message()), e)
                    .await
            }
        }
    }

    // ============================================================================
    // Upload
    // ============================================================================

    /// Uploads an image and injects it into the active session's entry document.
    ///
    /// Non-image uploads are rejected with `InvalidInput` before any request.
    pub async fn upload(&self, upload: ImageUpload) -> Result<TurnOutcome> {
        upload.validate()?;

        let Some(_guard) = self.uploading.try_begin() else {
            tracing::debug!("Upload already in flight");
            return Ok(TurnOutcome::Busy);
        };

        let (session_id, snapshot) = {
            let store = self.store.lock().await;
            let active = match require_active(&store) {
                Ok(active) => active,
                Err(e) => return Ok(TurnOutcome::skipped(e)),
            };
            (active.id.clone(), active.files.clone())
        };

        let (url, injected) = match upload_and_inject(self.api.as_ref(), &upload, &snapshot).await {
            Ok(result) => result,
            Err(e) if e.is_invalid_input() => return Err(e),
            Err(e) => {
                return Ok(self
                    .fail(&session_id, format!("❌ Upload failed: {}", e.user_message()), e)
                    .await);
            }
        };

        let mut store = self.store.lock().await;
        let Some(session) = store.get(&session_id) else {
            tracing::warn!(session_id = %session_id, "Session deleted before upload finished, dropping result");
            return Ok(TurnOutcome::Discarded);
        };

        // Files may have moved on while the upload was running.
        let files = if session.files == snapshot {
            injected
        } else {
            inject_image(&session.files, &url)
        };
        let preview = self.preview_for(session.platform, &files);

        store.update_session(
            &session_id,
            SessionPatch::new()
                .files(files)
                .preview(preview)
                .append(Message::user_image(url))
                .append(Message::assistant_text(IMAGE_ADDED)),
        );
        Ok(TurnOutcome::Applied)
    }

    // ============================================================================
    // Landing results
    // ============================================================================

    async fn land(&self, session_id: &str, patch: SessionPatch) -> TurnOutcome {
        if self.store.lock().await.update_session(session_id, patch) {
            TurnOutcome::Applied
        } else {
            tracing::warn!(session_id = %session_id, "Session deleted before request finished, dropping result");
            TurnOutcome::Discarded
        }
    }

    async fn fail(&self, session_id: &str, note: String, error: WandalfError) -> TurnOutcome {
        tracing::warn!(session_id = %session_id, "Request failed: {}", error);
        match self
            .land(session_id, SessionPatch::new().append(Message::assistant_text(note)))
            .await
        {
            TurnOutcome::Applied => TurnOutcome::Failed(error),
            other => other,
        }
    }
}
