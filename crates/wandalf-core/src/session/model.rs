//! Session domain model.
//!
//! This module contains the core Session entity that represents
//! one project in the application's domain layer, together with the
//! patch type used to mutate it.

use super::message::Message;
use super::platform::Platform;
use super::title::{DEFAULT_SESSION_TITLE, derive_title};
use crate::preview::PreviewHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Greeting every new session starts with.
pub const WELCOME_MESSAGE: &str = "Welcome to Wandalf! What would you like to build?";

/// Filename-to-content mapping of a session's generated sources.
pub type FileMap = BTreeMap<String, String>;

/// Reference to a downloadable artifact produced by the build service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildHandle(String);

impl BuildHandle {
    pub fn new(download_url: impl Into<String>) -> Self {
        Self(download_url.into())
    }

    pub fn download_url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents one user project in the application's domain layer.
///
/// A session contains:
/// - The conversation (append-only, chronological)
/// - The generated files for its target platform
/// - Optional preview and build handles derived from those files
/// - Creation and last-update timestamps (milliseconds since the Unix epoch)
///
/// This is the "pure" domain model that business logic operates on,
/// independent of any specific storage format or version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Human-readable session title
    pub title: String,
    /// Platform the generated artifacts target
    pub platform: Platform,
    /// Conversation in chronological order
    pub messages: Vec<Message>,
    /// Generated source files
    pub files: FileMap,
    /// Handle to the composed preview document, if any
    pub preview: Option<PreviewHandle>,
    /// Handle to the last successful build, if any
    pub build: Option<BuildHandle>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Session {
    /// Creates a fresh session with the welcome greeting as its only message.
    pub fn new(
        id: impl Into<String>,
        platform: Platform,
        title: impl Into<String>,
        now: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            platform,
            messages: vec![Message::assistant_text(WELCOME_MESSAGE)],
            files: FileMap::new(),
            preview: None,
            build: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(Message::is_from_user)
    }

    /// Whether the user has written anything yet. Uploaded images don't count.
    pub fn has_user_text(&self) -> bool {
        self.messages.iter().any(Message::is_user_text)
    }

    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_SESSION_TITLE
    }

    /// Shallow-merges `patch` into this session and bumps `updated_at`.
    ///
    /// Returns the preview handle that the patch displaced, if any. The caller
    /// owns that handle from then on and is expected to revoke it.
    ///
    /// A patch that replaces `files` without also supplying a preview clears
    /// the preview, so a stale document is never paired with new sources.
    pub fn apply(&mut self, patch: SessionPatch, now: i64) -> Option<PreviewHandle> {
        let SessionPatch {
            title,
            platform,
            files,
            preview,
            build,
            append,
        } = patch;

        if let Some(title) = title {
            self.title = title;
        } else if self.has_default_title() && !self.has_user_text() {
            if let Some(text) = append.iter().find(|m| m.is_user_text()).and_then(Message::text) {
                self.title = derive_title(text);
            }
        }

        if let Some(platform) = platform {
            self.platform = platform;
        }

        let preview = match (files, preview) {
            (Some(files), preview) => {
                self.files = files;
                Some(preview.unwrap_or(None))
            }
            (None, preview) => preview,
        };

        let mut displaced = None;
        if let Some(next) = preview {
            if self.preview != next {
                displaced = std::mem::replace(&mut self.preview, next);
            }
        }

        if let Some(build) = build {
            self.build = build;
        }

        self.messages.extend(append);
        self.updated_at = self.updated_at.max(now);

        displaced
    }
}

/// A partial update to a [`Session`].
///
/// Absent fields are left untouched. `preview` and `build` use a nested
/// `Option` so that a patch can distinguish "leave as is" (`None`) from
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub platform: Option<Platform>,
    pub files: Option<FileMap>,
    pub preview: Option<Option<PreviewHandle>>,
    pub build: Option<Option<BuildHandle>>,
    /// Messages appended after the existing conversation.
    pub append: Vec<Message>,
}

impl SessionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Switches platform and clears everything generated for the old one.
    pub fn switch_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self.files = Some(FileMap::new());
        self.preview = Some(None);
        self.build = Some(None);
        self
    }

    pub fn files(mut self, files: FileMap) -> Self {
        self.files = Some(files);
        self
    }

    pub fn preview(mut self, preview: Option<PreviewHandle>) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn build(mut self, build: Option<BuildHandle>) -> Self {
        self.build = Some(build);
        self
    }

    pub fn append(mut self, message: Message) -> Self {
        self.append.push(message);
        self
    }
}
