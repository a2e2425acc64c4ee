//! Session DTOs and migrations

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use wandalf_core::preview::PreviewHandle;
use wandalf_core::session::{BuildHandle, FileMap, Message, Platform, Session};

// ============================================================================
// Message DTOs
// ============================================================================

/// Message as written by the browser build of the app.
///
/// Text messages carry `sender` ("user" or "ai") and `text`; image messages
/// carry `type: "image"` and `content`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LegacyMessageV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl LegacyMessageV1 {
    fn into_message(self) -> Message {
        let from_user = self.sender.as_deref() == Some("user");
        if self.kind.as_deref() == Some("image") {
            let reference = self.content.unwrap_or_default();
            return if from_user {
                Message::user_image(reference)
            } else {
                Message::assistant_image(reference)
            };
        }

        let text = self.text.or(self.content).unwrap_or_default();
        if from_user {
            Message::user_text(text)
        } else {
            Message::assistant_text(text)
        }
    }
}

// ============================================================================
// Session DTOs
// ============================================================================

/// Represents V1.0.0 of the session schema (browser local storage layout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionV1_0_0 {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub messages: Vec<LegacyMessageV1>,
    #[serde(default)]
    pub files: FileMap,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Represents V2.0.0 of the session schema.
///
/// Messages use the tagged `kind`/`content` layout and handles are stored
/// under their domain names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0")]
pub struct SessionV2_0_0 {
    pub id: String,
    pub title: String,
    pub platform: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub files: FileMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from SessionV1_0_0 to SessionV2_0_0.
impl MigratesTo<SessionV2_0_0> for SessionV1_0_0 {
    fn migrate(self) -> SessionV2_0_0 {
        let updated_at = self.updated_at.max(self.created_at);
        SessionV2_0_0 {
            id: self.id,
            title: self.title,
            platform: self.platform,
            messages: self
                .messages
                .into_iter()
                .map(LegacyMessageV1::into_message)
                .collect(),
            files: self.files,
            preview: self.preview_url.filter(|url| !url.is_empty()),
            build: self.download_url.filter(|url| !url.is_empty()),
            created_at: self.created_at,
            updated_at,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

fn parse_platform(raw: &str) -> Platform {
    Platform::from_str(raw.trim()).unwrap_or_else(|_| {
        tracing::warn!(platform = %raw, "Unknown platform in stored session, using web");
        Platform::default()
    })
}

/// Convert SessionV2_0_0 DTO to domain model.
impl IntoDomain<Session> for SessionV2_0_0 {
    fn into_domain(self) -> Session {
        Session {
            id: self.id,
            title: self.title,
            platform: parse_platform(&self.platform),
            messages: self.messages,
            files: self.files,
            preview: self.preview.map(PreviewHandle::new),
            build: self.build.map(BuildHandle::new),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Convert domain model to SessionV2_0_0 DTO for persistence.
impl FromDomain<Session> for SessionV2_0_0 {
    fn from_domain(session: Session) -> Self {
        SessionV2_0_0 {
            id: session.id,
            title: session.title,
            platform: session.platform.to_string(),
            messages: session.messages,
            files: session.files,
            preview: session.preview.map(|handle| handle.as_str().to_string()),
            build: session.build.map(|handle| handle.download_url().to_string()),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for Session entities.
///
/// # Migration Path
///
/// - V1.0.0 → V2.0.0: Converts legacy camelCase records and messages
/// - V2.0.0 → Session: Converts DTO to domain model
///
/// # Example
///
/// ```ignore
/// let migrator = create_session_migrator();
/// let session: Session = migrator.load_flat_from("session", json_value)?;
/// ```
pub fn create_session_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    // Register migration path: V1.0.0 -> V2.0.0 -> Session
    let session_path = version_migrate::Migrator::define("session")
        .from::<SessionV1_0_0>()
        .step::<SessionV2_0_0>()
        .into_with_save::<Session>();

    migrator
        .register(session_path)
        .expect("Failed to register session migration path");

    migrator
}
