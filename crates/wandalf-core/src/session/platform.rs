//! Target platforms a session can generate for.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The platform a session's generated artifacts are built for.
///
/// Generated files, previews and builds are platform-specific, so changing
/// the platform of a session invalidates all three.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    #[default]
    Web,
    Windows,
    Macos,
    Ios,
    Android,
}

impl Platform {
    /// Whether artifacts for this platform can be previewed as an HTML document.
    pub fn supports_web_preview(self) -> bool {
        matches!(self, Platform::Web)
    }
}
