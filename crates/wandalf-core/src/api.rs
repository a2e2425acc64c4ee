//! Collaborator service interface.
//!
//! The workbench talks to four remote services: code generation, image
//! generation, packaging builds and image upload. This trait is the seam
//! between the orchestration layer and whatever transport reaches them.

use crate::error::Result;
use crate::session::{FileMap, Platform};
use crate::upload::ImageUpload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Files produced by the generate service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedApp {
    #[serde(default)]
    pub files: FileMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A successful build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildArtifact {
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[async_trait]
pub trait CollaboratorApi: Send + Sync {
    /// Generates source files for `prompt` on `platform`.
    async fn generate(&self, prompt: &str, platform: Platform) -> Result<GeneratedApp>;

    /// Generates an image and returns its reference (URL or data URL).
    async fn generate_image(&self, prompt: &str) -> Result<String>;

    /// Packages `files` for `platform`.
    async fn build(&self, files: &FileMap, platform: Platform) -> Result<BuildArtifact>;

    /// Uploads an image and returns the URL it is served from.
    async fn upload_image(&self, upload: &ImageUpload) -> Result<String>;
}
