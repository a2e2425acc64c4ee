//! Preview host that publishes documents as files.
//!
//! Each document is written to `<previews>/<uuid>.<ext>` and addressed by a
//! `file://` URL, so it can be opened in any browser and survives restarts.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;
use wandalf_core::error::{Result, WandalfError};
use wandalf_core::preview::{PreviewHandle, PreviewHost};

const FILE_SCHEME: &str = "file://";

#[derive(Debug, Clone)]
pub struct FilePreviewHost {
    dir: PathBuf,
}

impl FilePreviewHost {
    /// A relative `dir` is resolved against the working directory so that
    /// handles are always absolute `file://` URLs.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let dir = std::path::absolute(&dir).unwrap_or(dir);
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolves `handle` to a file owned by this host.
    ///
    /// Handles pointing outside the previews directory resolve to `None`.
    pub fn path_of(&self, handle: &PreviewHandle) -> Option<PathBuf> {
        let path = PathBuf::from(handle.as_str().strip_prefix(FILE_SCHEME)?);
        let file_name = path.file_name()?;
        (path.parent()? == self.dir).then(|| self.dir.join(file_name))
    }

    fn extension_for(media_type: &str) -> &'static str {
        mime_guess::get_mime_extensions_str(media_type)
            .and_then(|exts| {
                exts.iter()
                    .copied()
                    .find(|ext| *ext == "html")
                    .or_else(|| exts.first().copied())
            })
            .unwrap_or("bin")
    }
}

impl PreviewHost for FilePreviewHost {
    fn publish(&self, document: Vec<u8>, media_type: &str) -> Result<PreviewHandle> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            WandalfError::io(format!(
                "Failed to create previews directory '{}': {}",
                self.dir.display(),
                e
            ))
        })?;

        let path = self.dir.join(format!(
            "{}.{}",
            Uuid::new_v4(),
            Self::extension_for(media_type)
        ));
        fs::write(&path, document).map_err(|e| {
            WandalfError::io(format!(
                "Failed to write preview '{}': {}",
                path.display(),
                e
            ))
        })?;

        let handle = PreviewHandle::new(format!("{FILE_SCHEME}{}", path.display()));
        tracing::debug!(handle = %handle, "Published preview document");
        Ok(handle)
    }

    fn revoke(&self, handle: &PreviewHandle) {
        let Some(path) = self.path_of(handle) else {
            return;
        };
        match fs::remove_file(&path) {
            Ok(()) => tracing::debug!(handle = %handle, "Revoked preview document"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(handle = %handle, "Failed to remove preview: {}", e),
        }
    }

    fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.path_of(handle).is_some_and(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_publish_then_revoke() {
        let dir = TempDir::new().unwrap();
        let host = FilePreviewHost::new(dir.path().join("previews"));

        let handle = host
            .publish(b"<html></html>".to_vec(), "text/html")
            .unwrap();
        let path = host.path_of(&handle).unwrap();

        assert!(handle.as_str().starts_with("file://"));
        assert!(handle.as_str().ends_with(".html"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
        assert!(host.is_live(&handle));

        host.revoke(&handle);
        assert!(!path.exists());
        assert!(!host.is_live(&handle));
    }

    #[test]
    fn test_foreign_handles_are_ignored() {
        let dir = TempDir::new().unwrap();
        let outside = dir.path().join("keep.html");
        fs::write(&outside, "keep").unwrap();
        let host = FilePreviewHost::new(dir.path().join("previews"));

        let foreign = PreviewHandle::new(format!("file://{}", outside.display()));
        host.revoke(&foreign);
        host.revoke(&PreviewHandle::new("blob:http://localhost/abc"));

        assert!(outside.exists());
        assert!(!host.is_live(&foreign));
    }

    #[test]
    fn test_relative_dir_gives_absolute_handles() {
        let host = FilePreviewHost::new("previews");
        assert!(host.dir().is_absolute());
        assert!(host.dir().ends_with("previews"));

        let cwd = std::env::current_dir().unwrap();
        let handle = PreviewHandle::new(format!(
            "file://{}",
            cwd.join("previews").join("page.html").display()
        ));
        assert_eq!(host.path_of(&handle), Some(host.dir().join("page.html")));
    }
}
