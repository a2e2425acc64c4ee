//! Image upload and injection into the entry document.

use crate::api::CollaboratorApi;
use crate::error::{Result, WandalfError};
use crate::preview::{ENTRY_FILE, markup};
use crate::session::FileMap;

/// A user-supplied image waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Rejects anything whose media type is not `image/*`.
    pub fn validate(&self) -> Result<()> {
        if self
            .media_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
        {
            Ok(())
        } else {
            Err(WandalfError::invalid_input(format!(
                "'{}' is not an image (media type '{}')",
                self.file_name, self.media_type
            )))
        }
    }
}

/// Uploads `upload` and splices the returned URL into `files`.
///
/// Validation happens before any network traffic. On failure `files` is not
/// touched; on success the updated mapping is returned together with the URL.
pub async fn upload_and_inject(
    api: &dyn CollaboratorApi,
    upload: &ImageUpload,
    files: &FileMap,
) -> Result<(String, FileMap)> {
    upload.validate()?;

    let url = api.upload_image(upload).await?;
    if url.trim().is_empty() {
        return Err(WandalfError::upload_failed("upload service returned an empty URL"));
    }

    tracing::info!(file = %upload.file_name, url = %url, "Uploaded image");
    let injected = inject_image(files, &url);
    Ok((url, injected))
}

/// Returns a copy of `files` whose entry document shows the image at `url`.
///
/// Without an entry document a new one is synthesised that shows only the
/// image, centred on a dark background. Otherwise an `<img>` is inserted
/// right after the opening body tag (appended if there is none).
pub fn inject_image(files: &FileMap, url: &str) -> FileMap {
    let src = markup::escape_attr(url);
    let mut updated = files.clone();

    let entry = match files.get(ENTRY_FILE) {
        None => image_only_document(&src),
        Some(html) => {
            let img = format!(
                "<img src=\"{src}\" alt=\"Uploaded image\" style=\"max-width:100%;height:auto;\">"
            );
            markup::insert_after_body_open(html, &img).unwrap_or_else(|| format!("{html}{img}"))
        }
    };

    updated.insert(ENTRY_FILE.to_string(), entry);
    updated
}

fn image_only_document(src: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>Uploaded image</title>\n</head>\n\
<body style=\"margin:0;min-height:100vh;display:flex;align-items:center;justify-content:center;background:#0f172a;\">\n\
<img src=\"{src}\" alt=\"Uploaded image\" style=\"max-width:100%;max-height:100vh;\">\n\
</body>\n</html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BuildArtifact, GeneratedApp};
    use crate::session::Platform;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct UploadOnlyApi {
        calls: Mutex<usize>,
        response: Result<String>,
    }

    impl UploadOnlyApi {
        fn new(response: Result<String>) -> Self {
            Self {
                calls: Mutex::new(0),
                response,
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl CollaboratorApi for UploadOnlyApi {
        async fn generate(&self, _prompt: &str, _platform: Platform) -> Result<GeneratedApp> {
            unreachable!("generate is not used by uploads")
        }

        async fn generate_image(&self, _prompt: &str) -> Result<String> {
            unreachable!("generate_image is not used by uploads")
        }

        async fn build(&self, _files: &FileMap, _platform: Platform) -> Result<BuildArtifact> {
            unreachable!("build is not used by uploads")
        }

        async fn upload_image(&self, _upload: &ImageUpload) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            self.response.clone()
        }
    }

    fn png() -> ImageUpload {
        ImageUpload::new("cat.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47])
    }

    #[tokio::test]
    async fn test_non_image_is_rejected_before_network() {
        let api = UploadOnlyApi::new(Ok("https://cdn.example/x".into()));
        let upload = ImageUpload::new("notes.txt", "text/plain", b"hello".to_vec());

        let err = upload_and_inject(&api, &upload, &FileMap::new())
            .await
            .unwrap_err();

        assert!(err.is_invalid_input());
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_injects_into_existing_entry() {
        let api = UploadOnlyApi::new(Ok("https://cdn.example/cat.png".into()));
        let mut files = FileMap::new();
        files.insert(
            "index.html".into(),
            "<html><head></head><BODY class=\"app\"><h1>Hi</h1></body></html>".into(),
        );

        let (url, updated) = upload_and_inject(&api, &png(), &files).await.unwrap();

        assert_eq!(url, "https://cdn.example/cat.png");
        assert_eq!(api.calls(), 1);
        assert_eq!(
            updated["index.html"],
            "<html><head></head><BODY class=\"app\"><img src=\"https://cdn.example/cat.png\" alt=\"Uploaded image\" style=\"max-width:100%;height:auto;\"><h1>Hi</h1></body></html>"
        );
    }

    #[tokio::test]
    async fn test_upload_failure_leaves_files_alone() {
        let api = UploadOnlyApi::new(Err(WandalfError::upload_failed("quota exceeded")));
        let files = FileMap::new();

        let err = upload_and_inject(&api, &png(), &files).await.unwrap_err();

        assert_eq!(err, WandalfError::upload_failed("quota exceeded"));
        assert!(files.is_empty());
    }

    #[test]
    fn test_inject_without_entry_synthesises_document() {
        let mut files = FileMap::new();
        files.insert("style.css".into(), "h1{}".into());

        let updated = inject_image(&files, "https://cdn.example/a.png");
        let html = &updated["index.html"];

        assert!(html.contains("<img src=\"https://cdn.example/a.png\""));
        assert!(html.contains("justify-content:center"));
        assert!(html.contains("background:#0f172a"));
        assert_eq!(updated["style.css"], "h1{}");
    }

    #[test]
    fn test_inject_only_touches_first_body() {
        let mut files = FileMap::new();
        files.insert("index.html".into(), "<body>a</body><body>b</body>".into());

        let updated = inject_image(&files, "u.png");
        assert_eq!(updated["index.html"].matches("<img").count(), 1);
        assert!(updated["index.html"].starts_with("<body><img src=\"u.png\""));
    }

    #[test]
    fn test_media_type_check_is_case_insensitive() {
        assert!(ImageUpload::new("a.PNG", "IMAGE/PNG", Vec::new()).validate().is_ok());
        assert!(ImageUpload::new("a.svg", "image/svg+xml", Vec::new()).validate().is_ok());
        assert!(ImageUpload::new("a.pdf", "application/pdf", Vec::new()).validate().is_err());
    }
}
