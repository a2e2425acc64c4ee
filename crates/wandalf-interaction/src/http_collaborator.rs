//! HTTP client for the Wandalf collaborator services.
//!
//! All four services live under one API base:
//!
//! | Service  | Endpoint            | Body                  |
//! |----------|---------------------|-----------------------|
//! | generate | `POST /api/generate`| JSON `{prompt, platform}` |
//! | image    | `POST /api/image`   | JSON `{prompt}`       |
//! | build    | `POST /api/build`   | JSON `{files, platform}` |
//! | upload   | `POST /api/upload`  | multipart field `image` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use wandalf_core::api::{BuildArtifact, CollaboratorApi, GeneratedApp};
use wandalf_core::config::ServiceConfig;
use wandalf_core::error::{Result, WandalfError};
use wandalf_core::session::{FileMap, Platform};
use wandalf_core::upload::ImageUpload;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    platform: Platform,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct BuildRequest<'a> {
    files: &'a FileMap,
    platform: Platform,
}

/// Envelope shared by the image, build and upload services.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<Value>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl ServiceEnvelope {
    fn details_text(&self) -> Option<String> {
        match self.details.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    fn into_failure(self, fallback: &str) -> WandalfError {
        let details = self.details_text();
        let message = self
            .error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        WandalfError::service_with_details(message, details)
    }
}

/// Talks to the collaborator services over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCollaboratorClient {
    client: Client,
    api_base: String,
}

impl HttpCollaboratorClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| WandalfError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base().to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.api_base, path)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, "POST");
        self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(path, e))
    }
}

fn transport_error(path: &str, err: reqwest::Error) -> WandalfError {
    if err.is_timeout() {
        WandalfError::connectivity(format!("Request to /api/{} timed out", path))
    } else {
        WandalfError::connectivity(format!("Request to /api/{} failed: {}", path, err))
    }
}

/// Builds a service error from a non-2xx response body.
fn map_http_error(status: StatusCode, body: &str) -> WandalfError {
    match serde_json::from_str::<ServiceEnvelope>(body) {
        Ok(envelope) => envelope.into_failure(&format!("HTTP {}", status.as_u16())),
        Err(_) if body.trim().is_empty() => {
            WandalfError::service(format!("HTTP {}", status.as_u16()))
        }
        Err(_) => WandalfError::service(format!("HTTP {}: {}", status.as_u16(), body.trim())),
    }
}

/// Reads a JSON body, turning non-2xx responses into service errors.
async fn read_json<T: DeserializeOwned>(response: Response, service: &str) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| WandalfError::connectivity(format!("Failed to read {} response: {}", service, e)))?;

    if !status.is_success() {
        return Err(map_http_error(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        WandalfError::service(format!("Malformed {} response: {}", service, e))
    })
}

#[async_trait]
impl CollaboratorApi for HttpCollaboratorClient {
    async fn generate(&self, prompt: &str, platform: Platform) -> Result<GeneratedApp> {
        let response = self
            .post_json("generate", &GenerateRequest { prompt, platform })
            .await?;
        let app: GeneratedApp = read_json(response, "generate").await?;
        tracing::info!(platform = %platform, files = app.files.len(), "Generated app");
        Ok(app)
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let response = self.post_json("image", &ImageRequest { prompt }).await?;
        let envelope: ServiceEnvelope = read_json(response, "image").await?;

        match envelope.image.clone() {
            Some(image) if envelope.success && !image.is_empty() => Ok(image),
            _ => Err(envelope.into_failure("Image generation failed")),
        }
    }

    async fn build(&self, files: &FileMap, platform: Platform) -> Result<BuildArtifact> {
        let response = self
            .post_json("build", &BuildRequest { files, platform })
            .await?;
        let envelope: ServiceEnvelope = read_json(response, "build").await?;

        match envelope.download_url.clone() {
            Some(download_url) if envelope.success && !download_url.is_empty() => {
                Ok(BuildArtifact {
                    download_url,
                    summary: envelope.summary,
                })
            }
            _ => Err(envelope.into_failure("Build failed")),
        }
    }

    async fn upload_image(&self, upload: &ImageUpload) -> Result<String> {
        upload.validate()?;

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.media_type)
            .map_err(|e| {
                WandalfError::invalid_input(format!(
                    "Invalid media type '{}': {}",
                    upload.media_type, e
                ))
            })?;
        let form = Form::new().part("image", part);

        let url = self.endpoint("upload");
        tracing::debug!(url = %url, file = %upload.file_name, "POST multipart");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error("upload", e))?;

        let envelope: ServiceEnvelope = read_json(response, "upload").await.map_err(|e| match e {
            WandalfError::Service { message, .. } => WandalfError::upload_failed(message),
            other => other,
        })?;

        match envelope.url {
            Some(url) if envelope.success && !url.is_empty() => Ok(url),
            _ => Err(WandalfError::upload_failed(
                envelope
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "Upload service returned no URL".to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> HttpCollaboratorClient {
        let config = ServiceConfig {
            api_base: server.url(),
            public_root: None,
            request_timeout_secs: 5,
        };
        HttpCollaboratorClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_posts_prompt_and_platform() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::Json(json!({"prompt": "todo app", "platform": "web"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"files":{"index.html":"<h1>Todo</h1>"},"summary":"done"}"#)
            .create_async()
            .await;

        let app = client_for(&server)
            .generate("todo app", Platform::Web)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(app.files["index.html"], "<h1>Todo</h1>");
        assert_eq!(app.summary.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_generate_non_2xx_uses_error_field() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_body(r#"{"error":"model overloaded"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .generate("x", Platform::Ios)
            .await
            .unwrap_err();

        assert_eq!(err, WandalfError::service("model overloaded"));
    }

    #[tokio::test]
    async fn test_image_failure_envelope() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/image")
            .with_status(200)
            .with_body(r#"{"success":false,"error":"unsafe prompt"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .generate_image("draw a logo")
            .await
            .unwrap_err();

        assert_eq!(err, WandalfError::service("unsafe prompt"));
    }

    #[tokio::test]
    async fn test_build_failure_carries_details() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/build")
            .with_status(200)
            .with_body(r#"{"success":false,"error":"gradle failed","details":"line 3"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .build(&FileMap::new(), Platform::Android)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            WandalfError::service_with_details("gradle failed", Some("line 3".into()))
        );
    }

    #[tokio::test]
    async fn test_build_success_reads_download_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/build")
            .with_status(200)
            .with_body(r#"{"success":true,"downloadUrl":"https://cdn.example/app.zip"}"#)
            .create_async()
            .await;

        let artifact = client_for(&server)
            .build(&FileMap::new(), Platform::Web)
            .await
            .unwrap();

        assert_eq!(artifact.download_url, "https://cdn.example/app.zip");
        assert_eq!(artifact.summary, None);
    }

    #[tokio::test]
    async fn test_upload_sends_image_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/upload")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data".into()),
            )
            .match_body(Matcher::Regex(r#"name="image"; filename="cat.png""#.into()))
            .with_status(200)
            .with_body(r#"{"success":true,"url":"https://cdn.example/cat.png"}"#)
            .create_async()
            .await;

        let upload = ImageUpload::new("cat.png", "image/png", vec![1, 2, 3]);
        let url = client_for(&server).upload_image(&upload).await.unwrap();

        mock.assert_async().await;
        assert_eq!(url, "https://cdn.example/cat.png");
    }

    #[tokio::test]
    async fn test_upload_rejection_is_upload_failed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/upload")
            .with_status(413)
            .with_body(r#"{"success":false,"error":"too large"}"#)
            .create_async()
            .await;

        let upload = ImageUpload::new("big.png", "image/png", vec![0; 16]);
        let err = client_for(&server).upload_image(&upload).await.unwrap_err();

        assert_eq!(err, WandalfError::upload_failed("too large"));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image_without_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/upload")
            .expect(0)
            .create_async()
            .await;

        let upload = ImageUpload::new("notes.txt", "text/plain", b"hi".to_vec());
        let err = client_for(&server).upload_image(&upload).await.unwrap_err();

        assert!(err.is_invalid_input());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_service_is_connectivity_error() {
        let config = ServiceConfig {
            api_base: "http://127.0.0.1:9".into(),
            public_root: None,
            request_timeout_secs: 2,
        };
        let client = HttpCollaboratorClient::new(&config).unwrap();

        let err = client.generate("x", Platform::Web).await.unwrap_err();
        assert!(matches!(err, WandalfError::Connectivity(_)));
    }

    #[test]
    fn test_map_http_error_plain_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err, WandalfError::service("HTTP 502: upstream down"));
    }
}
