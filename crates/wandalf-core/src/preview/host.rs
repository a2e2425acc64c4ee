//! Preview handles and the hosts that own the documents behind them.

use crate::error::{Result, WandalfError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Media type of composed preview documents.
pub const HTML_MEDIA_TYPE: &str = "text/html";

/// Opaque, revocable reference to a published preview document.
///
/// The string form is something a renderer can open: a `blob:` style token
/// for the in-memory host, a `file://` URL for the file-backed host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owner of published preview documents.
///
/// `publish` acquires a document slot and `revoke` releases it. Hosts never
/// revoke on their own; whoever replaces a handle revokes the old one.
pub trait PreviewHost: Send + Sync {
    /// Stores `document` and returns a handle to it.
    fn publish(&self, document: Vec<u8>, media_type: &str) -> Result<PreviewHandle>;

    /// Releases the document behind `handle`. Unknown handles are ignored.
    fn revoke(&self, handle: &PreviewHandle);

    /// Whether `handle` still refers to a published document.
    fn is_live(&self, handle: &PreviewHandle) -> bool;
}

#[derive(Debug, Clone)]
struct PublishedDocument {
    bytes: Vec<u8>,
    media_type: String,
}

/// Keeps published documents in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPreviewHost {
    documents: Mutex<HashMap<PreviewHandle, PublishedDocument>>,
}

impl InMemoryPreviewHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes and media type published under `handle`.
    pub fn get(&self, handle: &PreviewHandle) -> Option<(Vec<u8>, String)> {
        let documents = self.documents.lock().ok()?;
        documents
            .get(handle)
            .map(|doc| (doc.bytes.clone(), doc.media_type.clone()))
    }

    /// Number of documents currently published.
    pub fn live_count(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or_default()
    }
}

impl PreviewHost for InMemoryPreviewHost {
    fn publish(&self, document: Vec<u8>, media_type: &str) -> Result<PreviewHandle> {
        let handle = PreviewHandle::new(format!("blob:wandalf/{}", uuid::Uuid::new_v4()));
        let mut documents = self
            .documents
            .lock()
            .map_err(|e| WandalfError::io(format!("preview lock poisoned: {e}")))?;
        documents.insert(
            handle.clone(),
            PublishedDocument {
                bytes: document,
                media_type: media_type.to_string(),
            },
        );
        tracing::debug!(handle = %handle, "Published preview document");
        Ok(handle)
    }

    fn revoke(&self, handle: &PreviewHandle) {
        if let Ok(mut documents) = self.documents.lock() {
            if documents.remove(handle).is_some() {
                tracing::debug!(handle = %handle, "Revoked preview document");
            }
        }
    }

    fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.documents
            .lock()
            .map(|docs| docs.contains_key(handle))
            .unwrap_or(false)
    }
}
