//! Preview composition and hosting.
//!
//! - `composer`: builds one self-contained document from a file mapping
//! - `host`: publishes documents behind revocable handles

mod composer;
mod host;
pub(crate) mod markup;

pub use composer::{
    ENTRY_FILE, MISSING_ENTRY_MARKER, SCRIPT_FILE, STYLE_FILE, compose_document, publish_preview,
};
pub use host::{HTML_MEDIA_TYPE, InMemoryPreviewHost, PreviewHandle, PreviewHost};
