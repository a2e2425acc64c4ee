//! Preview composition.
//!
//! Turns a session's file mapping into one self-contained HTML document that
//! can be rendered in a sandbox without access to the other files.

use super::host::{HTML_MEDIA_TYPE, PreviewHandle, PreviewHost};
use super::markup;
use crate::error::Result;
use crate::session::FileMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Conventional name of the entry document.
pub const ENTRY_FILE: &str = "index.html";
/// Conventional name of the stylesheet inlined into the head.
pub const STYLE_FILE: &str = "style.css";
/// Conventional name of the script inlined at the end of the body.
pub const SCRIPT_FILE: &str = "script.js";

/// Visible marker of the placeholder document.
pub const MISSING_ENTRY_MARKER: &str = "Missing index.html";

const PLACEHOLDER_DOCUMENT: &str = "<!doctype html><html><head><meta charset=\"utf-8\"></head><body><h1>Missing index.html</h1></body></html>";

const BASELINE_RESET: &str = "*,*::before,*::after{box-sizing:border-box;margin:0;padding:0}\
html,body{min-height:100%;background:#0f172a;color:#e2e8f0}\
img,video,canvas,svg,picture{max-width:100%;height:auto;display:block}";

static STYLE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<link\b[^>]*\bhref\s*=\s*["']?(?:\./|/)?style\.css["']?[^>]*>"#).unwrap()
});

static SCRIPT_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<script\b[^>]*\bsrc\s*=\s*["']?(?:\./|/)?script\.js["']?[^>]*>\s*</script\s*>"#,
    )
    .unwrap()
});

/// Composes the preview document for `files`.
///
/// `public_root` is the collaborator service's public root; it becomes the
/// document's `<base href>` so relative references resolve from a detached
/// rendering context. The result depends only on the inputs.
pub fn compose_document(files: &FileMap, public_root: &str) -> String {
    let entry = files
        .get(ENTRY_FILE)
        .map(String::as_str)
        .unwrap_or(PLACEHOLDER_DOCUMENT);

    let without_link = markup::remove_all(entry, &STYLE_LINK);
    let stripped = markup::remove_all(&without_link, &SCRIPT_TAG);
    let doc = markup::ensure_skeleton(&stripped);

    let base = format!("<base href=\"{}\">", markup::escape_attr(&base_href(public_root)));
    let doc = markup::insert_after_head_open(&doc, &base);

    let css = files.get(STYLE_FILE).map(String::as_str).unwrap_or_default();
    let styles = format!("<style>{BASELINE_RESET}</style><style>{css}</style>");
    let doc = markup::insert_before_head_close(&doc, &styles);

    match files.get(SCRIPT_FILE).filter(|js| !js.trim().is_empty()) {
        Some(js) => markup::insert_at_body_end(&doc, &format!("<script>{js}</script>")),
        None => doc,
    }
}

/// Composes `files` and publishes the result through `host`.
///
/// Previously published handles are left alone; replacing and revoking them
/// is the caller's job.
pub fn publish_preview(
    files: &FileMap,
    public_root: &str,
    host: &dyn PreviewHost,
) -> Result<PreviewHandle> {
    let document = compose_document(files, public_root);
    host.publish(document.into_bytes(), HTML_MEDIA_TYPE)
}

fn base_href(public_root: &str) -> String {
    format!("{}/", public_root.trim_end_matches('/'))
}
