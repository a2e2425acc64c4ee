//! Tag-level HTML helpers shared by the composer and the image injector.
//!
//! These work on raw strings with case-insensitive regexes. They never fail:
//! malformed markup just means a pattern does not match.

use once_cell::sync::Lazy;
use regex::Regex;

static DOCTYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*<!doctype[^>]*>").unwrap());
static HTML_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<html\b[^>]*>").unwrap());
static HEAD_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<head\b[^>]*>").unwrap());
static HEAD_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</head\s*>").unwrap());
static BODY_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<body\b[^>]*>").unwrap());
static BODY_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</body\s*>").unwrap());

/// Inserts `fragment` at byte offset `at`.
fn splice(document: &str, at: usize, fragment: &str) -> String {
    let mut out = String::with_capacity(document.len() + fragment.len());
    out.push_str(&document[..at]);
    out.push_str(fragment);
    out.push_str(&document[at..]);
    out
}

/// Removes every match of `pattern` from `document`.
pub(crate) fn remove_all(document: &str, pattern: &Regex) -> String {
    pattern.replace_all(document, "").into_owned()
}

/// Makes sure the document has an `<html>` root and a `<head>...</head>`.
///
/// Missing pieces are synthesised around the existing markup, which is
/// otherwise left byte-for-byte intact.
pub(crate) fn ensure_skeleton(document: &str) -> String {
    let mut doc = if HTML_OPEN.is_match(document) {
        document.to_string()
    } else {
        let prolog_end = DOCTYPE.find(document).map(|m| m.end()).unwrap_or(0);
        let mut wrapped = String::with_capacity(document.len() + 16);
        wrapped.push_str(&document[..prolog_end]);
        wrapped.push_str("<html>");
        wrapped.push_str(&document[prolog_end..]);
        wrapped.push_str("</html>");
        wrapped
    };

    let html_end = HTML_OPEN.find(&doc).map(|m| m.end()).unwrap_or(0);
    match (HEAD_OPEN.find(&doc), HEAD_CLOSE.is_match(&doc)) {
        (Some(_), true) => {}
        (Some(head), false) => {
            let at = BODY_OPEN
                .find(&doc)
                .map(|body| body.start())
                .filter(|&start| start >= head.end())
                .unwrap_or(head.end());
            doc = splice(&doc, at, "</head>");
        }
        (None, true) => doc = splice(&doc, html_end, "<head>"),
        (None, false) => doc = splice(&doc, html_end, "<head></head>"),
    }
    doc
}

/// Inserts `fragment` right after the first `<head ...>` tag.
pub(crate) fn insert_after_head_open(document: &str, fragment: &str) -> String {
    match HEAD_OPEN.find(document) {
        Some(m) => splice(document, m.end(), fragment),
        None => splice(document, 0, fragment),
    }
}

/// Inserts `fragment` right before the first `</head>`.
pub(crate) fn insert_before_head_close(document: &str, fragment: &str) -> String {
    match HEAD_CLOSE.find(document) {
        Some(m) => splice(document, m.start(), fragment),
        None => insert_after_head_open(document, fragment),
    }
}

/// Inserts `fragment` before the last `</body>`, or appends it.
pub(crate) fn insert_at_body_end(document: &str, fragment: &str) -> String {
    match BODY_CLOSE.find_iter(document).last() {
        Some(m) => splice(document, m.start(), fragment),
        None => {
            let mut out = document.to_string();
            out.push_str(fragment);
            out
        }
    }
}

/// Inserts `fragment` right after the first `<body ...>` tag.
///
/// Returns `None` when the document has no opening body tag.
pub(crate) fn insert_after_body_open(document: &str, fragment: &str) -> Option<String> {
    BODY_OPEN
        .find(document)
        .map(|m| splice(document, m.end(), fragment))
}

/// Escapes a value for use inside a double-quoted attribute.
pub(crate) fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_wraps_bare_fragment() {
        let doc = ensure_skeleton("<h1>Hi</h1>");
        assert_eq!(doc, "<html><head></head><h1>Hi</h1></html>");
    }

    #[test]
    fn test_skeleton_keeps_doctype_first() {
        let doc = ensure_skeleton("<!DOCTYPE html><body>x</body>");
        assert!(doc.starts_with("<!DOCTYPE html><html><head></head><body>"));
    }

    #[test]
    fn test_skeleton_leaves_complete_document_alone() {
        let src = "<!doctype html><HTML lang=\"en\"><Head><title>t</title></HEAD><body></body></HTML>";
        assert_eq!(ensure_skeleton(src), src);
    }

    #[test]
    fn test_skeleton_closes_unterminated_head_before_body() {
        let doc = ensure_skeleton("<html><head><title>t</title><body>x</body></html>");
        assert_eq!(
            doc,
            "<html><head><title>t</title></head><body>x</body></html>"
        );
    }

    #[test]
    fn test_insert_at_body_end_appends_without_body() {
        assert_eq!(insert_at_body_end("<p>x</p>", "<script></script>"), "<p>x</p><script></script>");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("a\"b<c>&"), "a&quot;b&lt;c&gt;&amp;");
    }
}
