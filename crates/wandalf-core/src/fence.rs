//! Code-fence stripping for generated file contents.

use crate::session::FileMap;
use once_cell::sync::Lazy;
use regex::Regex;

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A\s*```[A-Za-z0-9_+.#-]*[ \t]*(?:\r?\n|\z)").unwrap());
static CLOSING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\r?\n)?[ \t]*```[ \t]*\s*\z").unwrap());

/// Removes a leading ```` ```lang ```` line and a trailing ```` ``` ````.
///
/// Content without fences is returned unchanged.
pub fn strip_code_fences(content: &str) -> String {
    let Some(opening) = OPENING_FENCE.find(content) else {
        return content.to_string();
    };

    let body = &content[opening.end()..];
    match CLOSING_FENCE.find(body) {
        Some(closing) => body[..closing.start()].to_string(),
        None => body.to_string(),
    }
}

/// Applies [`strip_code_fences`] to every file.
pub fn strip_fences_in(files: FileMap) -> FileMap {
    files
        .into_iter()
        .map(|(name, content)| {
            let stripped = strip_code_fences(&content);
            (name, stripped)
        })
        .collect()
}
