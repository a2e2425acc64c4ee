//! Session title derivation.

/// Title given to freshly created sessions.
pub const DEFAULT_SESSION_TITLE: &str = "New Project";

/// Title used when the first message carries no visible text.
pub const UNTITLED: &str = "Untitled";

/// Maximum number of characters kept from the first message.
pub const TITLE_MAX_CHARS: usize = 48;

const ELLIPSIS: char = '…';

/// Derives a session title from the first user message.
///
/// Whitespace runs collapse to a single space and the result is trimmed.
/// Anything longer than [`TITLE_MAX_CHARS`] is cut and marked with `…`.
pub fn derive_title(text: &str) -> String {
    let clean = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.is_empty() {
        return UNTITLED.to_string();
    }

    if clean.chars().count() > TITLE_MAX_CHARS {
        let mut title: String = clean.chars().take(TITLE_MAX_CHARS).collect();
        title.push(ELLIPSIS);
        title
    } else {
        clean
    }
}
