//! Terminal rendering helpers.

use chrono::{Local, TimeZone};
use colored::Colorize;
use wandalf_core::session::{Message, MessageContent, Sender, Session};

pub fn timestamp(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn session_line(session: &Session, active: bool) -> String {
    let marker = if active { "*".green().bold() } else { " ".normal() };
    format!(
        "{} {}  {:<8} {}  {}",
        marker,
        short_id(&session.id).dimmed(),
        session.platform.as_ref(),
        session.title.bold(),
        timestamp(session.updated_at).dimmed()
    )
}

pub fn message(message: &Message) -> String {
    let who = match message.sender {
        Sender::User => "you".green().bold(),
        Sender::Assistant => "wandalf".cyan().bold(),
    };
    let body = match &message.content {
        MessageContent::Text(text) if text.starts_with('❌') => text.red().to_string(),
        MessageContent::Text(text) => text.clone(),
        MessageContent::Image(reference) => format!("{} {}", "[image]".magenta(), reference),
    };
    format!("{}> {}", who, body)
}

pub fn session_details(session: &Session) -> String {
    let mut out = format!(
        "{} ({})\n",
        session.title.bright_magenta().bold(),
        session.platform.as_ref()
    );
    if let Some(preview) = &session.preview {
        out.push_str(&format!("{} {}\n", "preview:".dimmed(), preview));
    }
    if let Some(build) = &session.build {
        out.push_str(&format!("{} {}\n", "build:".dimmed(), build.download_url()));
    }

    out.push('\n');
    for m in &session.messages {
        out.push_str(&message(m));
        out.push('\n');
    }

    if !session.files.is_empty() {
        out.push_str(&format!("\n{}\n", "files:".dimmed()));
        for (name, content) in &session.files {
            out.push_str(&format!("  {} {}\n", name, format!("({} bytes)", content.len()).dimmed()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wandalf_core::session::Platform;

    #[test]
    fn test_short_id_handles_short_input() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("0123456789"), "01234567");
    }

    #[test]
    fn test_session_details_lists_files() {
        colored::control::set_override(false);
        let mut session = Session::new("id-1", Platform::Web, "Todo", 0);
        session.files.insert("index.html".into(), "<p>hi</p>".into());

        let text = session_details(&session);

        assert!(text.starts_with("Todo (web)"));
        assert!(text.contains("wandalf> Welcome to Wandalf!"));
        assert!(text.contains("index.html (9 bytes)"));
    }
}
