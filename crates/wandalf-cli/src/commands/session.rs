use anyhow::{Result, bail};
use colored::Colorize;
use wandalf_core::session::{DEFAULT_SESSION_TITLE, Platform, Session};

use crate::context::AppContext;
use crate::render;

/// Resolves a full id or a unique id prefix.
pub fn resolve_id(sessions: &[Session], needle: &str) -> Result<String> {
    if let Some(exact) = sessions.iter().find(|s| s.id == needle) {
        return Ok(exact.id.clone());
    }

    let matches: Vec<&Session> = sessions.iter().filter(|s| s.id.starts_with(needle)).collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => bail!("No session matches '{}'", needle),
        _ => bail!("'{}' matches {} sessions; use a longer prefix", needle, matches.len()),
    }
}

pub async fn list(ctx: &AppContext) {
    let sessions = ctx.workbench.sessions().await;
    let active = ctx.workbench.active().await.map(|s| s.id);

    for session in &sessions {
        println!(
            "{}",
            render::session_line(session, active.as_deref() == Some(session.id.as_str()))
        );
    }
}

pub async fn create(ctx: &AppContext, platform: Platform, title: Option<String>) {
    let title = title.unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string());
    let id = ctx.workbench.create_session(platform, title).await;
    println!("{}", format!("Created session {}", render::short_id(&id)).green());
}

pub async fn select(ctx: &AppContext, needle: &str) -> Result<()> {
    let id = resolve_id(&ctx.workbench.sessions().await, needle)?;
    ctx.workbench.select(&id).await;
    if let Some(session) = ctx.workbench.active().await {
        println!("{}", render::session_line(&session, true));
    }
    Ok(())
}

pub async fn delete(ctx: &AppContext, needle: &str) -> Result<()> {
    let id = resolve_id(&ctx.workbench.sessions().await, needle)?;
    ctx.workbench.delete(&id).await;
    println!("{}", format!("Deleted session {}", render::short_id(&id)).yellow());
    Ok(())
}

pub async fn rename(ctx: &AppContext, title: &str) {
    if ctx.workbench.rename(title).await {
        println!("{}", format!("Renamed to '{}'", title).green());
    }
}

pub async fn platform(ctx: &AppContext, platform: Platform) {
    if ctx.workbench.change_platform(platform).await {
        println!(
            "{}",
            format!("Platform set to {}; files, preview and build cleared", platform).yellow()
        );
    }
}

pub async fn show(ctx: &AppContext) {
    match ctx.workbench.active().await {
        Some(session) => print!("{}", render::session_details(&session)),
        None => println!("{}", "No active session".yellow()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions() -> Vec<Session> {
        vec![
            Session::new("abc-111", Platform::Web, "A", 0),
            Session::new("abd-222", Platform::Web, "B", 0),
        ]
    }

    #[test]
    fn test_resolve_unique_prefix() {
        assert_eq!(resolve_id(&sessions(), "abd").unwrap(), "abd-222");
        assert_eq!(resolve_id(&sessions(), "abc-111").unwrap(), "abc-111");
    }

    #[test]
    fn test_resolve_rejects_ambiguous_and_unknown() {
        assert!(resolve_id(&sessions(), "ab").is_err());
        assert!(resolve_id(&sessions(), "zzz").is_err());
    }
}
