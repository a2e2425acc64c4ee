use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use wandalf_application::TurnOutcome;
use wandalf_core::upload::ImageUpload;

use crate::context::AppContext;
use crate::render;

/// Active session id and its message count before an action.
async fn mark(ctx: &AppContext) -> Option<(String, usize)> {
    ctx.workbench
        .active()
        .await
        .map(|s| (s.id, s.messages.len()))
}

/// Prints what an action added to the session it started from.
async fn report(ctx: &AppContext, before: Option<(String, usize)>, outcome: &TurnOutcome) {
    match outcome {
        TurnOutcome::Busy => {
            println!("{}", "A request of this kind is already running".yellow());
            return;
        }
        TurnOutcome::NoActiveSession => {
            println!("{}", "No active session".yellow());
            return;
        }
        _ => {}
    }

    let Some((id, seen)) = before else {
        return;
    };
    let sessions = ctx.workbench.sessions().await;
    let Some(session) = sessions.iter().find(|s| s.id == id) else {
        return;
    };

    for message in session.messages.iter().skip(seen) {
        println!("{}", render::message(message));
    }

    if outcome.is_applied() {
        if let Some(preview) = &session.preview {
            println!("{} {}", "preview:".dimmed(), preview);
        }
    }
}

pub async fn cast(ctx: &AppContext, prompt: &str) -> Result<()> {
    let before = mark(ctx).await;
    let outcome = ctx.workbench.cast(prompt).await?;
    report(ctx, before, &outcome).await;
    Ok(())
}

pub async fn build(ctx: &AppContext) {
    let before = mark(ctx).await;
    let outcome = ctx.workbench.build().await;
    report(ctx, before, &outcome).await;
    if outcome.is_applied() {
        if let Some(build) = ctx.workbench.active().await.and_then(|s| s.build) {
            println!("{} {}", "download:".dimmed(), build.download_url().green());
        }
    }
}

pub async fn upload(ctx: &AppContext, path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let media_type = mime_guess::from_path(path).first_or_octet_stream();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let before = mark(ctx).await;
    let outcome = ctx
        .workbench
        .upload(ImageUpload::new(file_name, media_type.essence_str(), bytes))
        .await?;
    report(ctx, before, &outcome).await;
    Ok(())
}
