use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::context::AppContext;

/// Writes the composed preview to `out` or stdout, or publishes it.
pub async fn run(ctx: &AppContext, out: Option<&Path>, publish: bool) -> Result<()> {
    if publish {
        match ctx.workbench.ensure_preview().await? {
            Some(handle) => println!("{}", handle),
            None => println!(
                "{}",
                "Nothing to preview (needs a web session with index.html)".yellow()
            ),
        }
        return Ok(());
    }

    let Some(document) = ctx.workbench.compose_active().await else {
        println!("{}", "No active session".yellow());
        return Ok(());
    };

    match out {
        Some(path) => {
            tokio::fs::write(path, document)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{}", format!("Wrote {}", path.display()).green());
        }
        None => print!("{}", document),
    }
    Ok(())
}
