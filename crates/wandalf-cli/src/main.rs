//! Wandalf CLI
//!
//! # Configuration
//!
//! - `config.toml` in the config directory (created with defaults)
//! - `WANDALF_API_BASE`, `WANDALF_PUBLIC_ROOT` environment overrides
//! - `--api-base` (highest priority)
//!
//! `--data-dir` keeps config, sessions, state and previews in one directory.

mod commands;
mod context;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wandalf_core::session::Platform;

use crate::context::AppContext;

#[derive(Parser, Debug)]
#[command(name = "wandalf")]
#[command(version, about = "Wandalf CLI - describe an app, get files, a preview and a build", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Keep config, sessions and previews in DIR
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Override the collaborator API base (also: WANDALF_API_BASE)
    #[arg(long, global = true, value_name = "URL")]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List sessions, newest first
    List,
    /// Create a session and make it active
    New {
        #[arg(short, long, default_value = "web")]
        platform: Platform,
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Make a session active (id or unique id prefix)
    Select { id: String },
    /// Delete a session (id or unique id prefix)
    Delete { id: String },
    /// Rename the active session
    Rename {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Switch the active session's platform (clears files, preview and build)
    Platform { platform: Platform },
    /// Send a prompt to the active session
    Cast {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Build the active session's files
    Build,
    /// Upload an image and add it to index.html
    Upload { path: PathBuf },
    /// Compose the active session's preview document
    Preview {
        /// Write the document to FILE instead of stdout
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Publish through the preview host and print its handle
        #[arg(long, conflicts_with = "out")]
        publish: bool,
    },
    /// Show the active session's conversation and files
    Show,
}

fn init_tracing(debug: bool, verbose: bool) {
    let filter = if debug {
        EnvFilter::new("debug,hyper=warn,h2=warn,reqwest=warn,rustls=warn")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.verbose);

    let ctx = AppContext::open(cli.data_dir, cli.api_base)?;

    match cli.command {
        Commands::List => commands::session::list(&ctx).await,
        Commands::New { platform, title } => commands::session::create(&ctx, platform, title).await,
        Commands::Select { id } => commands::session::select(&ctx, &id).await?,
        Commands::Delete { id } => commands::session::delete(&ctx, &id).await?,
        Commands::Rename { title } => commands::session::rename(&ctx, &title.join(" ")).await,
        Commands::Platform { platform } => commands::session::platform(&ctx, platform).await,
        Commands::Cast { prompt } => commands::turn::cast(&ctx, &prompt.join(" ")).await?,
        Commands::Build => commands::turn::build(&ctx).await,
        Commands::Upload { path } => commands::turn::upload(&ctx, &path).await?,
        Commands::Preview { out, publish } => {
            commands::preview::run(&ctx, out.as_deref(), publish).await?
        }
        Commands::Show => commands::session::show(&ctx).await,
    }

    ctx.remember_active().await;
    Ok(())
}
