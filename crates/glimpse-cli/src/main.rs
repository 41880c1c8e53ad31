//! Glimpse CLI - page geometry for visual regression
//!
//! Usage:
//!   glimpse init [path]             Write default .glimpse/config.toml
//!   glimpse live <url>              Resolve page info in headless Chrome
//!   glimpse snapshot <dump.xml>     Resolve page info from a UI-tree dump

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glimpse_browser::{
    resolve_page_info, BackendAdapter, BrowserSession, FileSnapshotDriver, LiveAdapter,
    ResolveRequest, SnapshotAdapter,
};
use glimpse_core::{ExclusionSpec, GlimpseConfig, PageInfo, Rect};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "glimpse")]
#[command(author, version, about = "Page geometry for visual regression testing")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .glimpse/config.toml
    Init {
        /// Project path (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Resolve page info for a URL in a live browser
    Live {
        /// URL to load
        url: String,

        /// Attach to a running Chrome on this DevTools port instead of launching one
        #[arg(long)]
        port: Option<u16>,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Resolve page info from a UI-tree dump file
    Snapshot {
        /// XML UI-tree dump
        dump: PathBuf,

        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Selector or UI-tree query of the element under test
    #[arg(long)]
    elem: Option<String>,

    /// Selector or UI-tree query of a region to mask (repeatable)
    #[arg(long, value_name = "QUERY")]
    exclude: Vec<String>,

    /// Literal region to mask as x0,y0,x1,y1 (repeatable)
    #[arg(long, value_name = "X0,Y0,X1,Y1", value_parser = parse_rect)]
    exclude_rect: Vec<Rect>,

    /// Directory containing .glimpse/config.toml
    #[arg(long, default_value = ".")]
    config_root: PathBuf,
}

fn parse_rect(s: &str) -> std::result::Result<Rect, String> {
    let coords = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("Invalid coordinate in '{}': {}", s, e))?;

    match coords.as_slice() {
        &[x0, y0, x1, y1] => Ok(Rect::new(x0, y0, x1, y1)),
        _ => Err(format!("Expected 4 coordinates, got {}", coords.len())),
    }
}

impl TargetArgs {
    /// Build the resolution request; configured default exclusions come first
    fn into_request(self, config: &GlimpseConfig) -> ResolveRequest {
        let mut exclude: Vec<Value> = config.default_exclude.clone();
        exclude.extend(self.exclude.into_iter().map(Value::String));
        exclude.extend(
            self.exclude_rect
                .into_iter()
                .map(|rect| Value::from(ExclusionSpec::LiteralRect(rect))),
        );

        ResolveRequest {
            target: self.elem,
            exclude: (!exclude.is_empty()).then_some(Value::Array(exclude)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => cmd_init(&path),
        Commands::Live { url, port, target } => cmd_live(&url, port, target).await,
        Commands::Snapshot { dump, target } => cmd_snapshot(dump, target).await,
    }
}

fn cmd_init(path: &Path) -> Result<()> {
    GlimpseConfig::write_default(path).context("Failed to write default config")?;
    println!("Initialized Glimpse in {:?}", path);
    println!("Created:");
    println!("  .glimpse/config.toml");
    Ok(())
}

async fn cmd_live(url: &str, port: Option<u16>, target: TargetArgs) -> Result<()> {
    let config = GlimpseConfig::load_or_default(&target.config_root).context("Failed to load config")?;

    let session = match port {
        Some(port) => BrowserSession::connect(port)
            .await
            .with_context(|| format!("Failed to connect to browser on port {}", port))?,
        None => BrowserSession::launch_with_settings(&config.browser)
            .await
            .context("Failed to launch browser")?,
    };
    session.navigate(url).await?;

    let adapter = BackendAdapter::Live(LiveAdapter::new(Arc::new(session)));
    let info = resolve_page_info(&adapter, &target.into_request(&config))
        .await
        .with_context(|| format!("Failed to resolve page info for {}", url))?;

    print_page_info(&info)
}

async fn cmd_snapshot(dump: PathBuf, target: TargetArgs) -> Result<()> {
    let config = GlimpseConfig::load_or_default(&target.config_root).context("Failed to load config")?;
    info!("Resolving against UI-tree dump {}", dump.display());

    let adapter = BackendAdapter::Snapshot(SnapshotAdapter::new(Arc::new(FileSnapshotDriver::new(&dump))));
    let info = resolve_page_info(&adapter, &target.into_request(&config))
        .await
        .with_context(|| format!("Failed to resolve page info from {}", dump.display()))?;

    print_page_info(&info)
}

fn print_page_info(info: &PageInfo) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(info)?);
    Ok(())
}
