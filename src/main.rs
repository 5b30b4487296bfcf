use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use newsroom_gallery::{
    Config, GalleryError, GalleryHandle, GallerySession, GalleryView, MediaPayload, OpenOptions,
    create_backend,
};

/// Browse the media attached to a report from the terminal.
#[derive(Debug, Parser)]
#[command(name = "newsroom-gallery", version, about)]
struct Cli {
    /// Report JSON, or just its `files` object
    payload: PathBuf,

    /// Prefix for relative media paths
    #[arg(long, env = "NEWSROOM_MEDIA_BASE_URL")]
    base_url: Option<String>,

    /// Item to start on, 0-based
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Open in the full-screen viewer
    #[arg(long)]
    fullscreen: bool,

    /// Playback backend: probe or gstreamer
    #[arg(long)]
    backend: Option<String>,
}

const HELP: &str = "commands: next | prev | goto N | toggle | fullscreen on|off | close | open | view | quit";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("newsroom_gallery=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(backend) = cli.backend {
        config.playback.backend = backend;
    }
    let base_url = cli
        .base_url
        .unwrap_or_else(|| config.media.base_url.clone());

    let payload = MediaPayload::from_file(&cli.payload)
        .with_context(|| format!("Failed to load {}", cli.payload.display()))?;

    info!("Starting newsroom gallery");

    let backend = create_backend(&config)?;
    let (handle, session) = GallerySession::spawn(backend, &config);

    let mut views = handle.subscribe();
    let printer = tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            println!("{}", view);
        }
    });

    let options = OpenOptions {
        initial_index: cli.index,
        fullscreen: cli.fullscreen,
    };

    match handle.open(&payload, &base_url, options).await {
        Ok(_) => {
            println!("{}", HELP);
            run_commands(&handle, &payload, &base_url, options).await?;
        }
        Err(GalleryError::EmptyMedia) => println!("{}", GalleryError::EmptyMedia),
        Err(e) => return Err(e.into()),
    }

    handle.teardown().await?;
    drop(handle);
    session.await.context("Gallery session panicked")?;
    printer.await.context("View printer panicked")?;

    Ok(())
}

async fn run_commands(
    handle: &GalleryHandle,
    payload: &MediaPayload,
    base_url: &str,
    options: OpenOptions,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        let result: Result<GalleryView, GalleryError> = match (words.next(), words.next()) {
            (None, _) => continue,
            (Some("next" | "n"), _) => handle.next().await,
            (Some("prev" | "previous" | "p"), _) => handle.previous().await,
            (Some("goto"), Some(position)) => match position.parse::<usize>() {
                Ok(position) => handle.select(position.saturating_sub(1)).await,
                Err(_) => {
                    println!("goto expects a position, e.g. goto 2");
                    continue;
                }
            },
            (Some("toggle" | "t"), _) => handle.toggle_play_pause().await,
            (Some("fullscreen"), Some("on")) => handle.set_fullscreen(true).await,
            (Some("fullscreen"), Some("off")) => handle.set_fullscreen(false).await,
            (Some("close"), _) => handle.close().await,
            (Some("open"), _) => handle.open(payload, base_url, options).await,
            (Some("view"), _) => handle.view().await.inspect(|view| println!("{}", view)),
            (Some("quit" | "q"), _) => break,
            (Some(other), _) => {
                warn!(command = other, "Unknown command");
                println!("{}", HELP);
                continue;
            }
        };

        if let Err(e) = result {
            warn!(error = %e, "Command failed");
        }
    }

    Ok(())
}
