//! photo-playlist: turn a photo into a mood-matched playlist.
//!
//! This binary can run in three modes:
//! - CLI mode: one image in, one playlist card out
//! - Serve mode: HTTP service for the extraction and selection boundaries
//! - Daemon mode: JSON-RPC server driving one pipeline session over stdio

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use photo_playlist::api::{self, AppState};
use photo_playlist::cli::Cli;
use photo_playlist::config::AppConfig;
use photo_playlist::generation::{sources_from_config, GenerationPipeline, PipelineState};
use photo_playlist::presenter::{CardActions, FileCardActions, ResultPresenter};
use photo_playlist::rpc::{run_server, ServerState};
use photo_playlist::types::ImageInput;

fn main() {
    if let Err(e) = run() {
        tracing::error!(error = %format!("{:#}", e), "Fatal error");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    init_tracing();

    let config = cli.apply(AppConfig::from_env());
    if let Some(message) = config.validate() {
        bail!("Invalid configuration: {}", message);
    }
    tracing::debug!(?config, "Loaded configuration");

    if !(cli.is_daemon_mode() || cli.is_serve_mode() || cli.is_cli_mode()) {
        print_usage();
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    if cli.is_daemon_mode() {
        runtime.block_on(run_daemon_mode(config))
    } else if cli.is_serve_mode() {
        runtime.block_on(run_serve_mode(config))
    } else {
        let image = cli.image.as_deref().context("--image is required")?;
        runtime.block_on(run_cli_mode(config, image, cli.export.as_deref()))
    }
}

/// Logs go to stderr so stdout stays free for JSON-RPC and card output.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photo_playlist=info".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Runs one image through the pipeline and prints the card.
async fn run_cli_mode(config: AppConfig, image_path: &Path, export_dir: Option<&Path>) -> anyhow::Result<()> {
    let image = ImageInput::from_path(image_path).await?;
    let (mood_source, track_source) = sources_from_config(&config)?;
    let pipeline = GenerationPipeline::spawn(mood_source, track_source);

    tracing::info!(image = %image_path.display(), "Generating playlist");
    let state = pipeline.run(image).await?;
    pipeline.shutdown().await;

    match state {
        PipelineState::Failed(reason) => {
            bail!("[{}] {}. {}", reason.code, reason.message, reason.code.recovery_hint())
        }
        state => {
            let card = ResultPresenter::require_card(&state)?;
            println!("{}", card.render_text());

            if let Some(dir) = export_dir {
                let exported = FileCardActions.export(&card, dir)?;
                eprintln!("Saved to: {}", exported.json_path.display());
            }
            Ok(())
        }
    }
}

/// Serves the HTTP boundaries until ctrl-c.
async fn run_serve_mode(config: AppConfig) -> anyhow::Result<()> {
    if !config.vision.has_credentials() {
        tracing::warn!("No vision API key configured; /api/analyze-image will fail until one is set");
    }
    let state = AppState::from_config(&config)?;
    api::serve(config.bind_addr, state).await?;
    Ok(())
}

/// Runs the daemon mode (JSON-RPC server).
async fn run_daemon_mode(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(
        remote = config.remote_url.as_deref().unwrap_or("none"),
        vision_configured = config.vision.has_credentials(),
        export_dir = %config.effective_export_dir().display(),
        "Starting JSON-RPC daemon"
    );

    let (mood_source, track_source) = sources_from_config(&config)?;
    let pipeline = GenerationPipeline::spawn(mood_source, track_source);
    let state = ServerState::new(pipeline, config, Arc::new(FileCardActions));

    run_server(state).await?;
    Ok(())
}

/// Prints usage information.
fn print_usage() {
    eprintln!("photo-playlist: turn a photo into a mood-matched playlist");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  One image (prints the playlist card):");
    eprintln!("    photo-playlist --image sunset.jpg [--export ./card]");
    eprintln!();
    eprintln!("  HTTP service (/api/analyze-image, /api/playlist, /health):");
    eprintln!("    photo-playlist --serve [--bind 127.0.0.1:5780]");
    eprintln!();
    eprintln!("  Daemon mode (JSON-RPC server):");
    eprintln!("    photo-playlist --daemon");
    eprintln!();
    eprintln!("Set GEMINI_API_KEY for mood extraction, or --remote <url> to use another instance.");
    eprintln!("Run 'photo-playlist --help' for full options.");
}
