//! HTTP service exposing the extraction and selection boundaries.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::error::{PipelineError, Result};
use crate::extraction::MoodExtractor;
use crate::generation::MoodSource;
use crate::playlist::{PlaylistSelector, TrackPool};

use super::handlers;

/// Shared state of the HTTP service.
#[derive(Clone)]
pub struct AppState {
    pub mood_source: Arc<dyn MoodSource>,
    pub selector: PlaylistSelector,
    pub vision_configured: bool,
    pub started_at: Instant,
}

impl AppState {
    /// Builds the state from configuration, with Gemini as vision backend.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let extractor = MoodExtractor::from_config(&config.vision)?;
        let selector = PlaylistSelector::new(TrackPool::reference(), config.max_tracks)
            .with_seed_policy(config.seed_policy);
        Ok(Self::new(
            Arc::new(extractor),
            selector,
            config.vision.has_credentials(),
        ))
    }

    pub fn new(
        mood_source: Arc<dyn MoodSource>,
        selector: PlaylistSelector,
        vision_configured: bool,
    ) -> Self {
        Self {
            mood_source,
            selector,
            vision_configured,
            started_at: Instant::now(),
        }
    }
}

/// Builds the service router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze-image", post(handlers::analyze_image))
        .route("/api/playlist", post(handlers::playlist))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Binds `addr` and serves until ctrl-c.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| PipelineError::service(format!("Failed to bind {}: {}", addr, e)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| PipelineError::service(format!("Failed to read bound address: {}", e)))?;

    tracing::info!(addr = %local_addr, vision_configured = state.vision_configured, "HTTP service listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PipelineError::service(format!("HTTP service failed: {}", e)))?;

    tracing::info!("HTTP service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
