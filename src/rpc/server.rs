//! JSON-RPC server over stdin/stdout.
//!
//! Implements the JSON-RPC 2.0 protocol for one pipeline session. Requests
//! are handled one line at a time; responses and `pipeline_state`
//! notifications share a single writer so lines never interleave.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::config::AppConfig;
use crate::error::Result;
use crate::generation::{GenerationPipeline, PipelineState};
use crate::presenter::CardActions;

use super::methods::handle_request;
use super::types::{
    JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    PIPELINE_STATE_NOTIFICATION,
};

/// State shared across all request handlers.
pub struct ServerState {
    /// The session's pipeline.
    pub pipeline: GenerationPipeline,
    /// Daemon configuration.
    pub config: AppConfig,
    /// Play/export actions on finished cards.
    pub actions: Arc<dyn CardActions>,
    /// Flag to signal server shutdown.
    shutdown: AtomicBool,
}

impl ServerState {
    /// Creates new server state.
    pub fn new(pipeline: GenerationPipeline, config: AppConfig, actions: Arc<dyn CardActions>) -> Self {
        Self {
            pipeline,
            config,
            actions,
            shutdown: AtomicBool::new(false),
        }
    }

    /// Signals the server to shut down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Returns true if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

/// Runs the JSON-RPC server, reading from stdin and writing to stdout.
pub async fn run_server(state: ServerState) -> Result<()> {
    serve_lines(state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Runs the JSON-RPC server over arbitrary line streams.
pub async fn serve_lines<R, W>(state: ServerState, reader: R, writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
    let (stop_tx, stop_rx) = oneshot::channel();
    let writer_task = tokio::spawn(write_lines(writer, out_rx));
    let forwarder = tokio::spawn(forward_transitions(
        state.pipeline.subscribe(),
        out_tx.clone(),
        stop_rx,
    ));

    tracing::info!("JSON-RPC server started, waiting for requests");

    let mut lines = reader.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Error reading input");
                break;
            }
        };

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        if let Some(response) = process_request(&line, &state).await {
            out_tx.send(response).ok();
        }

        if state.is_shutdown() {
            tracing::info!("Server shutdown requested");
            break;
        }
    }

    stop_tx.send(()).ok();
    forwarder.await.ok();
    drop(out_tx);
    writer_task.await.ok();
    state.pipeline.shutdown().await;

    tracing::info!("JSON-RPC server stopped");
    Ok(())
}

/// Processes a single JSON-RPC request line.
pub async fn process_request(line: &str, state: &ServerState) -> Option<String> {
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            let error = JsonRpcErrorResponse::new(
                None,
                JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
            );
            return serde_json::to_string(&error).ok();
        }
    };

    if request.jsonrpc != "2.0" {
        let error = JsonRpcErrorResponse::new(
            Some(request.id),
            JsonRpcError::invalid_request("Invalid JSON-RPC version (expected 2.0)"),
        );
        return serde_json::to_string(&error).ok();
    }

    tracing::debug!(method = %request.method, "Handling request");

    match handle_request(&request.method, request.params, state).await {
        Ok(result) => serde_json::to_string(&JsonRpcResponse::new(request.id, result)).ok(),
        Err(error) => {
            tracing::debug!(method = %request.method, code = error.code, message = %error.message, "Request failed");
            serde_json::to_string(&JsonRpcErrorResponse::new(Some(request.id), error)).ok()
        }
    }
}

/// Serializes a JSON-RPC notification line.
pub fn notification_line<T: serde::Serialize>(method: &'static str, params: T) -> Option<String> {
    serde_json::to_string(&JsonRpcNotification::new(method, params)).ok()
}

/// Forwards transitions as notifications until stopped.
///
/// Transitions already queued when the stop signal arrives are still sent.
async fn forward_transitions(
    mut transitions: broadcast::Receiver<PipelineState>,
    out: mpsc::UnboundedSender<String>,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            received = transitions.recv() => match received {
                Ok(state) => {
                    if let Some(line) = notification_line(PIPELINE_STATE_NOTIFICATION, state.snapshot()) {
                        if out.send(line).is_err() {
                            break;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Dropped pipeline_state notifications");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = &mut stop => break,
        }
    }
}

async fn write_lines<W: AsyncWrite + Unpin>(mut writer: W, mut lines: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = lines.recv().await {
        let written = async {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await
        };
        if let Err(e) = written.await {
            tracing::error!(error = %e, "Error writing output");
            break;
        }
    }
}
