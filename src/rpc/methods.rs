//! JSON-RPC method handlers.
//!
//! Implements the handlers for all supported JSON-RPC methods.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::presenter::ResultPresenter;
use crate::types::ImageInput;

use super::server::ServerState;
use super::types::{
    CardResult, ExportCardParams, JsonRpcError, SelectImageParams, SelectImageResult,
};

/// Handles a JSON-RPC method call.
pub async fn handle_request(
    method: &str,
    params: Value,
    state: &ServerState,
) -> Result<Value, JsonRpcError> {
    match method {
        "select_image" => handle_select_image(params, state).await,
        "get_state" => to_value(state.pipeline.state().snapshot()),
        "reset" => handle_reset(state).await,
        "get_card" => handle_get_card(state),
        "play_card" => handle_play_card(state),
        "export_card" => handle_export_card(params, state),
        "ping" => handle_ping(),
        "shutdown" => handle_shutdown(state),
        _ => Err(JsonRpcError::method_not_found(method)),
    }
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::internal_error(format!("Failed to serialize result: {}", e)))
}

/// Parses params, treating a missing params member as an empty object.
fn parse_params<T: DeserializeOwned + Default>(params: Value) -> Result<T, JsonRpcError> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

/// Handles the ping method for health checks.
fn handle_ping() -> Result<Value, JsonRpcError> {
    Ok(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Handles the shutdown method.
fn handle_shutdown(state: &ServerState) -> Result<Value, JsonRpcError> {
    state.shutdown();
    Ok(serde_json::json!({ "status": "shutting_down" }))
}

/// Handles the select_image method.
///
/// Starts an attempt and returns immediately; progress arrives as
/// `pipeline_state` notifications.
async fn handle_select_image(params: Value, state: &ServerState) -> Result<Value, JsonRpcError> {
    let params: SelectImageParams = parse_params(params)?;

    let image = match (&params.path, &params.image_base64) {
        (Some(path), None) => ImageInput::from_path(path).await?,
        (None, Some(payload)) => ImageInput::from_base64(payload, params.mime_type.as_deref())?,
        (Some(_), Some(_)) => {
            return Err(JsonRpcError::invalid_params(
                "Pass either path or imageBase64, not both",
            ))
        }
        (None, None) => {
            return Err(JsonRpcError::invalid_params("path or imageBase64 is required"))
        }
    };

    let accepted = state.pipeline.select_image(image).await?;
    to_value(SelectImageResult {
        accepted,
        state: state.pipeline.state().snapshot(),
    })
}

/// Handles the reset method.
async fn handle_reset(state: &ServerState) -> Result<Value, JsonRpcError> {
    state.pipeline.reset().await?;
    to_value(state.pipeline.state().snapshot())
}

/// Handles the get_card method.
fn handle_get_card(state: &ServerState) -> Result<Value, JsonRpcError> {
    let card = ResultPresenter::require_card(&state.pipeline.state())?;
    let text = card.render_text();
    to_value(CardResult { card, text })
}

/// Handles the play_card method.
fn handle_play_card(state: &ServerState) -> Result<Value, JsonRpcError> {
    let card = ResultPresenter::require_card(&state.pipeline.state())?;
    to_value(state.actions.play(&card))
}

/// Handles the export_card method.
fn handle_export_card(params: Value, state: &ServerState) -> Result<Value, JsonRpcError> {
    let params: ExportCardParams = parse_params(params)?;
    let card = ResultPresenter::require_card(&state.pipeline.state())?;
    let dir = params
        .dir
        .unwrap_or_else(|| state.config.effective_export_dir());

    let exported = state.actions.export(&card, &dir)?;
    to_value(exported)
}
