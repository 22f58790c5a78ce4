//! JSON-RPC types for the pipeline protocol.
//!
//! Standard JSON-RPC 2.0 envelopes plus the parameter and result shapes of
//! the session methods.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, PipelineError};
use crate::generation::StateSnapshot;
use crate::presenter::PlaylistCard;

/// JSON-RPC version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// Notification sent on every pipeline transition.
pub const PIPELINE_STATE_NOTIFICATION: &str = "pipeline_state";

/// A JSON-RPC request ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    Integer(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        RequestId::Integer(id)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        RequestId::String(id)
    }
}

/// A JSON-RPC request wrapper.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub id: RequestId,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A JSON-RPC response wrapper.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub id: RequestId,
    pub result: T,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(id: RequestId, result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// A JSON-RPC error response.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: &'static str,
    pub id: Option<RequestId>,
    pub error: JsonRpcError,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error,
        }
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonRpcErrorData>,
}

/// Extended error data for application-specific errors.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorData {
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub recovery_hint: &'static str,
}

impl JsonRpcError {
    fn standard(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Creates a parse error (-32700).
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::standard(-32700, message)
    }

    /// Creates an invalid request error (-32600).
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::standard(-32600, message)
    }

    /// Creates a method not found error (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self::standard(-32601, format!("Method not found: {}", method))
    }

    /// Creates an invalid params error (-32602).
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::standard(-32602, message)
    }

    /// Creates an internal error (-32603).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::standard(-32603, message)
    }

    /// Returns the application error code for a pipeline error code.
    pub fn app_code(code: ErrorCode) -> i32 {
        match code {
            ErrorCode::InvalidInput => -32010,
            ErrorCode::ConfigurationError => -32011,
            ErrorCode::ServiceError => -32012,
            ErrorCode::PipelineBusy => -32013,
            ErrorCode::NoResult => -32014,
            ErrorCode::ExportFailed => -32015,
        }
    }
}

impl From<&PipelineError> for JsonRpcError {
    fn from(err: &PipelineError) -> Self {
        Self {
            code: Self::app_code(err.code),
            message: err.code.description().to_string(),
            data: Some(JsonRpcErrorData {
                error_code: err.code.as_str().to_string(),
                details: Some(err.message.clone()),
                recovery_hint: err.code.recovery_hint(),
            }),
        }
    }
}

impl From<PipelineError> for JsonRpcError {
    fn from(err: PipelineError) -> Self {
        Self::from(&err)
    }
}

// ============================================================================
// Method parameters and results
// ============================================================================

/// Parameters for `select_image`: a file path or an inline payload.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectImageParams {
    pub path: Option<PathBuf>,
    pub image_base64: Option<String>,
    pub mime_type: Option<String>,
}

/// Response for `select_image`.
#[derive(Debug, Serialize)]
pub struct SelectImageResult {
    /// False when the selection was ignored because a playlist is ready.
    pub accepted: bool,
    pub state: StateSnapshot,
}

/// Response for `get_card`.
#[derive(Debug, Serialize)]
pub struct CardResult {
    pub card: PlaylistCard,
    pub text: String,
}

/// Parameters for `export_card`.
#[derive(Debug, Default, Deserialize)]
pub struct ExportCardParams {
    /// Target directory; defaults to the configured export directory.
    pub dir: Option<PathBuf>,
}

/// A JSON-RPC notification (no id field).
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification<T: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: T,
}

impl<T: Serialize> JsonRpcNotification<T> {
    pub fn new(method: &'static str, params: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }
}
