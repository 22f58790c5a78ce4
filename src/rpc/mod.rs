//! JSON-RPC module for daemon communication.
//!
//! Provides the JSON-RPC 2.0 server implementation for:
//! - `select_image`: Start an attempt from a file path or inline payload
//! - `get_state`: Current pipeline state
//! - `reset`: Return to idle
//! - `get_card` / `play_card` / `export_card`: Actions on a finished playlist
//! - `ping`: Health check
//! - `shutdown`: Graceful shutdown
//!
//! Notifications:
//! - `pipeline_state`: Sent on every pipeline transition

pub mod methods;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use server::{notification_line, process_request, run_server, serve_lines, ServerState};
pub use types::{
    JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    RequestId, PIPELINE_STATE_NOTIFICATION,
};
