//! HTTP boundaries.
//!
//! The server side exposes mood extraction and track selection as JSON
//! endpoints; the client side wraps them as pipeline stage sources.

pub mod client;
pub mod handlers;
pub mod server;
pub mod types;

// Re-export commonly used items
pub use client::{RemoteMoodSource, RemoteTrackSource};
pub use handlers::ApiError;
pub use server::{build_router, serve, AppState};
