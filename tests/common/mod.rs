//! Shared helpers for integration tests.
//!
//! Provides a stand-in vision service that answers every request with a
//! fixed status and body and counts how often it was called.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use photo_playlist::config::VisionConfig;
use photo_playlist::types::ImageInput;

pub const TEST_API_KEY: &str = "test-key";

/// A local vision service bound to an ephemeral port.
pub struct FakeVision {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
    last_key: Arc<std::sync::Mutex<Option<String>>>,
}

impl FakeVision {
    /// Serves `status` with `body` for every request.
    pub async fn start(status: StatusCode, body: Value) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_key = Arc::new(std::sync::Mutex::new(None));

        let handler_calls = Arc::clone(&calls);
        let handler_key = Arc::clone(&last_key);
        let app = Router::new().fallback(move |headers: HeaderMap| {
            let calls = Arc::clone(&handler_calls);
            let last_key = Arc::clone(&handler_key);
            let body = body.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let key = headers
                    .get("x-goog-api-key")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                *last_key.lock().unwrap() = key;
                (status, Json(body)).into_response()
            }
        });

        let addr = serve(app).await;
        Self { addr, calls, last_key }
    }

    /// Replies with `text` as the model's answer.
    pub async fn replying(text: &str) -> Self {
        Self::start(StatusCode::OK, gemini_reply(text)).await
    }

    /// Replies with an upstream error.
    pub async fn failing(status: StatusCode, message: &str) -> Self {
        Self::start(status, json!({ "error": { "code": status.as_u16(), "message": message } })).await
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_key(&self) -> Option<String> {
        self.last_key.lock().unwrap().clone()
    }

    /// Vision settings pointing at this service, with a key.
    pub fn config(&self) -> VisionConfig {
        VisionConfig {
            api_key: Some(TEST_API_KEY.to_string()),
            endpoint: format!("http://{}/v1beta", self.addr),
            timeout_secs: 5,
            ..VisionConfig::default()
        }
    }
}

/// Serves `app` on 127.0.0.1 and returns the bound address.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A generateContent response carrying `text` as its only part.
pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ], "role": "model" } }
        ]
    })
}

/// The model answer for the sunset photo.
pub fn sunset_answer() -> String {
    json!({
        "mood": "calm sunset",
        "genreHints": ["ambient", "chillwave"],
        "description": "Warm light fading over still water."
    })
    .to_string()
}

/// A few bytes that pass as a JPEG upload.
pub fn sunset_image() -> ImageInput {
    ImageInput::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'], "image/jpeg")
}
