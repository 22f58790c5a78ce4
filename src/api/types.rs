//! Request and response bodies of the HTTP boundaries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::playlist::effective_hints;
use crate::types::{Track, DEFAULT_MOOD};

/// `POST /api/analyze-image` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageRequest {
    /// Base64 payload or `data:` URL. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,

    /// Declared media type; defaults to `image/jpeg`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// `POST /api/playlist` request.
///
/// `genreHints` is kept loose: anything but a non-empty string array
/// selects with the default hints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_hints: Option<Value>,
}

impl PlaylistRequest {
    /// Returns the hints selection runs with.
    pub fn hints(&self) -> Vec<String> {
        let given: Vec<String> = match &self.genre_hints {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        effective_hints(&given)
    }

    /// Returns the mood echoed in the response.
    pub fn mood(&self) -> Option<&str> {
        self.mood.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    /// Returns the mood echoed in the response, defaulting to "chill".
    pub fn mood_or_default(&self) -> String {
        self.mood().unwrap_or(DEFAULT_MOOD).to_string()
    }
}

/// `POST /api/playlist` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResponse {
    pub tracks: Vec<Track>,
    pub mood: String,
    pub genre_hints: Vec<String>,
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Whether mood extraction has credentials.
    pub vision_configured: bool,
}
