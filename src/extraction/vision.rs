//! Vision service client.
//!
//! Sends an image and an instruction prompt to a vision-capable generation
//! service and returns the model's raw text reply.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::VisionConfig;
use crate::error::{PipelineError, Result};
use crate::types::ImageInput;

/// A vision-capable text generation service.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Returns the model's raw text reply for `image` and `prompt`.
    async fn generate(&self, api_key: &str, image: &ImageInput, prompt: &str) -> Result<String>;
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    /// Creates a client for the configured endpoint and model.
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("photo-playlist/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| PipelineError::service(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Returns the generateContent URL for the configured model.
    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl VisionClient for GeminiClient {
    async fn generate(&self, api_key: &str, image: &ImageInput, prompt: &str) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type().to_string(),
                            data: image.to_base64(),
                        },
                    },
                    Part::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        };

        tracing::debug!(
            model = %self.model,
            mime_type = image.mime_type(),
            bytes = image.bytes().len(),
            "Calling vision service"
        );

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PipelineError::service(format!(
                "Vision service returned {}: {}",
                status.as_u16(),
                upstream_message(&text, status.canonical_reason())
            )));
        }

        let reply: GenerateContentResponse = response.json().await.map_err(|e| {
            PipelineError::with_source(
                crate::error::ErrorCode::ServiceError,
                format!("Vision service sent an unreadable body: {}", e),
                e,
            )
        })?;

        Ok(reply.text())
    }
}

/// Picks the most useful message out of an upstream error body.
fn upstream_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(parsed) = serde_json::from_str::<UpstreamErrorBody>(body) {
        if let Some(message) = parsed.error.and_then(|e| e.message) {
            return message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("unknown error").to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    InlineData { inline_data: InlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: Option<UpstreamError>,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    message: Option<String>,
}
