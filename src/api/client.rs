//! Stage sources backed by a remote photo-playlist HTTP service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{PipelineError, Result};
use crate::generation::{MoodSource, TrackSource};
use crate::types::{ImageInput, MoodAnalysis, PlaylistResult};

use super::types::{AnalyzeImageRequest, ErrorBody, PlaylistRequest, PlaylistResponse};

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("photo-playlist/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| PipelineError::service(format!("Failed to create HTTP client: {}", e)))
}

/// Reads the `error` field of a failed response, or the status reason.
async fn error_text(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}

/// Mood extraction via `POST {base}/api/analyze-image`.
pub struct RemoteMoodSource {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteMoodSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/api/analyze-image", self.base_url)
    }
}

#[async_trait]
impl MoodSource for RemoteMoodSource {
    async fn analyze(&self, image: &ImageInput) -> Result<MoodAnalysis> {
        image.validate()?;

        let request = AnalyzeImageRequest {
            image_base64: Some(image.to_base64()),
            mime_type: Some(image.mime_type().to_string()),
        };

        tracing::debug!(url = %self.url(), bytes = image.bytes().len(), "Remote mood request");

        let response = self.http.post(self.url()).json(&request).send().await?;
        let status = response.status();

        if status == StatusCode::BAD_REQUEST {
            return Err(PipelineError::invalid_input(error_text(response).await));
        }
        if !status.is_success() {
            let message = error_text(response).await;
            return Err(PipelineError::service(format!(
                "Analysis failed ({}): {}",
                status.as_u16(),
                message
            )));
        }

        let analysis: MoodAnalysis = response.json().await.map_err(|e| {
            PipelineError::service(format!("Analysis failed: unreadable response: {}", e))
        })?;

        Ok(MoodAnalysis::new(
            analysis.mood,
            analysis.genre_hints,
            analysis.description,
        ))
    }
}

/// Track selection via `POST {base}/api/playlist`.
pub struct RemoteTrackSource {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteTrackSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/api/playlist", self.base_url)
    }

    async fn request(&self, analysis: &MoodAnalysis) -> std::result::Result<PlaylistResponse, String> {
        let request = PlaylistRequest {
            mood: Some(analysis.mood.clone()),
            genre_hints: Some(serde_json::json!(analysis.genre_hints)),
        };

        let response = self
            .http
            .post(self.url())
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("{} {}", status.as_u16(), error_text(response).await));
        }

        response
            .json::<PlaylistResponse>()
            .await
            .map_err(|e| format!("unreadable response: {}", e))
    }
}

#[async_trait]
impl TrackSource for RemoteTrackSource {
    async fn select(&self, analysis: &MoodAnalysis) -> Result<PlaylistResult> {
        tracing::debug!(url = %self.url(), mood = %analysis.mood, "Remote playlist request");

        let response = self
            .request(analysis)
            .await
            .map_err(|reason| PipelineError::service(format!("Playlist failed: {}", reason)))?;

        Ok(PlaylistResult::new(response.tracks))
    }
}
