//! HTTP handlers for the extraction and selection boundaries.
//!
//! Bodies are read as raw bytes and parsed here so that a malformed body
//! produces the same `{ "error": ... }` shape as every other failure.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::{ErrorCode, PipelineError};
use crate::types::{ImageInput, MoodAnalysis};

use super::server::AppState;
use super::types::{AnalyzeImageRequest, ErrorBody, HealthResponse, PlaylistRequest, PlaylistResponse};

/// Body of the 400 returned when `imageBase64` is missing or blank.
pub const MISSING_IMAGE_MESSAGE: &str = "imageBase64 is required";

/// Failure of a boundary request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("{}", .0.message)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pipeline(err) => match err.code {
                ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorCode::NoResult => StatusCode::NOT_FOUND,
                ErrorCode::PipelineBusy => StatusCode::CONFLICT,
                ErrorCode::ConfigurationError
                | ErrorCode::ServiceError
                | ErrorCode::ExportFailed => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

/// POST /api/analyze-image
pub async fn analyze_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MoodAnalysis>, ApiError> {
    let request: AnalyzeImageRequest = parse_body(&body)?;

    let payload = request
        .image_base64
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| PipelineError::invalid_input(MISSING_IMAGE_MESSAGE))?;
    let image = ImageInput::from_base64(payload, request.mime_type.as_deref())?;

    tracing::debug!(
        mime_type = image.mime_type(),
        bytes = image.bytes().len(),
        "Analyze request"
    );

    let analysis = state.mood_source.analyze(&image).await?;
    Ok(Json(analysis))
}

/// POST /api/playlist
pub async fn playlist(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PlaylistResponse>, ApiError> {
    let request: PlaylistRequest = parse_body(&body)?;
    let genre_hints = request.hints();

    let result = state.selector.select_for_mood(request.mood(), &genre_hints);

    Ok(Json(PlaylistResponse {
        tracks: result.into_tracks(),
        mood: request.mood_or_default(),
        genre_hints,
    }))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        vision_configured: state.vision_configured,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (PipelineError::empty_image(), StatusCode::BAD_REQUEST),
            (PipelineError::missing_credentials(), StatusCode::INTERNAL_SERVER_ERROR),
            (PipelineError::service("down"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }

        let malformed = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            ApiError::from(malformed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn pipeline_error_body_is_bare_message() {
        let err = ApiError::from(PipelineError::invalid_input(MISSING_IMAGE_MESSAGE));
        assert_eq!(err.to_string(), "imageBase64 is required");
        let err = ApiError::from(PipelineError::empty_image());
        assert_eq!(err.to_string(), "Image payload is empty");
    }
}
