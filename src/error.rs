//! Error types for the photo-playlist daemon.
//!
//! Defines the error codes surfaced by the generation pipeline and its
//! boundaries so that callers can tell a bad request apart from a
//! misconfigured deployment or a failing upstream service.

use std::fmt;

use thiserror::Error;

/// Error codes carried by every surfaced error.
///
/// These codes appear in JSON-RPC error data, in the HTTP boundary's
/// status mapping and in the pipeline's `Failed` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Caller-supplied image payload is missing, empty or not an image.
    /// Trigger: empty upload, non-image media type, undecodable base64.
    InvalidInput,

    /// Required external-service credential is absent.
    /// Trigger: neither GEMINI_API_KEY nor CURSOR_API_KEY configured.
    ConfigurationError,

    /// Upstream extraction or selection call failed.
    /// Trigger: timeout, transport failure, non-success status.
    ServiceError,

    /// A generation attempt is already in flight.
    /// Trigger: image selected while analyzing or generating.
    PipelineBusy,

    /// No finished playlist is available.
    /// Trigger: card requested before the pipeline reached Ready.
    NoResult,

    /// Writing an exported card failed.
    /// Trigger: export directory not writable.
    ExportFailed,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::ServiceError => "SERVICE_ERROR",
            ErrorCode::PipelineBusy => "PIPELINE_BUSY",
            ErrorCode::NoResult => "NO_RESULT",
            ErrorCode::ExportFailed => "EXPORT_FAILED",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Image payload is missing, empty or not an image",
            ErrorCode::ConfigurationError => "Vision service credential is not configured",
            ErrorCode::ServiceError => "Upstream extraction or selection call failed",
            ErrorCode::PipelineBusy => "A generation attempt is already in flight",
            ErrorCode::NoResult => "No finished playlist is available",
            ErrorCode::ExportFailed => "Failed to write the exported playlist card",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Select a non-empty image file (JPEG, PNG, WebP, ...)",
            ErrorCode::ConfigurationError => {
                "Set GEMINI_API_KEY (or CURSOR_API_KEY) to a Google AI Studio key \
                 and restart the daemon"
            }
            ErrorCode::ServiceError => {
                "Check network access to the vision service and try again \
                 with the same or another image"
            }
            ErrorCode::PipelineBusy => "Wait for the current attempt to finish or reset first",
            ErrorCode::NoResult => "Select an image and wait for the playlist to be generated",
            ErrorCode::ExportFailed => "Check that the export directory exists and is writable",
        }
    }

    /// Returns true if a user can recover by selecting another image.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::InvalidInput | ErrorCode::ServiceError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for pipeline operations.
#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct PipelineError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PipelineError {
    /// Creates a new PipelineError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new PipelineError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an INVALID_INPUT error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, reason)
    }

    /// Creates an INVALID_INPUT error for an empty image payload.
    pub fn empty_image() -> Self {
        Self::new(ErrorCode::InvalidInput, "Image payload is empty")
    }

    /// Creates a CONFIGURATION_ERROR for a missing vision credential.
    pub fn missing_credentials() -> Self {
        Self::new(
            ErrorCode::ConfigurationError,
            "Vision API key is not configured (set GEMINI_API_KEY or CURSOR_API_KEY)",
        )
    }

    /// Creates a SERVICE_ERROR carrying the upstream message.
    pub fn service(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceError, message)
    }

    /// Creates a PIPELINE_BUSY error.
    pub fn busy() -> Self {
        Self::new(
            ErrorCode::PipelineBusy,
            "A generation attempt is already in flight",
        )
    }

    /// Creates a PIPELINE_BUSY error for a selection made while a playlist is ready.
    pub fn reset_required() -> Self {
        Self::new(
            ErrorCode::PipelineBusy,
            "A playlist is already ready; reset before selecting another image",
        )
    }

    /// Creates a NO_RESULT error.
    pub fn no_result() -> Self {
        Self::new(ErrorCode::NoResult, "No playlist has been generated yet")
    }

    /// Creates an EXPORT_FAILED error.
    pub fn export_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExportFailed,
            format!("Failed to export playlist card: {}", reason.into()),
        )
    }

    /// Returns the message with its recovery hint, for operator logs.
    pub fn detailed(&self) -> String {
        format!("{}. Recovery: {}", self, self.code.recovery_hint())
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("Request timed out: {}", err)
        } else {
            format!("Request failed: {}", err)
        };
        Self::with_source(ErrorCode::ServiceError, message, err)
    }
}

/// Result type alias using PipelineError.
pub type Result<T> = std::result::Result<T, PipelineError>;
