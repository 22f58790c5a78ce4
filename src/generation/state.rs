//! Pipeline state and its pure transition function.
//!
//! The state machine is independent of any driver: the actor in
//! [`pipeline`](super::pipeline) feeds it events, tests feed it directly.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, PipelineError};
use crate::types::{ImageInput, ImagePreview, MoodAnalysis, PlaylistResult, Track};

/// Why an attempt ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&PipelineError> for FailureReason {
    fn from(err: &PipelineError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
        }
    }
}

impl From<PipelineError> for FailureReason {
    fn from(err: PipelineError) -> Self {
        Self::from(&err)
    }
}

/// The single mutable entity of a pipeline session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PipelineState {
    /// Waiting for an image.
    #[default]
    Idle,
    /// Mood extraction is running for `image`.
    Analyzing {
        image: ImageInput,
        preview: ImagePreview,
    },
    /// Track selection is running for `analysis`.
    Generating {
        preview: ImagePreview,
        analysis: MoodAnalysis,
    },
    /// The attempt finished with a playlist.
    Ready {
        preview: ImagePreview,
        analysis: MoodAnalysis,
        playlist: PlaylistResult,
    },
    /// The attempt failed; a new selection starts over.
    Failed(FailureReason),
}

/// Discriminant of [`PipelineState`], used in logs and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Idle,
    Analyzing,
    Generating,
    Ready,
    Failed,
}

impl Stage {
    /// Returns the string representation of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Analyzing => "analyzing",
            Stage::Generating => "generating",
            Stage::Ready => "ready",
            Stage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    ImageSelected(ImageInput),
    AnalysisSucceeded(MoodAnalysis),
    AnalysisFailed(FailureReason),
    SelectionSucceeded(PlaylistResult),
    SelectionFailed(FailureReason),
    Reset,
}

impl PipelineEvent {
    /// Returns the event name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::ImageSelected(_) => "image_selected",
            PipelineEvent::AnalysisSucceeded(_) => "analysis_succeeded",
            PipelineEvent::AnalysisFailed(_) => "analysis_failed",
            PipelineEvent::SelectionSucceeded(_) => "selection_succeeded",
            PipelineEvent::SelectionFailed(_) => "selection_failed",
            PipelineEvent::Reset => "reset",
        }
    }
}

impl PipelineState {
    /// Returns the stage of this state.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineState::Idle => Stage::Idle,
            PipelineState::Analyzing { .. } => Stage::Analyzing,
            PipelineState::Generating { .. } => Stage::Generating,
            PipelineState::Ready { .. } => Stage::Ready,
            PipelineState::Failed(_) => Stage::Failed,
        }
    }

    /// Returns true while an external call belongs to this state.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::Analyzing { .. } | PipelineState::Generating { .. }
        )
    }

    /// Returns true if a new image may be selected.
    pub fn accepts_image(&self) -> bool {
        matches!(self, PipelineState::Idle | PipelineState::Failed(_))
    }

    /// Returns true if `event` changes this state.
    pub fn accepts(&self, event: &PipelineEvent) -> bool {
        match (self, event) {
            (_, PipelineEvent::Reset) => true,
            (_, PipelineEvent::ImageSelected(_)) => self.accepts_image(),
            (
                PipelineState::Analyzing { .. },
                PipelineEvent::AnalysisSucceeded(_) | PipelineEvent::AnalysisFailed(_),
            ) => true,
            (
                PipelineState::Generating { .. },
                PipelineEvent::SelectionSucceeded(_) | PipelineEvent::SelectionFailed(_),
            ) => true,
            _ => false,
        }
    }

    pub fn preview(&self) -> Option<&ImagePreview> {
        match self {
            PipelineState::Analyzing { preview, .. }
            | PipelineState::Generating { preview, .. }
            | PipelineState::Ready { preview, .. } => Some(preview),
            _ => None,
        }
    }

    pub fn analysis(&self) -> Option<&MoodAnalysis> {
        match self {
            PipelineState::Generating { analysis, .. } | PipelineState::Ready { analysis, .. } => {
                Some(analysis)
            }
            _ => None,
        }
    }

    pub fn playlist(&self) -> Option<&PlaylistResult> {
        match self {
            PipelineState::Ready { playlist, .. } => Some(playlist),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            PipelineState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Returns a serializable view of this state.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            stage: self.stage(),
            preview: self.preview().cloned(),
            analysis: self.analysis().cloned(),
            tracks: self.playlist().map(|p| p.tracks().to_vec()),
            error: self.failure().cloned(),
        }
    }
}

/// Applies `event` to `state`.
///
/// Events that do not apply to the current state leave it unchanged.
pub fn transition(state: PipelineState, event: PipelineEvent) -> PipelineState {
    if !state.accepts(&event) {
        return state;
    }

    match (state, event) {
        (_, PipelineEvent::Reset) => PipelineState::Idle,
        (_, PipelineEvent::ImageSelected(image)) => {
            let preview = image.preview();
            PipelineState::Analyzing { image, preview }
        }
        (PipelineState::Analyzing { preview, .. }, PipelineEvent::AnalysisSucceeded(analysis)) => {
            PipelineState::Generating { preview, analysis }
        }
        (PipelineState::Analyzing { .. }, PipelineEvent::AnalysisFailed(reason)) => {
            PipelineState::Failed(reason)
        }
        (
            PipelineState::Generating { preview, analysis },
            PipelineEvent::SelectionSucceeded(playlist),
        ) => PipelineState::Ready {
            preview,
            analysis,
            playlist,
        },
        (PipelineState::Generating { .. }, PipelineEvent::SelectionFailed(reason)) => {
            PipelineState::Failed(reason)
        }
        (state, _) => state,
    }
}

/// Wire view of a [`PipelineState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<ImagePreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<MoodAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<Track>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureReason>,
}
