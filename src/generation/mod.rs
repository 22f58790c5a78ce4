//! Generation pipeline.
//!
//! Drives one photo through mood extraction and track selection:
//! - [`state`]: the state value and its pure transition function
//! - [`pipeline`]: the actor that owns the state and calls the stages
//! - [`sources`]: the stage backends

pub mod pipeline;
pub mod sources;
pub mod state;

// Re-export commonly used items
pub use pipeline::GenerationPipeline;
pub use sources::{sources_from_config, LocalTrackSource, MoodSource, TrackSource};
pub use state::{transition, FailureReason, PipelineEvent, PipelineState, Stage, StateSnapshot};
