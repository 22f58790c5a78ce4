//! photo-playlist: turns a photo into a mood-matched playlist.
//!
//! A vision model describes the photo's mood and suggests genres; a
//! selector draws a bounded playlist from a reference track pool; the
//! result is rendered as a shareable card.
//!
//! # Modules
//!
//! - [`types`]: Core data types (ImageInput, MoodAnalysis, Track, PlaylistResult)
//! - [`extraction`]: Image to mood via a vision service
//! - [`playlist`]: Track pool and selection
//! - [`generation`]: The pipeline state machine and its driver
//! - [`presenter`]: Playlist card and its actions
//! - [`api`]: HTTP boundaries and their remote clients
//! - [`rpc`]: JSON-RPC daemon surface
//! - [`config`]: Runtime configuration (AppConfig, VisionConfig)
//! - [`error`]: Error types and codes (PipelineError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use photo_playlist::{
//!     config::AppConfig,
//!     generation::{sources_from_config, GenerationPipeline},
//!     presenter::ResultPresenter,
//!     types::ImageInput,
//! };
//!
//! let config = AppConfig::from_env();
//! let (mood, tracks) = sources_from_config(&config)?;
//! let pipeline = GenerationPipeline::spawn(mood, tracks);
//!
//! let image = ImageInput::from_path("sunset.jpg".as_ref()).await?;
//! let state = pipeline.run(image).await?;
//! if let Some(card) = ResultPresenter::card(&state) {
//!     println!("{}", card.render_text());
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod playlist;
pub mod presenter;
pub mod rpc;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::{AppConfig, Locale, VisionConfig};
pub use error::{ErrorCode, PipelineError, Result};
pub use generation::{GenerationPipeline, PipelineState, Stage};
pub use types::{ImageInput, MoodAnalysis, PlaylistResult, Track};
