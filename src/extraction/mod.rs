//! Mood extraction.
//!
//! Turns an image into a [`MoodAnalysis`](crate::types::MoodAnalysis):
//! - [`MoodExtractor`](extractor::MoodExtractor): preconditions and orchestration
//! - [`VisionClient`](vision::VisionClient): the vision service seam, with Gemini as default
//! - [`parse_mood_response`](parse::parse_mood_response): fallback-over-failure reply parsing

pub mod extractor;
pub mod parse;
pub mod prompt;
pub mod vision;

// Re-export commonly used items
pub use extractor::MoodExtractor;
pub use parse::{find_json_object, parse_mood_response};
pub use prompt::{mood_prompt, MOOD_PROMPT};
pub use vision::{GeminiClient, VisionClient};
